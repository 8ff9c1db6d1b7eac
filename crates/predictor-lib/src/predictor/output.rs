//! Prediction output formatting
//!
//! Turns raw classifier outputs into the response payload.
//!
//! The probability slots follow the convention the service has always
//! exposed: `class_0` reads index 1 and both `class_1` and
//! `success_probability` read index 0. Clients depend on this layout.

use crate::error::PredictError;
use crate::models::{ClassProbabilities, PredictionResult};

/// Scale a probability to percent, rounded to 2 decimals. Exact halves
/// round to the even digit.
pub fn round_percent(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round_ties_even() / 100.0
}

/// Formats classifier outputs into a PredictionResult
#[derive(Debug, Default, Clone)]
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Format a decoded prediction and its probability vector
    pub fn format(
        &self,
        predicted_state: String,
        prediction_code: i64,
        probabilities: &[f64],
    ) -> Result<PredictionResult, PredictError> {
        let (class_0, class_1, success_probability) = match probabilities {
            [first, second, ..] => (
                round_percent(*second),
                round_percent(*first),
                round_percent(*first),
            ),
            _ => {
                return Err(PredictError::MissingProbabilities {
                    count: probabilities.len(),
                })
            }
        };

        Ok(PredictionResult {
            predicted_state,
            prediction_code,
            probabilities: ClassProbabilities { class_0, class_1 },
            success_probability,
        })
    }

    /// Label used when the outcome encoder cannot decode a code
    pub fn fallback_label(prediction_code: i64) -> String {
        format!("state_{}", prediction_code)
    }
}
