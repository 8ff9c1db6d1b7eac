//! Campaign success prediction

mod features;
pub(crate) mod inference;
mod output;
mod pipeline;

pub use features::FeatureExtractor;
pub use inference::{DecisionTree, LogisticRegression, RandomForest};
pub use output::{round_percent, OutputFormatter};
pub use pipeline::PredictionPipeline;

use crate::error::InferenceError;

/// Trait for trained classifier implementations
pub trait Classifier: Send + Sync {
    /// Predict the class label for one feature row
    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError>;

    /// Class probabilities for one feature row, in the training class order
    fn predict_probability(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Feature names seen during training, if the artifact recorded them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}
