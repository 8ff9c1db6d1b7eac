//! Feature extraction for classifier inference
//!
//! Encodes the categorical fields of a campaign record and lays the
//! result out as the classifier's feature vector.

use crate::encoders::CategoricalEncoder;
use crate::error::PredictError;
use crate::models::{CampaignRecord, FeatureVector};
use crate::registry::LoadedModels;

/// Encodes campaign records with the trained encoders
pub struct FeatureExtractor<'a> {
    category: &'a dyn CategoricalEncoder,
    country: &'a dyn CategoricalEncoder,
    currency: &'a dyn CategoricalEncoder,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(
        category: &'a dyn CategoricalEncoder,
        country: &'a dyn CategoricalEncoder,
        currency: &'a dyn CategoricalEncoder,
    ) -> Self {
        Self {
            category,
            country,
            currency,
        }
    }

    pub fn from_models(models: &'a LoadedModels) -> Self {
        Self::new(
            models.category_encoder.as_ref(),
            models.country_encoder.as_ref(),
            models.currency_encoder.as_ref(),
        )
    }

    /// Encode one record. The first unknown category stops extraction.
    pub fn extract(&self, record: &CampaignRecord) -> Result<FeatureVector, PredictError> {
        let main_category = encode(self.category, "category", &record.main_category)?;
        let country = encode(self.country, "country", &record.country)?;
        let currency = encode(self.currency, "currency", &record.currency)?;

        Ok(FeatureVector {
            main_category: main_category as f64,
            currency: currency as f64,
            goal: record.goal,
            pledged: record.pledged,
            backers: record.backers as f64,
            country: country as f64,
            pkr_pledged: record.pkr_pledged,
            pkr_pledged_real: record.pkr_pledged_real,
            pkr_goal_real: record.pkr_goal_real,
        })
    }
}

fn encode(
    encoder: &dyn CategoricalEncoder,
    field: &'static str,
    value: &str,
) -> Result<i64, PredictError> {
    encoder
        .transform(value)
        .map_err(|_| PredictError::UnknownCategory {
            field,
            value: value.to_string(),
        })
}
