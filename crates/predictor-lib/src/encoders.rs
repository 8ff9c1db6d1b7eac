//! Categorical encoders
//!
//! Trained mappings from category strings to the integer codes the
//! classifier was fitted on, and back.

use crate::error::{EncodeError, FormatError};
use std::collections::HashMap;

/// A trained categorical encoder
pub trait CategoricalEncoder: Send + Sync {
    /// Map a category value to its integer code
    fn transform(&self, value: &str) -> Result<i64, EncodeError>;

    /// Map an integer code back to its category value
    fn inverse_transform(&self, code: i64) -> Result<String, EncodeError>;
}

fn index_categories(categories: &[String]) -> Result<HashMap<String, i64>, FormatError> {
    if categories.is_empty() {
        return Err(FormatError::Invalid("encoder has no categories".to_string()));
    }

    let mut index = HashMap::with_capacity(categories.len());
    for (code, category) in categories.iter().enumerate() {
        if index.insert(category.clone(), code as i64).is_some() {
            return Err(FormatError::Invalid(format!(
                "duplicate category {:?}",
                category
            )));
        }
    }
    Ok(index)
}

/// Codes are positions in the class list. Unknown values are rejected.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, i64>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, FormatError> {
        let index = index_categories(&classes)?;
        Ok(Self { classes, index })
    }
}

impl CategoricalEncoder for LabelEncoder {
    fn transform(&self, value: &str) -> Result<i64, EncodeError> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| EncodeError::UnknownValue(value.to_string()))
    }

    fn inverse_transform(&self, code: i64) -> Result<String, EncodeError> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .cloned()
            .ok_or(EncodeError::UnknownCode(code))
    }
}

/// Ordinal encoder with an optional code for unseen values
#[derive(Debug, Clone)]
pub struct OrdinalEncoder {
    categories: Vec<String>,
    index: HashMap<String, i64>,
    unknown_value: Option<i64>,
}

impl OrdinalEncoder {
    pub fn new(categories: Vec<String>, unknown_value: Option<i64>) -> Result<Self, FormatError> {
        let index = index_categories(&categories)?;
        if let Some(code) = unknown_value {
            if code >= 0 && (code as usize) < categories.len() {
                return Err(FormatError::Invalid(format!(
                    "unknown_value {} collides with a category code",
                    code
                )));
            }
        }
        Ok(Self {
            categories,
            index,
            unknown_value,
        })
    }
}

impl CategoricalEncoder for OrdinalEncoder {
    fn transform(&self, value: &str) -> Result<i64, EncodeError> {
        match self.index.get(value) {
            Some(code) => Ok(*code),
            None => self
                .unknown_value
                .ok_or_else(|| EncodeError::UnknownValue(value.to_string())),
        }
    }

    fn inverse_transform(&self, code: i64) -> Result<String, EncodeError> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.categories.get(idx))
            .cloned()
            .ok_or(EncodeError::UnknownCode(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_label_encoder_round_trip() {
        let encoder = LabelEncoder::new(strings(&["failed", "successful"])).unwrap();

        for label in ["failed", "successful"] {
            let code = encoder.transform(label).unwrap();
            assert_eq!(encoder.inverse_transform(code).unwrap(), label);
        }
        assert_eq!(encoder.transform("successful"), Ok(1));
    }

    #[test]
    fn test_label_encoder_unknown_value() {
        let encoder = LabelEncoder::new(strings(&["Art", "Games"])).unwrap();
        assert_eq!(
            encoder.transform("Knitting"),
            Err(EncodeError::UnknownValue("Knitting".to_string()))
        );
    }

    #[test]
    fn test_label_encoder_unknown_code() {
        let encoder = LabelEncoder::new(strings(&["failed", "successful"])).unwrap();
        assert_eq!(encoder.inverse_transform(2), Err(EncodeError::UnknownCode(2)));
        assert_eq!(encoder.inverse_transform(-1), Err(EncodeError::UnknownCode(-1)));
    }

    #[test]
    fn test_encoder_rejects_duplicates_and_empty() {
        assert!(LabelEncoder::new(strings(&["US", "US"])).is_err());
        assert!(LabelEncoder::new(Vec::new()).is_err());
    }

    #[test]
    fn test_ordinal_encoder_unknown_value_code() {
        let encoder = OrdinalEncoder::new(strings(&["EUR", "GBP", "USD"]), Some(-1)).unwrap();
        assert_eq!(encoder.transform("GBP"), Ok(1));
        assert_eq!(encoder.transform("XYZ"), Ok(-1));
        assert!(encoder.inverse_transform(-1).is_err());

        let strict = OrdinalEncoder::new(strings(&["EUR", "USD"]), None).unwrap();
        assert!(strict.transform("XYZ").is_err());
    }

    #[test]
    fn test_ordinal_encoder_rejects_colliding_unknown_value() {
        assert!(OrdinalEncoder::new(strings(&["EUR", "USD"]), Some(1)).is_err());
    }
}
