//! Tree ensemble and linear classifiers
//!
//! Evaluates trained classifiers exported from the training pipeline.
//! Trees use the flat parallel-array layout (`children_left`,
//! `children_right`, `feature`, `threshold`, `value`) where a node is a
//! leaf when its left child is `-1`.

use super::Classifier;
use crate::error::{FormatError, InferenceError};
use serde::Deserialize;

/// Marks a leaf in `children_left` / `children_right`
const LEAF: i64 = -1;

fn check_row(expected: usize, row: &[f64]) -> Result<(), InferenceError> {
    if row.len() != expected {
        return Err(InferenceError::FeatureCount {
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}

fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_idx, best), (idx, v)| {
            if *v > best {
                (idx, *v)
            } else {
                (best_idx, best)
            }
        })
        .0
}

/// A single fitted decision tree
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights; only leaves are read
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// Check structural invariants so evaluation cannot panic or loop
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), FormatError> {
        let n_nodes = self.children_left.len();
        if n_nodes == 0 {
            return Err(FormatError::Invalid("tree has no nodes".to_string()));
        }
        if self.children_right.len() != n_nodes
            || self.feature.len() != n_nodes
            || self.threshold.len() != n_nodes
            || self.value.len() != n_nodes
        {
            return Err(FormatError::Invalid(
                "tree node arrays have different lengths".to_string(),
            ));
        }

        for node in 0..n_nodes {
            let left = self.children_left[node];
            let right = self.children_right[node];

            if left == LEAF {
                if right != LEAF {
                    return Err(FormatError::Invalid(format!(
                        "node {} has only one child",
                        node
                    )));
                }
                let weights = &self.value[node];
                if weights.len() != n_classes {
                    return Err(FormatError::Invalid(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        weights.len(),
                        n_classes
                    )));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
                    return Err(FormatError::Invalid(format!(
                        "leaf {} has invalid class weights",
                        node
                    )));
                }
                continue;
            }

            // Children always come after their parent, which rules out cycles
            for child in [left, right] {
                if child <= node as i64 || child >= n_nodes as i64 {
                    return Err(FormatError::Invalid(format!(
                        "node {} has out-of-range child {}",
                        node, child
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(FormatError::Invalid(format!(
                    "node {} splits on unknown feature {}",
                    node, feature
                )));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf reached by `row`
    fn leaf_distribution(&self, row: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RandomForestSpec {
    pub classes: Vec<i64>,
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<DecisionTree>,
}

/// Averaging ensemble of decision trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    classes: Vec<i64>,
    n_features: usize,
    feature_names: Option<Vec<String>>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(
        classes: Vec<i64>,
        n_features: usize,
        feature_names: Option<Vec<String>>,
        trees: Vec<DecisionTree>,
    ) -> Result<Self, FormatError> {
        if classes.is_empty() {
            return Err(FormatError::Invalid("classifier has no classes".to_string()));
        }
        if trees.is_empty() {
            return Err(FormatError::Invalid("forest has no trees".to_string()));
        }
        if let Some(names) = &feature_names {
            if names.len() != n_features {
                return Err(FormatError::Invalid(format!(
                    "{} feature names for {} features",
                    names.len(),
                    n_features
                )));
            }
        }
        for tree in &trees {
            tree.validate(n_features, classes.len())?;
        }

        Ok(Self {
            classes,
            n_features,
            feature_names,
            trees,
        })
    }

    pub(crate) fn from_spec(spec: RandomForestSpec) -> Result<Self, FormatError> {
        Self::new(spec.classes, spec.n_features, spec.feature_names, spec.trees)
    }
}

impl Classifier for RandomForest {
    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError> {
        let probabilities = self.predict_probability(row)?;
        Ok(self.classes[argmax(&probabilities)])
    }

    fn predict_probability(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_row(self.n_features, row)?;

        let mut sums = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (sum, p) in sums.iter_mut().zip(tree.leaf_distribution(row)) {
                *sum += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        Ok(sums.into_iter().map(|sum| sum / n_trees).collect())
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogisticRegressionSpec {
    pub classes: Vec<i64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

/// Binary logistic regression
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    classes: [i64; 2],
    coefficients: Vec<f64>,
    intercept: f64,
    feature_names: Option<Vec<String>>,
}

impl LogisticRegression {
    pub fn new(
        classes: Vec<i64>,
        coefficients: Vec<f64>,
        intercept: f64,
        feature_names: Option<Vec<String>>,
    ) -> Result<Self, FormatError> {
        let classes: [i64; 2] = classes.try_into().map_err(|classes: Vec<i64>| {
            FormatError::Invalid(format!(
                "logistic regression needs exactly 2 classes, got {}",
                classes.len()
            ))
        })?;
        if coefficients.is_empty() {
            return Err(FormatError::Invalid("no coefficients".to_string()));
        }
        if let Some(names) = &feature_names {
            if names.len() != coefficients.len() {
                return Err(FormatError::Invalid(format!(
                    "{} feature names for {} coefficients",
                    names.len(),
                    coefficients.len()
                )));
            }
        }

        Ok(Self {
            classes,
            coefficients,
            intercept,
            feature_names,
        })
    }

    pub(crate) fn from_spec(spec: LogisticRegressionSpec) -> Result<Self, FormatError> {
        Self::new(spec.classes, spec.coefficients, spec.intercept, spec.feature_names)
    }

    fn decision(&self, row: &[f64]) -> Result<f64, InferenceError> {
        check_row(self.coefficients.len(), row)?;
        let z = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        if z.is_nan() {
            return Err(InferenceError::InvalidOutput("decision value is NaN".to_string()));
        }
        Ok(z)
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError> {
        let z = self.decision(row)?;
        Ok(if z > 0.0 { self.classes[1] } else { self.classes[0] })
    }

    fn predict_probability(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let z = self.decision(row)?;
        let positive = 1.0 / (1.0 + (-z).exp());
        Ok(vec![1.0 - positive, positive])
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}
