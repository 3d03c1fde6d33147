//! Forest model with validation, inference and JSON persistence

use super::tree::Tree;
use crate::features::FeatureSchema;
use crate::serde_canon::{hash_canonical_hex, to_canonical_json, CanonicalError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Current artifact format version
pub const FORMAT_VERSION: i32 = 1;

/// Forest model errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Binary encoding error: {0}")]
    BinaryError(#[from] bincode::Error),

    #[error("Canonical serialization error: {0}")]
    CanonicalError(#[from] CanonicalError),

    #[error("Model hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("Feature row has {actual} values but the model expects {expected}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("Model produced a non-finite prediction: {0}")]
    NonFinite(f64),

    #[error("Tree {0} could not be evaluated")]
    TreeEvaluation(usize),

    #[error("Model has no trees")]
    EmptyForest,
}

/// Training provenance stored next to the trees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelMetadata {
    /// Unix seconds at which training finished
    pub created_at: u64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    pub training_samples: usize,
    /// R² on the held-out split, when one was evaluated
    pub r2_score: Option<f64>,
    /// Version of the crate that produced the model
    pub trainer_version: String,
}

/// Random-forest regressor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestModel {
    pub version: i32,

    /// Input columns in the order rows must be presented
    pub feature_names: Vec<String>,

    pub trees: Vec<Tree>,

    pub metadata: ModelMetadata,
}

impl ForestModel {
    pub fn new(feature_names: Vec<String>, trees: Vec<Tree>, metadata: ModelMetadata) -> Self {
        Self {
            version: FORMAT_VERSION,
            feature_names,
            trees,
            metadata,
        }
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != FORMAT_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if self.feature_names.is_empty() {
            return Err(ModelError::ValidationFailed(
                "Model declares no features".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if !seen.insert(name.as_str()) {
                return Err(ModelError::ValidationFailed(format!(
                    "Duplicate feature name: {name}"
                )));
            }
        }

        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len()).map_err(|e| {
                ModelError::ValidationFailed(format!("Tree {i} validation failed: {e}"))
            })?;
        }

        Ok(())
    }

    /// Indexed view of the declared feature names
    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.feature_names.clone())
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Predict a single row: the mean of every tree's leaf value
    pub fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }

        if row.len() != self.feature_names.len() {
            return Err(ModelError::SchemaMismatch {
                expected: self.feature_names.len(),
                actual: row.len(),
            });
        }

        let mut sum = 0.0;
        for (i, tree) in self.trees.iter().enumerate() {
            sum += tree.evaluate(row).ok_or(ModelError::TreeEvaluation(i))?;
        }

        let prediction = sum / self.trees.len() as f64;
        if !prediction.is_finite() {
            return Err(ModelError::NonFinite(prediction));
        }

        Ok(prediction)
    }

    /// Predict many rows, failing on the first bad one
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Serialize model to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// BLAKE3 hash of the canonical JSON representation, hex encoded
    pub fn hash_hex(&self) -> Result<String, ModelError> {
        Ok(hash_canonical_hex(self)?)
    }

    /// Save model to a canonical JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let json = self.to_canonical_json()?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a model from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        let model: ForestModel = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }
}
