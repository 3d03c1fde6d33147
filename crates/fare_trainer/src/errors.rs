use farecast_core::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the fare model trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset file '{}' not found", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("following columns are missing from the CSV: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("line {line}, column {column}: invalid value '{value}'")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid training configuration: {0}")]
    Config(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
