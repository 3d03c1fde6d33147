//! Serving and configuration errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use farecast_core::{EncodingError, ModelError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Why a fare request could not be answered
///
/// Every kind is reported to the client with HTTP 200 and the
/// `{"error": "Model prediction failed: ...", "code": ...}` envelope.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Bad JSON, missing or non-integer field, unknown city, bad hour or date
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    ModelUnavailable(String),

    /// Schema mismatch or non-finite model output
    #[error("{0}")]
    InternalPredictionError(String),
}

impl PredictionError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::ValidationError(message.into())
    }

    /// Stable machine-readable code for the envelope
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            Self::InternalPredictionError(_) => "INTERNAL_PREDICTION_ERROR",
        }
    }
}

impl From<EncodingError> for PredictionError {
    fn from(err: EncodingError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<ModelError> for PredictionError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::EmptyForest => Self::ModelUnavailable(err.to_string()),
            other => Self::InternalPredictionError(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: format!("Model prediction failed: {self}"),
            code: self.code(),
        });
        (StatusCode::OK, payload).into_response()
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        reason: String,
    },
}
