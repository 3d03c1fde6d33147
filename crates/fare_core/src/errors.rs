//! Error types for route and journey encoding

use thiserror::Error;

/// Errors raised while turning user input into encoded features
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// City code is not one of the six known airports
    #[error("unknown city code '{0}'")]
    UnknownCity(String),

    /// Hour field outside 0..=23
    #[error("{field} must be between 0 and 23, got {value}")]
    HourOutOfRange { field: &'static str, value: i64 },
}
