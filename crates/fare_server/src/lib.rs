//! Farecast Server - fare estimation over HTTP
//!
//! Loads a trained forest once at startup and answers fare queries for the
//! fixed airline list, cheapest first.

pub mod config;
pub mod errors;
pub mod predict;
pub mod server;

pub use config::ServerConfig;
pub use errors::{ConfigError, PredictionError};
pub use predict::{format_thousands, rank_quotes, FareQuote, PredictRequest, PredictResponse};
pub use server::{build_router, start_server, AppState, SharedState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "farecast-server";
