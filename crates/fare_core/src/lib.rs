//! Farecast core
//!
//! Shared building blocks for the fare estimation service and the offline
//! trainer.
//!
//! Modules:
//! - `encoding`: fixed city and airline tables, route codes
//! - `features`: feature schema and per-airline row construction
//! - `forest`: random-forest regression model and tree evaluation
//! - `artifact`: compressed model artifacts with BLAKE3 sidecars
//! - `serde_canon`: canonical JSON and hashing helpers
//! - `errors`: encoding errors

pub mod artifact;
pub mod encoding;
pub mod errors;
pub mod features;
pub mod forest;
pub mod serde_canon;

pub use artifact::{hash_path, load_model, save_compressed, DEFAULT_COMPRESSION_LEVEL};
pub use encoding::{route_code, Airline, City, AIRLINE_COLUMN_PREFIX};
pub use errors::EncodingError;
pub use features::{duration_minutes, FeatureRow, FeatureSchema, JourneyQuery};
pub use forest::{ForestModel, ModelError, ModelMetadata, Node, Tree};

/// Crate version string recorded in model metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
