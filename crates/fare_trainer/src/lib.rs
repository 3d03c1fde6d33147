//! Farecast Trainer - offline random-forest fare model trainer
//!
//! Turns a flight-fare CSV into a compressed forest artifact that the
//! serving process loads at startup.

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod metrics;
pub mod pipeline;
pub mod trainer;

pub use dataset::{Dataset, FeatureStats, REQUIRED_COLUMNS, TARGET_COLUMN};
pub use deterministic::LcgRng;
pub use errors::TrainerError;
pub use metrics::r2_score;
pub use pipeline::{repack, run_training, TrainingOptions, TrainingReport};
pub use trainer::{ForestConfig, ForestTrainer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
