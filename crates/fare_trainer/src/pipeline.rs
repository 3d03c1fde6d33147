//! End-to-end training and repacking
//!
//! `run_training` is the whole offline flow: load, split, fit, evaluate and
//! write the compressed artifact. Nothing is written unless every earlier
//! stage succeeded.

use farecast_core::artifact::{load_model, save_compressed, DEFAULT_COMPRESSION_LEVEL};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::Dataset;
use crate::errors::TrainerError;
use crate::metrics::{mean_absolute_error, r2_score};
use crate::trainer::{ForestConfig, ForestTrainer};

/// Inputs to a training run
#[derive(Clone, Debug)]
pub struct TrainingOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub forest: ForestConfig,
    pub test_fraction: f64,
    pub compression_level: u32,
}

impl TrainingOptions {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output: Q) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            forest: ForestConfig::default(),
            test_fraction: 0.2,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Outcome of a successful training run
#[derive(Clone, Debug)]
pub struct TrainingReport {
    pub model_path: PathBuf,
    pub model_hash: String,
    pub train_samples: usize,
    pub test_samples: usize,
    pub feature_count: usize,
    pub tree_count: usize,
    pub r2: f64,
    pub mae: f64,
}

pub fn run_training(options: &TrainingOptions) -> Result<TrainingReport, TrainerError> {
    info!("Loading data from {}...", options.input.display());
    let dataset = Dataset::from_csv(&options.input)?;
    info!(
        "Loaded {} samples with {} features",
        dataset.len(),
        dataset.feature_count()
    );

    for (name, (min, max)) in dataset.feature_names.iter().zip(dataset.feature_stats()) {
        tracing::debug!("  {}: min={}, max={}", name, min, max);
    }

    info!(
        "Splitting data into training ({:.0}%) and testing ({:.0}%) sets...",
        (1.0 - options.test_fraction) * 100.0,
        options.test_fraction * 100.0
    );
    let (train, test) = dataset.train_test_split(options.test_fraction, options.forest.seed)?;
    info!("Train samples: {}, Test samples: {}", train.len(), test.len());

    let forest = &options.forest;
    info!(
        "Training random forest: {} trees, max depth {}, min split {}, min leaf {}, seed {}",
        forest.num_trees,
        forest.max_depth,
        forest.min_samples_split,
        forest.min_samples_leaf,
        forest.seed
    );
    let mut model = ForestTrainer::new(forest.clone()).train(&train)?;

    let predictions = model.predict_batch(&test.features)?;
    let r2 = r2_score(&test.targets, &predictions);
    let mae = mean_absolute_error(&test.targets, &predictions);
    model.metadata.r2_score = Some(r2);
    info!("Training complete. Random Forest R2 Score: {:.4}", r2);
    info!("Mean absolute error on test set: {:.2}", mae);

    info!(
        "Saving model to {} (gzip level {})...",
        options.output.display(),
        options.compression_level
    );
    let model_hash = save_compressed(&model, &options.output, options.compression_level)?;

    Ok(TrainingReport {
        model_path: options.output.clone(),
        model_hash,
        train_samples: train.len(),
        test_samples: test.len(),
        feature_count: model.num_features(),
        tree_count: model.num_trees(),
        r2,
        mae,
    })
}

/// Rewrite any loadable model as a compressed artifact at `level`.
///
/// Returns the digest of the new artifact.
pub fn repack(input: &Path, output: &Path, level: u32) -> Result<String, TrainerError> {
    let model = load_model(input)?;
    let digest = save_compressed(&model, output, level)?;
    info!(
        "Compressed model saved as {} ({} trees)",
        output.display(),
        model.num_trees()
    );
    Ok(digest)
}
