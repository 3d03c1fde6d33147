//! Random-forest trainer
//!
//! Fits bagged CART regression trees in parallel. Each tree draws its
//! bootstrap sample from an RNG seeded by `(seed, tree index)`, so the forest
//! does not depend on thread scheduling.

use farecast_core::{ForestModel, ModelMetadata, Tree};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::Dataset;
use crate::deterministic::{tree_seed, LcgRng};
use crate::errors::TrainerError;

/// Forest training configuration
#[derive(Clone, Debug)]
pub struct ForestConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    /// Draw a bootstrap sample per tree; otherwise every tree sees all rows
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 400,
            max_depth: 25,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
            bootstrap: true,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.num_trees == 0 {
            return Err(TrainerError::Config("num_trees must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(TrainerError::Config(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainerError::Config(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

/// Random-forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train a forest on the given dataset
    pub fn train(&self, dataset: &Dataset) -> Result<ForestModel, TrainerError> {
        self.config.validate()?;
        if dataset.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }

        let n_samples = dataset.len();
        let num_trees = self.config.num_trees;
        let tree_config = self.config.tree_config();
        let builder = CartBuilder::new(&dataset.features, &dataset.targets, tree_config);
        let finished = AtomicUsize::new(0);
        let report_every = (num_trees / 10).max(1);

        let trees: Vec<Tree> = (0..num_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let indices = self.sample_indices(tree_idx, n_samples);
                let tree = builder.build(&indices);

                let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(
                    "Tree {} fitted: {} nodes, depth {}",
                    tree_idx,
                    tree.nodes.len(),
                    tree.depth()
                );
                if done % report_every == 0 || done == num_trees {
                    tracing::info!("Trained {}/{} trees", done, num_trees);
                }
                tree
            })
            .collect();

        let metadata = ModelMetadata {
            created_at: chrono::Utc::now().timestamp() as u64,
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            seed: self.config.seed,
            training_samples: n_samples,
            r2_score: None,
            trainer_version: crate::VERSION.to_string(),
        };

        let model = ForestModel::new(dataset.feature_names.clone(), trees, metadata);
        model.validate()?;
        Ok(model)
    }

    fn sample_indices(&self, tree_idx: usize, n_samples: usize) -> Vec<usize> {
        if !self.config.bootstrap {
            return (0..n_samples).collect();
        }

        let mut rng = LcgRng::new(tree_seed(self.config.seed, tree_idx));
        (0..n_samples).map(|_| rng.next_range(n_samples)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_dataset() -> Dataset {
        // price jumps from ~1000 to ~5000 once x passes 10
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let targets: Vec<f64> = (0..40)
            .map(|i| {
                let jitter = ((i * 7) % 5) as f64 * 10.0;
                if i < 10 {
                    1000.0 + jitter
                } else {
                    5000.0 + jitter
                }
            })
            .collect();
        Dataset::new(vec!["x".into(), "noise".into()], features, targets)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            num_trees: 8,
            max_depth: 4,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_train_simple_forest() {
        let model = ForestTrainer::new(small_config())
            .train(&step_dataset())
            .unwrap();

        assert_eq!(model.num_trees(), 8);
        assert_eq!(model.feature_names, vec!["x".to_string(), "noise".to_string()]);
        assert_eq!(model.metadata.training_samples, 40);
        assert_eq!(model.metadata.max_depth, 4);

        let low = model.predict(&[2.0, 0.0]).unwrap();
        let high = model.predict(&[30.0, 0.0]).unwrap();
        assert!(low < 2000.0, "low = {low}");
        assert!(high > 4000.0, "high = {high}");
    }

    #[test]
    fn test_determinism() {
        let dataset = step_dataset();
        let model1 = ForestTrainer::new(small_config()).train(&dataset).unwrap();
        let model2 = ForestTrainer::new(small_config()).train(&dataset).unwrap();

        assert_eq!(model1.trees, model2.trees);
    }

    #[test]
    fn test_seed_changes_forest() {
        let dataset = step_dataset();
        let model1 = ForestTrainer::new(small_config()).train(&dataset).unwrap();
        let model2 = ForestTrainer::new(ForestConfig {
            seed: 7,
            ..small_config()
        })
        .train(&dataset)
        .unwrap();

        assert_ne!(model1.trees, model2.trees);
    }

    #[test]
    fn test_without_bootstrap_trees_match() {
        let model = ForestTrainer::new(ForestConfig {
            bootstrap: false,
            ..small_config()
        })
        .train(&step_dataset())
        .unwrap();

        assert!(model.trees.windows(2).all(|w| w[0] == w[1]));
        assert!(model.predict(&[2.0, 0.0]).unwrap() < 1100.0);
    }

    #[test]
    fn test_invalid_config() {
        let dataset = step_dataset();
        for config in [
            ForestConfig {
                num_trees: 0,
                ..ForestConfig::default()
            },
            ForestConfig {
                min_samples_split: 1,
                ..ForestConfig::default()
            },
            ForestConfig {
                min_samples_leaf: 0,
                ..ForestConfig::default()
            },
        ] {
            assert!(matches!(
                ForestTrainer::new(config).train(&dataset),
                Err(TrainerError::Config(_))
            ));
        }
    }

    #[test]
    fn test_empty_dataset() {
        let empty = Dataset::new(vec!["x".into()], vec![], vec![]);
        assert!(matches!(
            ForestTrainer::new(small_config()).train(&empty),
            Err(TrainerError::EmptyDataset)
        ));
    }
}
