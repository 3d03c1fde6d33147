//! Farecast trainer CLI
//!
//! `fare-train train` fits the fare model from a CSV dataset;
//! `fare-train repack` recompresses an existing model artifact.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use farecast_trainer::{repack, run_training, ForestConfig, TrainingOptions};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fare-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random-forest trainer for Farecast fare models", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model from a CSV dataset
    Train(TrainArgs),
    /// Recompress an existing model artifact
    Repack(RepackArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Input CSV dataset path
    #[arg(short, long, default_value = "flights.csv")]
    input: PathBuf,

    /// Output path for the compressed model
    #[arg(short, long, default_value = "model_forest.bin.gz")]
    output: PathBuf,

    /// Number of trees in the forest
    #[arg(long, default_value = "400")]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "25")]
    max_depth: usize,

    /// Minimum samples required to split a node
    #[arg(long, default_value = "2")]
    min_samples_split: usize,

    /// Minimum samples per leaf
    #[arg(long, default_value = "1")]
    min_samples_leaf: usize,

    /// Random seed for the split and bootstrap sampling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// gzip compression level (0-9)
    #[arg(long, default_value = "9", value_parser = clap::value_parser!(u32).range(0..=9))]
    level: u32,

    /// Worker threads for tree fitting (defaults to all cores)
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Args, Debug)]
struct RepackArgs {
    /// Existing model (.json or compressed artifact)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the recompressed artifact
    #[arg(short, long, default_value = "model_forest_compressed.bin.gz")]
    output: PathBuf,

    /// gzip compression level (0-9)
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(0..=9))]
    level: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))?;

    info!("Farecast Trainer v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Train(args) => train(args),
        Command::Repack(args) => {
            let digest = repack(&args.input, &args.output, args.level)
                .with_context(|| format!("Failed to repack {}", args.input.display()))?;
            info!("Hash: {}", digest);
            Ok(())
        }
    }
}

fn train(args: TrainArgs) -> Result<()> {
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let options = TrainingOptions {
        input: args.input,
        output: args.output,
        forest: ForestConfig {
            num_trees: args.trees,
            max_depth: args.max_depth,
            min_samples_split: args.min_samples_split,
            min_samples_leaf: args.min_samples_leaf,
            seed: args.seed,
            bootstrap: true,
        },
        test_fraction: args.test_fraction,
        compression_level: args.level,
    };

    let report = run_training(&options).context("Training failed")?;

    info!("✓ Model saved successfully");
    info!("  Model: {}", report.model_path.display());
    info!("  Hash: {}", report.model_hash);
    info!(
        "  Trees: {}, features: {}, train/test: {}/{}",
        report.tree_count, report.feature_count, report.train_samples, report.test_samples
    );
    info!("  R2: {:.4}, MAE: {:.2}", report.r2, report.mae);

    Ok(())
}
