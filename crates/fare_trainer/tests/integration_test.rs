//! Integration tests for the training pipeline
//!
//! Runs the full CSV → artifact flow on a synthetic fare table.

use anyhow::Result;
use farecast_core::artifact::{hash_path, load_model};
use farecast_core::{Airline, FeatureSchema, JourneyQuery};
use farecast_trainer::{repack, run_training, ForestConfig, TrainerError, TrainingOptions};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "Airline,Date_of_Journey,Source,Destination,Total_Stops,Dep_Hour,Dep_Min,Arr_Hour,Arr_Min,Duration_Minutes,Price";

const AIRLINES: [(&str, i64); 4] = [
    ("IndiGo", 0),
    ("Air India", 1800),
    ("Vistara", 1200),
    ("SpiceJet", 300),
];

const ROUTES: [(&str, &str); 4] = [
    ("Delhi", "Cochin"),
    ("Banglore", "New Delhi"),
    ("Kolkata", "Banglore"),
    ("Mumbai", "Hyderabad"),
];

/// Prices follow stops, duration and airline with a little deterministic noise
fn write_synthetic_csv(path: &Path, rows: usize) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{HEADER}")?;

    for i in 0..rows {
        let (airline, premium) = AIRLINES[i % AIRLINES.len()];
        let (source, dest) = ROUTES[(i / 4) % ROUTES.len()];
        let stops = (i / 3) % 3;
        let dep_hour = (i * 5) % 24;
        let duration = 90 + stops * 150 + (i % 7) * 10;
        let arr_hour = (dep_hour + duration / 60) % 24;
        let day = 1 + i % 28;
        let month = 3 + i % 4;
        let noise = ((i * 37) % 11) as i64 * 15;
        let price = 2500 + premium + stops as i64 * 2000 + duration as i64 * 4 + noise;
        let stops_label = match stops {
            0 => "non-stop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{n} stops"),
        };

        writeln!(
            file,
            "{airline},{day:02}/{month:02}/2019,{source},{dest},{stops_label},{dep_hour},0,{arr_hour},0,{duration},{price}"
        )?;
    }

    Ok(())
}

fn small_options(dir: &TempDir, csv: &Path) -> TrainingOptions {
    let mut options = TrainingOptions::new(csv, dir.path().join("out").join("model.bin.gz"));
    options.forest = ForestConfig {
        num_trees: 24,
        max_depth: 10,
        ..ForestConfig::default()
    };
    options.compression_level = 6;
    options
}

#[test]
fn test_training_writes_artifact() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = dir.path().join("flights.csv");
    write_synthetic_csv(&csv, 240)?;

    let options = small_options(&dir, &csv);
    let report = run_training(&options)?;

    assert!(options.output.exists());
    assert!(hash_path(&options.output).exists());
    assert_eq!(report.train_samples, 192);
    assert_eq!(report.test_samples, 48);
    assert_eq!(report.tree_count, 24);
    assert!(report.r2 >= 0.0, "r2 = {}", report.r2);
    assert!(report.r2 > 0.5, "r2 = {}", report.r2);

    let model = load_model(&options.output)?;
    assert_eq!(model.metadata.r2_score, Some(report.r2));
    assert_eq!(model.num_features(), report.feature_count);
    assert!(model.feature_names.contains(&"Airline_Air India".to_string()));

    Ok(())
}

#[test]
fn test_trained_model_serves_rows() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = dir.path().join("flights.csv");
    write_synthetic_csv(&csv, 160)?;

    let options = small_options(&dir, &csv);
    run_training(&options)?;

    let model = load_model(&options.output)?;
    let schema: FeatureSchema = model.schema();
    let query = JourneyQuery::new("DEL", "COK", 15, 5, 9, 11)?;

    for (airline, row) in schema.build_rows(&query) {
        let price = model.predict(&row)?;
        assert!(price.is_finite() && price > 0.0, "{airline}: {price}");
    }

    // GoAir and Trujet are absent from the data, so their rows carry no
    // airline column at all
    let goair = schema.build_row(&query, Airline::GoAir);
    assert!(schema.airline_columns().all(|c| goair[schema.position(c).unwrap()] == 0.0));

    Ok(())
}

#[test]
fn test_training_is_reproducible() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = dir.path().join("flights.csv");
    write_synthetic_csv(&csv, 120)?;

    let mut first = small_options(&dir, &csv);
    first.output = dir.path().join("a.bin.gz");
    let mut second = small_options(&dir, &csv);
    second.output = dir.path().join("b.bin.gz");

    let report_a = run_training(&first)?;
    let report_b = run_training(&second)?;
    assert_eq!(report_a.r2, report_b.r2);

    let a = load_model(&first.output)?;
    let b = load_model(&second.output)?;
    assert_eq!(a.trees, b.trees);

    Ok(())
}

#[test]
fn test_missing_column_writes_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = dir.path().join("flights.csv");
    let mut file = std::fs::File::create(&csv)?;
    writeln!(file, "Airline,Date_of_Journey,Source,Destination,Price")?;
    writeln!(file, "IndiGo,24/03/2019,Delhi,Cochin,3897")?;
    drop(file);

    let options = small_options(&dir, &csv);
    let err = run_training(&options).unwrap_err();

    assert!(matches!(err, TrainerError::MissingColumns(ref cols) if cols.contains(&"Total_Stops".to_string())));
    assert!(!options.output.exists());
    assert!(!hash_path(&options.output).exists());

    Ok(())
}

#[test]
fn test_missing_dataset_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let options = small_options(&dir, &dir.path().join("nope.csv"));

    assert!(matches!(
        run_training(&options),
        Err(TrainerError::DatasetNotFound(_))
    ));
    assert!(!options.output.exists());
}

#[test]
fn test_repack_json_model() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = dir.path().join("flights.csv");
    write_synthetic_csv(&csv, 80)?;

    let options = small_options(&dir, &csv);
    run_training(&options)?;
    let model = load_model(&options.output)?;

    let json_path = dir.path().join("model.json");
    model.save_json(&json_path)?;

    let repacked = dir.path().join("model_compressed.bin.gz");
    let digest = repack(&json_path, &repacked, 3)?;

    assert_eq!(std::fs::read_to_string(hash_path(&repacked))?, digest);

    let reloaded = load_model(&repacked)?;
    assert_eq!(reloaded.feature_names, model.feature_names);
    assert_eq!(reloaded.num_trees(), model.num_trees());

    let row = vec![1.0; model.num_features()];
    let delta = reloaded.predict(&row)? - model.predict(&row)?;
    assert!(delta.abs() < 1e-6);

    Ok(())
}
