//! CSV dataset loading and feature preparation
//!
//! Reads a headed flight-fare CSV, checks the required columns, parses the
//! journey date and encodes every row into the serving feature schema:
//! the numeric fields followed by one `Airline_<name>` column per airline
//! seen in the data.

use chrono::{Datelike, NaiveDate};
use farecast_core::encoding::airline_column;
use farecast_core::features::{field, NUMERIC_FIELDS};
use farecast_core::{route_code, City};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, warn};

use crate::deterministic::LcgRng;
use crate::errors::TrainerError;

pub const TARGET_COLUMN: &str = "Price";
pub const DATE_COLUMN: &str = "Date_of_Journey";
pub const AIRLINE_COLUMN: &str = "Airline";

/// Columns that must be present in the input CSV
pub const REQUIRED_COLUMNS: [&str; 11] = [
    AIRLINE_COLUMN,
    DATE_COLUMN,
    field::SOURCE,
    field::DESTINATION,
    field::TOTAL_STOPS,
    field::DEP_HOUR,
    field::DEP_MIN,
    field::ARR_HOUR,
    field::ARR_MIN,
    field::DURATION_MINUTES,
    TARGET_COLUMN,
];

/// Day-first formats tried for `Date_of_Journey`
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Per-feature (min, max)
pub type FeatureStats = Vec<(f64, f64)>;

/// Training dataset with named features and a price target
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>, features: Vec<Vec<f64>>, targets: Vec<f64>) -> Self {
        Self {
            feature_names,
            features,
            targets,
        }
    }

    /// Load and encode a headed CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrainerError::DatasetNotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let columns: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !columns.contains_key(*col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TrainerError::MissingColumns(missing));
        }

        let records = reader
            .records()
            .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;
        if records.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }
        debug!("Read {} records with {} columns", records.len(), headers.len());

        let table = Table { columns, records };
        table.encode()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Rows selected by index, in the given order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Shuffle with `seed`, then hold out `ceil(test_fraction * n)` rows.
    ///
    /// Returns `(train, test)`.
    pub fn train_test_split(
        &self,
        test_fraction: f64,
        seed: u64,
    ) -> Result<(Self, Self), TrainerError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(TrainerError::Config(format!(
                "test fraction must be in (0, 1), got {test_fraction}"
            )));
        }

        let n = self.len();
        let n_test = (test_fraction * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(TrainerError::Config(format!(
                "cannot split {n} samples with test fraction {test_fraction}"
            )));
        }

        let mut order: Vec<usize> = (0..n).collect();
        LcgRng::new(seed).shuffle(&mut order);

        let (test_idx, train_idx) = order.split_at(n_test);
        Ok((self.subset(train_idx), self.subset(test_idx)))
    }

    /// Feature (min, max) pairs for logging
    pub fn feature_stats(&self) -> FeatureStats {
        let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY); self.feature_count()];

        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }
}

struct Table<'h> {
    columns: HashMap<&'h str, usize>,
    records: Vec<csv::StringRecord>,
}

impl Table<'_> {
    fn value(&self, row: usize, column: &str) -> &str {
        self.columns
            .get(column)
            .and_then(|&idx| self.records[row].get(idx))
            .unwrap_or("")
    }

    /// Header is line 1
    fn line(row: usize) -> usize {
        row + 2
    }

    fn invalid(&self, row: usize, column: &str) -> TrainerError {
        TrainerError::InvalidValue {
            line: Self::line(row),
            column: column.to_string(),
            value: self.value(row, column).to_string(),
        }
    }

    fn number(&self, row: usize, column: &str) -> Result<f64, TrainerError> {
        parse_number(self.value(row, column)).ok_or_else(|| self.invalid(row, column))
    }

    fn city(&self, row: usize, column: &str, encode: fn(City) -> i64) -> Result<i64, TrainerError> {
        let raw = self.value(row, column);
        if let Some(city) = City::from_name(raw) {
            return Ok(encode(city));
        }
        parse_number(raw)
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64)
            .ok_or_else(|| self.invalid(row, column))
    }

    /// `(day, month)` for every row
    fn journey_dates(&self) -> Result<Vec<(f64, f64)>, TrainerError> {
        let parsed: Result<Vec<(f64, f64)>, String> = (0..self.records.len())
            .map(|row| {
                let raw = self.value(row, DATE_COLUMN);
                parse_date(raw)
                    .map(|date| (date.day() as f64, date.month() as f64))
                    .ok_or_else(|| format!("unrecognised date '{raw}' on line {}", Self::line(row)))
            })
            .collect();

        match parsed {
            Ok(dates) => Ok(dates),
            Err(err) => {
                warn!("Date parsing error on {DATE_COLUMN}: {err}. Using original column.");
                let has_month = self.columns.contains_key(field::JOURNEY_MONTH);
                (0..self.records.len())
                    .map(|row| {
                        let day = self.number(row, DATE_COLUMN)?;
                        let month = if has_month {
                            self.number(row, field::JOURNEY_MONTH)?
                        } else {
                            0.0
                        };
                        Ok((day, month))
                    })
                    .collect()
            }
        }
    }

    fn encode(&self) -> Result<Dataset, TrainerError> {
        let dates = self.journey_dates()?;

        let airlines: BTreeSet<&str> = (0..self.records.len())
            .map(|row| self.value(row, AIRLINE_COLUMN))
            .collect();
        if airlines.contains("") {
            let row = (0..self.records.len())
                .find(|&row| self.value(row, AIRLINE_COLUMN).is_empty())
                .unwrap_or(0);
            return Err(self.invalid(row, AIRLINE_COLUMN));
        }

        let mut feature_names: Vec<String> = NUMERIC_FIELDS.iter().map(|s| s.to_string()).collect();
        let airline_offset = feature_names.len();
        let airline_index: HashMap<&str, usize> = airlines
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, airline_offset + i))
            .collect();
        feature_names.extend(airlines.iter().map(|name| airline_column(name)));

        let mut features = Vec::with_capacity(self.records.len());
        let mut targets = Vec::with_capacity(self.records.len());

        for (row, (day, month)) in dates.into_iter().enumerate() {
            let source = self.city(row, field::SOURCE, City::source_code)?;
            let destination = self.city(row, field::DESTINATION, City::destination_code)?;
            let stops = parse_stops(self.value(row, field::TOTAL_STOPS))
                .ok_or_else(|| self.invalid(row, field::TOTAL_STOPS))?;

            let mut values = vec![
                source as f64,
                destination as f64,
                route_code(source, destination) as f64,
                stops,
                day,
                month,
                self.number(row, field::DEP_HOUR)?,
                self.number(row, field::DEP_MIN)?,
                self.number(row, field::ARR_HOUR)?,
                self.number(row, field::ARR_MIN)?,
                self.number(row, field::DURATION_MINUTES)?,
            ];
            values.resize(feature_names.len(), 0.0);
            values[airline_index[self.value(row, AIRLINE_COLUMN)]] = 1.0;

            features.push(values);
            targets.push(self.number(row, TARGET_COLUMN)?);
        }

        Ok(Dataset::new(feature_names, features, targets))
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

/// Stop count from `2`, `non-stop`, `1 stop` or `3 stops`
fn parse_stops(raw: &str) -> Option<f64> {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized == "non-stop" || normalized == "nonstop" {
        return Some(0.0);
    }

    let count = normalized
        .strip_suffix(" stops")
        .or_else(|| normalized.strip_suffix(" stop"))
        .unwrap_or(&normalized);
    parse_number(count).filter(|v| *v >= 0.0)
}
