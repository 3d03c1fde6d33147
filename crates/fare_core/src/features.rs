//! Feature schema and row construction
//!
//! A model declares the ordered columns it was trained on. Inference rows are
//! built against that declaration: every column starts at zero and only the
//! fields the builder knows about are filled in.

use crate::encoding::{route_code, Airline, City, AIRLINE_COLUMN_PREFIX};
use crate::errors::EncodingError;
use std::collections::HashMap;

/// Dense feature row aligned with a [`FeatureSchema`]
pub type FeatureRow = Vec<f64>;

/// Named numeric columns shared by the trainer and the row builder
pub mod field {
    pub const SOURCE: &str = "Source";
    pub const DESTINATION: &str = "Destination";
    pub const ROUTE: &str = "Route";
    pub const TOTAL_STOPS: &str = "Total_Stops";
    pub const JOURNEY_DAY: &str = "Journey_Day";
    pub const JOURNEY_MONTH: &str = "Journey_Month";
    pub const DEP_HOUR: &str = "Dep_Hour";
    pub const DEP_MIN: &str = "Dep_Min";
    pub const ARR_HOUR: &str = "Arr_Hour";
    pub const ARR_MIN: &str = "Arr_Min";
    pub const DURATION_MINUTES: &str = "Duration_Minutes";
}

/// Numeric columns in training order. Airline one-hot columns follow them.
pub const NUMERIC_FIELDS: [&str; 11] = [
    field::SOURCE,
    field::DESTINATION,
    field::ROUTE,
    field::TOTAL_STOPS,
    field::JOURNEY_DAY,
    field::JOURNEY_MONTH,
    field::DEP_HOUR,
    field::DEP_MIN,
    field::ARR_HOUR,
    field::ARR_MIN,
    field::DURATION_MINUTES,
];

const MINUTES_PER_DAY: i64 = 1440;

/// Trip length in minutes from whole departure and arrival hours.
///
/// A negative span is treated as an overnight flight and wrapped by one day.
/// Multi-day trips are not representable.
pub fn duration_minutes(dep_hour: i64, arr_hour: i64) -> i64 {
    let minutes = (arr_hour - dep_hour) * 60;
    if minutes < 0 {
        minutes + MINUTES_PER_DAY
    } else {
        minutes
    }
}

/// Ordered column names with a name → position index
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// One-hot airline columns declared by the schema, in schema order
    pub fn airline_columns(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|name| name.starts_with(AIRLINE_COLUMN_PREFIX))
    }

    pub fn zero_row(&self) -> FeatureRow {
        vec![0.0; self.names.len()]
    }

    /// Set a named column if the schema declares it
    pub fn set(&self, row: &mut [f64], name: &str, value: f64) -> bool {
        match self.position(name) {
            Some(idx) if idx < row.len() => {
                row[idx] = value;
                true
            }
            _ => false,
        }
    }

    /// Build the feature row for one airline.
    ///
    /// Columns set:
    /// - Source / Destination / Route from the encoded cities
    /// - Journey_Day / Journey_Month from the query
    /// - Dep_Hour / Arr_Hour from the query, minutes fixed at 0
    /// - Total_Stops fixed at 0
    /// - Duration_Minutes from [`duration_minutes`]
    /// - the airline's one-hot column set to 1
    pub fn build_row(&self, query: &JourneyQuery, airline: Airline) -> FeatureRow {
        let mut row = self.zero_row();
        let source = query.source.source_code();
        let destination = query.destination.destination_code();

        self.set(&mut row, field::SOURCE, source as f64);
        self.set(&mut row, field::DESTINATION, destination as f64);
        self.set(&mut row, field::ROUTE, route_code(source, destination) as f64);
        self.set(&mut row, field::TOTAL_STOPS, 0.0);
        self.set(&mut row, field::JOURNEY_DAY, query.day as f64);
        self.set(&mut row, field::JOURNEY_MONTH, query.month as f64);
        self.set(&mut row, field::DEP_HOUR, query.dep_hour as f64);
        self.set(&mut row, field::DEP_MIN, 0.0);
        self.set(&mut row, field::ARR_HOUR, query.arr_hour as f64);
        self.set(&mut row, field::ARR_MIN, 0.0);
        self.set(&mut row, field::DURATION_MINUTES, query.duration_minutes() as f64);
        self.set(&mut row, airline.column(), 1.0);

        row
    }

    /// One row per known airline, in [`Airline::ALL`] order
    pub fn build_rows(&self, query: &JourneyQuery) -> Vec<(Airline, FeatureRow)> {
        Airline::ALL
            .into_iter()
            .map(|airline| (airline, self.build_row(query, airline)))
            .collect()
    }
}

/// Validated journey parameters from the fare form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyQuery {
    pub source: City,
    pub destination: City,
    pub day: i64,
    pub month: i64,
    pub dep_hour: i64,
    pub arr_hour: i64,
}

impl JourneyQuery {
    /// Resolve city codes and check hour ranges.
    ///
    /// Calendar validity of day/month is left to the caller.
    pub fn new(
        source_code: &str,
        dest_code: &str,
        day: i64,
        month: i64,
        dep_hour: i64,
        arr_hour: i64,
    ) -> Result<Self, EncodingError> {
        let source = City::from_code(source_code)?;
        let destination = City::from_code(dest_code)?;
        check_hour("dep_hour", dep_hour)?;
        check_hour("arr_hour", arr_hour)?;

        Ok(Self {
            source,
            destination,
            day,
            month,
            dep_hour,
            arr_hour,
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        duration_minutes(self.dep_hour, self.arr_hour)
    }
}

fn check_hour(field: &'static str, value: i64) -> Result<(), EncodingError> {
    if (0..=23).contains(&value) {
        Ok(())
    } else {
        Err(EncodingError::HourOutOfRange { field, value })
    }
}
