//! Fixed encoding tables for cities and airlines
//!
//! The integer codes match the label encoding the fare models were trained
//! with. Source and destination use different orderings, so a city has two
//! codes depending on which end of the route it sits.

use crate::errors::EncodingError;
use std::fmt;

/// Prefix of every one-hot airline column in the feature schema
pub const AIRLINE_COLUMN_PREFIX: &str = "Airline_";

/// One of the six airports the service knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum City {
    Delhi,
    Kolkata,
    Bangalore,
    Mumbai,
    Hyderabad,
    Cochin,
}

impl City {
    pub const ALL: [City; 6] = [
        City::Delhi,
        City::Kolkata,
        City::Bangalore,
        City::Mumbai,
        City::Hyderabad,
        City::Cochin,
    ];

    /// Three-letter airport code used by the web form
    pub fn code(self) -> &'static str {
        match self {
            City::Delhi => "DEL",
            City::Kolkata => "CCU",
            City::Bangalore => "BLR",
            City::Mumbai => "BOM",
            City::Hyderabad => "HYD",
            City::Cochin => "COK",
        }
    }

    /// Encoded value when the city is the departure airport
    pub fn source_code(self) -> i64 {
        match self {
            City::Delhi => 0,
            City::Kolkata => 1,
            City::Bangalore => 2,
            City::Mumbai => 3,
            City::Hyderabad => 4,
            City::Cochin => 5,
        }
    }

    /// Encoded value when the city is the arrival airport
    pub fn destination_code(self) -> i64 {
        match self {
            City::Delhi => 0,
            City::Mumbai => 1,
            City::Bangalore => 2,
            City::Kolkata => 3,
            City::Hyderabad => 4,
            City::Cochin => 5,
        }
    }

    /// Strict lookup by airport code (case-sensitive)
    pub fn from_code(code: &str) -> Result<Self, EncodingError> {
        Self::ALL
            .into_iter()
            .find(|city| city.code() == code)
            .ok_or_else(|| EncodingError::UnknownCity(code.to_string()))
    }

    /// Lenient lookup used for dataset ingestion.
    ///
    /// Accepts airport codes and the common spellings found in fare
    /// datasets, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let city = match normalized.as_str() {
            "del" | "delhi" | "new delhi" => City::Delhi,
            "ccu" | "kolkata" | "calcutta" => City::Kolkata,
            "blr" | "bangalore" | "banglore" | "bengaluru" => City::Bangalore,
            "bom" | "mumbai" | "bombay" => City::Mumbai,
            "hyd" | "hyderabad" => City::Hyderabad,
            "cok" | "cochin" | "kochi" => City::Cochin,
            _ => return None,
        };
        Some(city)
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Combine encoded source and destination into a single route identifier
pub fn route_code(source: i64, destination: i64) -> i64 {
    source * 10 + destination
}

/// Airlines offered in the fare comparison, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Airline {
    IndiGo,
    AirIndia,
    Vistara,
    SpiceJet,
    GoAir,
    Trujet,
}

impl Airline {
    pub const ALL: [Airline; 6] = [
        Airline::IndiGo,
        Airline::AirIndia,
        Airline::Vistara,
        Airline::SpiceJet,
        Airline::GoAir,
        Airline::Trujet,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Airline::IndiGo => "IndiGo",
            Airline::AirIndia => "Air India",
            Airline::Vistara => "Vistara",
            Airline::SpiceJet => "SpiceJet",
            Airline::GoAir => "GoAir",
            Airline::Trujet => "Trujet",
        }
    }

    /// One-hot schema column for this airline
    pub fn column(self) -> &'static str {
        match self {
            Airline::IndiGo => "Airline_IndiGo",
            Airline::AirIndia => "Airline_Air India",
            Airline::Vistara => "Airline_Vistara",
            Airline::SpiceJet => "Airline_SpiceJet",
            Airline::GoAir => "Airline_GoAir",
            Airline::Trujet => "Airline_Trujet",
        }
    }
}

impl fmt::Display for Airline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One-hot column name for an arbitrary airline label
pub fn airline_column(name: &str) -> String {
    format!("{AIRLINE_COLUMN_PREFIX}{}", name.trim())
}
