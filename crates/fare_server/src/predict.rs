//! Fare request handling: parsing, per-airline prediction and ranking

use crate::errors::PredictionError;
use chrono::NaiveDate;
use farecast_core::{Airline, FeatureSchema, ForestModel, JourneyQuery};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `POST /predict-api`
///
/// Numeric fields accept JSON integers or strings holding an integer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictRequest {
    pub source_code: String,
    pub dest_code: String,
    #[serde(deserialize_with = "lenient_int")]
    pub day: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub month: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub year: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub dep_hour: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub arr_hour: i64,
}

impl PredictRequest {
    pub fn from_json(body: &[u8]) -> Result<Self, PredictionError> {
        serde_json::from_slice(body)
            .map_err(|e| PredictionError::validation(format!("invalid request: {e}")))
    }

    /// Resolve codes and hours into a feature-ready query
    pub fn to_query(&self) -> Result<JourneyQuery, PredictionError> {
        JourneyQuery::new(
            &self.source_code,
            &self.dest_code,
            self.day,
            self.month,
            self.dep_hour,
            self.arr_hour,
        )
        .map_err(PredictionError::from)
    }

    /// `SRC → DST` using the codes as submitted
    pub fn route_label(&self) -> String {
        format!("{} → {}", self.source_code, self.dest_code)
    }

    /// Journey date as `DD Mon YYYY`
    pub fn journey_date(&self) -> Result<String, PredictionError> {
        let invalid = || {
            PredictionError::validation(format!(
                "invalid journey date {}-{}-{}",
                self.year, self.month, self.day
            ))
        };

        let year = i32::try_from(self.year).map_err(|_| invalid())?;
        let month = u32::try_from(self.month).map_err(|_| invalid())?;
        let day = u32::try_from(self.day).map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

        Ok(date.format("%d %b %Y").to_string())
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientInt;

    impl<'de> Visitor<'de> for LenientInt {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(LenientInt)
}

/// One airline's entry in the result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FareQuote {
    pub airline_name: String,
    pub duration: i64,
    pub stops: u32,
    pub price: String,
}

/// Successful `POST /predict-api` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictResponse {
    pub route: String,
    pub journey_date: String,
    pub results: Vec<FareQuote>,
    pub status: &'static str,
}

/// Integer with comma thousands separators: `12345` → `12,345`
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round, format and sort raw predictions, cheapest first.
///
/// Rounding is half-to-even. Equal prices keep their input order.
pub fn rank_quotes(predictions: Vec<(Airline, f64)>, duration: i64) -> Vec<FareQuote> {
    let mut priced: Vec<(i64, FareQuote)> = predictions
        .into_iter()
        .map(|(airline, price)| {
            let rounded = price.round_ties_even() as i64;
            let quote = FareQuote {
                airline_name: airline.display_name().to_string(),
                duration,
                stops: 0,
                price: format_thousands(rounded),
            };
            (rounded, quote)
        })
        .collect();

    priced.sort_by_key(|(rounded, _)| *rounded);
    priced.into_iter().map(|(_, quote)| quote).collect()
}

/// Answer one fare request against a loaded model
pub fn predict_fares(
    model: &ForestModel,
    schema: &FeatureSchema,
    request: &PredictRequest,
) -> Result<PredictResponse, PredictionError> {
    let query = request.to_query()?;
    let journey_date = request.journey_date()?;

    let mut predictions = Vec::with_capacity(Airline::ALL.len());
    for (airline, row) in schema.build_rows(&query) {
        predictions.push((airline, model.predict(&row)?));
    }

    Ok(PredictResponse {
        route: request.route_label(),
        journey_date,
        results: rank_quotes(predictions, query.duration_minutes()),
        status: "success",
    })
}
