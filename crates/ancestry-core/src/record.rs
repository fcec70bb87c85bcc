//! Persisted statistics records, one typed struct per table.
//!
//! Records are immutable once written. A computation run is identified by the
//! `timestamp` shared by every row it produced.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Datelike as _, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  table::{Cell, TableRow},
};

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Render a run timestamp in the fixed-width form used for storage and export.
///
/// Microsecond precision and a numeric offset keep every value the same
/// length, so lexicographic order is chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
  ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Reject timestamps whose year needs more or fewer than four digits; their
/// rendered form would break chronological text ordering.
pub fn ensure_fixed_width(ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
  if (0..=9999).contains(&ts.year()) {
    Ok(ts)
  } else {
    Err(Error::InvalidFilter(format!(
      "timestamp {ts} is outside the years 0000-9999"
    )))
  }
}

// ─── Additional data ─────────────────────────────────────────────────────────

/// A scalar value carried in [`AdditionalData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
}

impl fmt::Display for Scalar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scalar::Bool(b) => write!(f, "{b}"),
      Scalar::Int(i) => write!(f, "{i}"),
      Scalar::Float(x) => write!(f, "{x}"),
      Scalar::Text(s) => f.write_str(s),
    }
  }
}

impl Scalar {
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      Scalar::Bool(b) => serde_json::Value::Bool(*b),
      Scalar::Int(i) => serde_json::Value::from(*i),
      Scalar::Float(x) => serde_json::Value::from(*x),
      Scalar::Text(s) => serde_json::Value::String(s.clone()),
    }
  }
}

impl From<bool> for Scalar {
  fn from(value: bool) -> Self { Scalar::Bool(value) }
}

impl From<i64> for Scalar {
  fn from(value: i64) -> Self { Scalar::Int(value) }
}

impl From<f64> for Scalar {
  fn from(value: f64) -> Self { Scalar::Float(value) }
}

impl From<&str> for Scalar {
  fn from(value: &str) -> Self { Scalar::Text(value.to_owned()) }
}

impl From<String> for Scalar {
  fn from(value: String) -> Self { Scalar::Text(value) }
}

/// Caller-supplied extra metrics stored alongside a summary.
///
/// Keys are kept sorted so the serialised form is stable.
pub type AdditionalData = BTreeMap<String, Scalar>;

// ─── Records ─────────────────────────────────────────────────────────────────

/// One row of the `summary_statistics` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
  pub id:              i64,
  pub timestamp:       DateTime<Utc>,
  pub data_source:     String,
  pub total_records:   i64,
  pub missing_values:  i64,
  pub unique_years:    i64,
  pub records_in_fs:   i64,
  pub unique_surnames: i64,
  pub additional_data: Option<AdditionalData>,
}

/// One row of the `yearly_comparison` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyComparisonRecord {
  pub id:                     i64,
  pub timestamp:              DateTime<Utc>,
  pub data_source:            String,
  pub year:                   i32,
  pub total_records:          i64,
  pub records_with_condition: i64,
  pub condition_name:         String,
}

/// One row of the `value_counts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCountRecord {
  pub id:          i64,
  pub timestamp:   DateTime<Utc>,
  pub data_source: String,
  pub column_name: String,
  pub value:       String,
  pub count:       i64,
}

// ─── Tabular projection ──────────────────────────────────────────────────────

impl TableRow for SummaryRecord {
  const COLUMNS: &'static [&'static str] = &[
    "id",
    "timestamp",
    "data_source",
    "total_records",
    "missing_values",
    "unique_years",
    "records_in_fs",
    "unique_surnames",
    "additional_data",
  ];

  fn cells(&self) -> Vec<Cell> {
    let additional = self.additional_data.as_ref().map_or(Cell::Null, |data| {
      Cell::Json(
        data.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
      )
    });

    vec![
      Cell::Int(self.id),
      Cell::Text(format_timestamp(self.timestamp)),
      Cell::Text(self.data_source.clone()),
      Cell::Int(self.total_records),
      Cell::Int(self.missing_values),
      Cell::Int(self.unique_years),
      Cell::Int(self.records_in_fs),
      Cell::Int(self.unique_surnames),
      additional,
    ]
  }
}

impl TableRow for YearlyComparisonRecord {
  const COLUMNS: &'static [&'static str] = &[
    "id",
    "timestamp",
    "data_source",
    "year",
    "total_records",
    "records_with_condition",
    "condition_name",
  ];

  fn cells(&self) -> Vec<Cell> {
    vec![
      Cell::Int(self.id),
      Cell::Text(format_timestamp(self.timestamp)),
      Cell::Text(self.data_source.clone()),
      Cell::Int(i64::from(self.year)),
      Cell::Int(self.total_records),
      Cell::Int(self.records_with_condition),
      Cell::Text(self.condition_name.clone()),
    ]
  }
}

impl TableRow for ValueCountRecord {
  const COLUMNS: &'static [&'static str] =
    &["id", "timestamp", "data_source", "column_name", "value", "count"];

  fn cells(&self) -> Vec<Cell> {
    vec![
      Cell::Int(self.id),
      Cell::Text(format_timestamp(self.timestamp)),
      Cell::Text(self.data_source.clone()),
      Cell::Text(self.column_name.clone()),
      Cell::Text(self.value.clone()),
      Cell::Int(self.count),
    ]
  }
}
