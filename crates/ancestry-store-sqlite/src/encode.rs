//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 strings in UTC with microsecond
//! precision, so SQL comparisons and `ORDER BY` on the text column are
//! chronological. Additional data is stored as compact JSON.

use ancestry_core::record::{
  AdditionalData, SummaryRecord, ValueCountRecord, YearlyComparisonRecord,
  format_timestamp,
};
use chrono::{DateTime, Utc};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { format_timestamp(dt) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::query("decoding timestamp", format!("{s:?}: {e}")))
}

// ─── Additional data ─────────────────────────────────────────────────────────

pub fn encode_additional(data: &AdditionalData) -> Result<String> {
  serde_json::to_string(data).map_err(|e| Error::query("encoding additional data", e))
}

pub fn decode_additional(s: &str) -> Result<AdditionalData> {
  serde_json::from_str(s).map_err(|e| Error::query("decoding additional data", e))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected for every summary read, in [`RawSummary`] order.
pub const SUMMARY_COLUMNS: &str = "id, timestamp, data_source, total_records, \
  missing_values, unique_years, records_in_fs, unique_surnames, additional_data";

pub const YEARLY_COLUMNS: &str = "id, timestamp, data_source, year, \
  total_records, records_with_condition, condition_name";

pub const VALUE_COUNT_COLUMNS: &str =
  "id, timestamp, data_source, column_name, value, count";

/// Raw values read from a `summary_statistics` row.
#[derive(Debug, Clone)]
pub struct RawSummary {
  pub id:              i64,
  pub timestamp:       String,
  pub data_source:     String,
  pub total_records:   i64,
  pub missing_values:  i64,
  pub unique_years:    i64,
  pub records_in_fs:   i64,
  pub unique_surnames: i64,
  pub additional_data: Option<String>,
}

impl RawSummary {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get("id")?,
      timestamp:       row.get("timestamp")?,
      data_source:     row.get("data_source")?,
      total_records:   row.get("total_records")?,
      missing_values:  row.get("missing_values")?,
      unique_years:    row.get("unique_years")?,
      records_in_fs:   row.get("records_in_fs")?,
      unique_surnames: row.get("unique_surnames")?,
      additional_data: row.get("additional_data")?,
    })
  }

  pub fn into_record(self) -> Result<SummaryRecord> {
    Ok(SummaryRecord {
      id:              self.id,
      timestamp:       decode_dt(&self.timestamp)?,
      data_source:     self.data_source,
      total_records:   self.total_records,
      missing_values:  self.missing_values,
      unique_years:    self.unique_years,
      records_in_fs:   self.records_in_fs,
      unique_surnames: self.unique_surnames,
      additional_data: self
        .additional_data
        .as_deref()
        .map(decode_additional)
        .transpose()?,
    })
  }
}

/// Raw values read from a `yearly_comparison` row.
#[derive(Debug, Clone)]
pub struct RawYearly {
  pub id:                     i64,
  pub timestamp:              String,
  pub data_source:            String,
  pub year:                   i32,
  pub total_records:          i64,
  pub records_with_condition: i64,
  pub condition_name:         String,
}

impl RawYearly {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                     row.get("id")?,
      timestamp:              row.get("timestamp")?,
      data_source:            row.get("data_source")?,
      year:                   row.get("year")?,
      total_records:          row.get("total_records")?,
      records_with_condition: row.get("records_with_condition")?,
      condition_name:         row.get("condition_name")?,
    })
  }

  pub fn into_record(self) -> Result<YearlyComparisonRecord> {
    Ok(YearlyComparisonRecord {
      id:                     self.id,
      timestamp:              decode_dt(&self.timestamp)?,
      data_source:            self.data_source,
      year:                   self.year,
      total_records:          self.total_records,
      records_with_condition: self.records_with_condition,
      condition_name:         self.condition_name,
    })
  }
}

/// Raw values read from a `value_counts` row.
#[derive(Debug, Clone)]
pub struct RawValueCount {
  pub id:          i64,
  pub timestamp:   String,
  pub data_source: String,
  pub column_name: String,
  pub value:       String,
  pub count:       i64,
}

impl RawValueCount {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get("id")?,
      timestamp:   row.get("timestamp")?,
      data_source: row.get("data_source")?,
      column_name: row.get("column_name")?,
      value:       row.get("value")?,
      count:       row.get("count")?,
    })
  }

  pub fn into_record(self) -> Result<ValueCountRecord> {
    Ok(ValueCountRecord {
      id:          self.id,
      timestamp:   decode_dt(&self.timestamp)?,
      data_source: self.data_source,
      column_name: self.column_name,
      value:       self.value,
      count:       self.count,
    })
  }
}
