//! Producer-side inputs: the already-computed statistics handed to a store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, record::AdditionalData};

// ─── Keys ────────────────────────────────────────────────────────────────────

pub const STAT_TOTAL_RECORDS: &str = "total_records";
pub const STAT_MISSING_VALUES: &str = "missing_values";
pub const STAT_UNIQUE_YEARS: &str = "unique_years";
pub const STAT_RECORDS_IN_FS: &str = "records_in_fs";
pub const STAT_UNIQUE_SURNAMES: &str = "unique_surnames";

/// Condition label used when the producer does not name one.
pub const DEFAULT_CONDITION: &str = "in_fs";

// ─── Summary ─────────────────────────────────────────────────────────────────

/// The five headline numbers computed for one dataset.
///
/// Every field defaults to zero, both in [`Default`] and when absent from a
/// deserialised document.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(default)]
pub struct SummaryStats {
  pub total_records:   i64,
  pub missing_values:  i64,
  pub unique_years:    i64,
  pub records_in_fs:   i64,
  pub unique_surnames: i64,
}

impl SummaryStats {
  /// Build from a string-keyed map. Missing keys stay zero and unrecognised
  /// keys are ignored.
  pub fn from_map<K, I>(entries: I) -> Self
  where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, i64)>,
  {
    let mut stats = Self::default();
    for (key, value) in entries {
      match key.as_ref() {
        STAT_TOTAL_RECORDS => stats.total_records = value,
        STAT_MISSING_VALUES => stats.missing_values = value,
        STAT_UNIQUE_YEARS => stats.unique_years = value,
        STAT_RECORDS_IN_FS => stats.records_in_fs = value,
        STAT_UNIQUE_SURNAMES => stats.unique_surnames = value,
        _ => {}
      }
    }
    stats
  }
}

// ─── Yearly comparison ───────────────────────────────────────────────────────

/// Per-year totals split by a boolean condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyCount {
  pub year:                   i32,
  pub total_records:          i64,
  pub records_with_condition: i64,
}

impl YearlyCount {
  pub fn new(year: i32, total_records: i64, records_with_condition: i64) -> Self {
    Self { year, total_records, records_with_condition }
  }
}

// ─── Value counts ────────────────────────────────────────────────────────────

/// Occurrences of one distinct value in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
  pub value: String,
  pub count: i64,
}

impl<V: ToString> From<(V, i64)> for ValueCount {
  fn from((value, count): (V, i64)) -> Self {
    Self { value: value.to_string(), count }
  }
}

// ─── Whole run ───────────────────────────────────────────────────────────────

/// Everything computed for one data source in a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
  pub data_source:     String,
  #[serde(default)]
  pub summary:         SummaryStats,
  #[serde(default)]
  pub additional_data: Option<AdditionalData>,
  /// Empty when the dataset has no year or condition column.
  #[serde(default)]
  pub yearly:          Vec<YearlyCount>,
  #[serde(default = "default_condition")]
  pub condition_name:  String,
  /// Counts keyed by column name, e.g. `normalized_surname`.
  #[serde(default)]
  pub value_counts:    BTreeMap<String, Vec<ValueCount>>,
}

fn default_condition() -> String { DEFAULT_CONDITION.to_owned() }

impl RunStatistics {
  pub fn new(data_source: impl Into<String>, summary: SummaryStats) -> Self {
    Self {
      data_source: data_source.into(),
      summary,
      additional_data: None,
      yearly: Vec::new(),
      condition_name: default_condition(),
      value_counts: BTreeMap::new(),
    }
  }
}

/// Row ids produced by recording a [`RunStatistics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIds {
  pub summary_id:      i64,
  pub yearly_ids:      Vec<i64>,
  pub value_count_ids: BTreeMap<String, Vec<i64>>,
}

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Trim a free-text label (data source, column, condition) and reject it if
/// nothing is left.
pub fn normalize_label(field: &str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::InvalidFilter(format!("{field} cannot be empty")));
  }
  Ok(trimmed.to_owned())
}
