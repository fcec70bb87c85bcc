//! Statistics writer.
//!
//! Each public call assigns one run timestamp to every row it inserts and
//! commits them in a single transaction, so a batch is either fully visible
//! or not at all.

use std::{collections::BTreeMap, sync::Arc};

use ancestry_core::{
  input::{
    RunIds, RunStatistics, SummaryStats, ValueCount, YearlyCount,
    normalize_label,
  },
  record::{AdditionalData, ensure_fixed_width},
};
use chrono::{DateTime, SubsecRound as _, Utc};
use tracing::info;

use crate::{
  Error, Result, SqliteStore,
  connection::with_connection,
  encode::{encode_additional, encode_dt},
};

// ─── Statements ──────────────────────────────────────────────────────────────

fn insert_summary(
  conn:        &rusqlite::Connection,
  ts:          &str,
  data_source: &str,
  stats:       &SummaryStats,
  additional:  Option<&str>,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO summary_statistics (
       timestamp, data_source, total_records, missing_values,
       unique_years, records_in_fs, unique_surnames, additional_data
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      ts,
      data_source,
      stats.total_records,
      stats.missing_values,
      stats.unique_years,
      stats.records_in_fs,
      stats.unique_surnames,
      additional,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn insert_yearly(
  conn:        &rusqlite::Connection,
  ts:          &str,
  data_source: &str,
  condition:   &str,
  rows:        &[YearlyCount],
) -> rusqlite::Result<Vec<i64>> {
  let mut stmt = conn.prepare_cached(
    "INSERT INTO yearly_comparison (
       timestamp, data_source, year, total_records,
       records_with_condition, condition_name
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;
  rows
    .iter()
    .map(|r| {
      stmt.insert(rusqlite::params![
        ts,
        data_source,
        r.year,
        r.total_records,
        r.records_with_condition,
        condition,
      ])
    })
    .collect()
}

fn insert_value_counts(
  conn:        &rusqlite::Connection,
  ts:          &str,
  data_source: &str,
  column_name: &str,
  counts:      &[ValueCount],
) -> rusqlite::Result<Vec<i64>> {
  let mut stmt = conn.prepare_cached(
    "INSERT INTO value_counts (timestamp, data_source, column_name, value, count)
     VALUES (?1, ?2, ?3, ?4, ?5)",
  )?;
  counts
    .iter()
    .map(|c| {
      stmt.insert(rusqlite::params![ts, data_source, column_name, c.value, c.count])
    })
    .collect()
}

/// Stored run timestamps carry microsecond precision and a four-digit year.
fn run_stamp(timestamp: DateTime<Utc>) -> Result<String> {
  Ok(encode_dt(ensure_fixed_width(timestamp.trunc_subsecs(6))?))
}

/// Empty maps are stored as NULL.
fn encode_optional(data: Option<&AdditionalData>) -> Result<Option<String>> {
  data.filter(|d| !d.is_empty()).map(encode_additional).transpose()
}

// ─── Writer ──────────────────────────────────────────────────────────────────

impl SqliteStore {
  /// [`store_summary`](ancestry_core::store::StatsStore::store_summary) with
  /// an explicit run timestamp.
  pub async fn store_summary_at(
    &self,
    timestamp:       DateTime<Utc>,
    stats:           SummaryStats,
    data_source:     &str,
    additional_data: Option<AdditionalData>,
  ) -> Result<i64> {
    let source = normalize_label("data_source", data_source)?;
    let additional = encode_optional(additional_data.as_ref())?;
    let ts = run_stamp(timestamp)?;

    let id = with_connection(self.config(), move |conn| {
      let tx = conn.transaction()?;
      let id = insert_summary(&tx, &ts, &source, &stats, additional.as_deref())?;
      tx.commit()?;
      Ok(id)
    })
    .await
    .map_err(|e| e.classify(|m| Error::query("storing summary statistics", m)))?;

    info!(data_source, id, "stored summary statistics");
    Ok(id)
  }

  /// [`store_yearly_comparison`](ancestry_core::store::StatsStore::store_yearly_comparison)
  /// with an explicit run timestamp.
  pub async fn store_yearly_comparison_at(
    &self,
    timestamp:      DateTime<Utc>,
    rows:           Vec<YearlyCount>,
    data_source:    &str,
    condition_name: &str,
  ) -> Result<Vec<i64>> {
    let source = normalize_label("data_source", data_source)?;
    let condition = normalize_label("condition_name", condition_name)?;
    let ts = run_stamp(timestamp)?;
    let rows = Arc::new(rows);

    let ids = with_connection(self.config(), move |conn| {
      let tx = conn.transaction()?;
      let ids = insert_yearly(&tx, &ts, &source, &condition, &rows)?;
      tx.commit()?;
      Ok(ids)
    })
    .await
    .map_err(|e| e.classify(|m| Error::query("storing yearly comparison", m)))?;

    info!(data_source, condition_name, rows = ids.len(), "stored yearly comparison");
    Ok(ids)
  }

  /// [`store_value_counts`](ancestry_core::store::StatsStore::store_value_counts)
  /// with an explicit run timestamp.
  pub async fn store_value_counts_at(
    &self,
    timestamp:   DateTime<Utc>,
    counts:      Vec<ValueCount>,
    column_name: &str,
    data_source: &str,
  ) -> Result<Vec<i64>> {
    let source = normalize_label("data_source", data_source)?;
    let column = normalize_label("column_name", column_name)?;
    let ts = run_stamp(timestamp)?;
    let counts = Arc::new(counts);

    let ids = with_connection(self.config(), move |conn| {
      let tx = conn.transaction()?;
      let ids = insert_value_counts(&tx, &ts, &source, &column, &counts)?;
      tx.commit()?;
      Ok(ids)
    })
    .await
    .map_err(|e| e.classify(|m| Error::query("storing value counts", m)))?;

    info!(data_source, column_name, rows = ids.len(), "stored value counts");
    Ok(ids)
  }

  /// [`record_run`](ancestry_core::store::StatsStore::record_run) with an
  /// explicit run timestamp.
  pub async fn record_run_at(
    &self,
    timestamp: DateTime<Utc>,
    run:       RunStatistics,
  ) -> Result<RunIds> {
    let source = normalize_label("data_source", &run.data_source)?;
    let condition = normalize_label("condition_name", &run.condition_name)?;
    let additional = encode_optional(run.additional_data.as_ref())?;
    let ts = run_stamp(timestamp)?;

    let mut columns: Vec<(String, Vec<ValueCount>)> =
      Vec::with_capacity(run.value_counts.len());
    for (column, counts) in run.value_counts {
      let column = normalize_label("column_name", &column)?;
      if columns.iter().any(|(c, _)| *c == column) {
        return Err(
          ancestry_core::Error::InvalidFilter(format!(
            "duplicate value-count column {column:?}"
          ))
          .into(),
        );
      }
      columns.push((column, counts));
    }

    let summary = run.summary;
    let yearly = Arc::new(run.yearly);
    let columns = Arc::new(columns);
    let log_source = source.clone();

    let ids = with_connection(self.config(), move |conn| {
      let tx = conn.transaction()?;

      let summary_id =
        insert_summary(&tx, &ts, &source, &summary, additional.as_deref())?;
      let yearly_ids = insert_yearly(&tx, &ts, &source, &condition, &yearly)?;

      let mut value_count_ids = BTreeMap::new();
      for (column, counts) in columns.iter() {
        let ids = insert_value_counts(&tx, &ts, &source, column, counts)?;
        value_count_ids.insert(column.clone(), ids);
      }

      tx.commit()?;
      Ok(RunIds { summary_id, yearly_ids, value_count_ids })
    })
    .await
    .map_err(|e| e.classify(|m| Error::query("recording statistics run", m)))?;

    info!(
      data_source = %log_source,
      summary_id = ids.summary_id,
      yearly_rows = ids.yearly_ids.len(),
      value_columns = ids.value_count_ids.len(),
      "recorded statistics run"
    );
    Ok(ids)
  }
}
