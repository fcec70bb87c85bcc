//! The `StatsStore` trait.
//!
//! Implemented by storage backends (e.g. `ancestry-store-sqlite`). The CLI and
//! any reporting layer depend on this abstraction rather than on a concrete
//! backend.

use std::future::Future;

use crate::{
  filter::{SummaryQuery, ValueCountQuery, YearlyQuery},
  history::History,
  input::{RunIds, RunStatistics, SummaryStats, ValueCount, YearlyCount},
  record::{
    AdditionalData, SummaryRecord, ValueCountRecord, YearlyComparisonRecord,
  },
  table::Table,
};

/// Durable, queryable history of computed statistics.
///
/// Writes are append-only. Each write call stamps every row it inserts with
/// one shared timestamp and commits atomically, which is what lets history
/// views regroup rows into runs.
pub trait StatsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Create tables and the schema-version row if absent. Idempotent.
  fn initialize(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The stored schema version, or `0` if the store is uninitialised.
  fn schema_version(&self) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Append one summary row and return its id.
  fn store_summary<'a>(
    &'a self,
    stats: SummaryStats,
    data_source: &'a str,
    additional_data: Option<AdditionalData>,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// Append one row per year, returning ids in input order.
  fn store_yearly_comparison<'a>(
    &'a self,
    rows: Vec<YearlyCount>,
    data_source: &'a str,
    condition_name: &'a str,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + 'a;

  /// Append one row per distinct value, returning ids in input order.
  fn store_value_counts<'a>(
    &'a self,
    counts: Vec<ValueCount>,
    column_name: &'a str,
    data_source: &'a str,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + 'a;

  /// Write every table of a run under a single timestamp and transaction.
  fn record_run(
    &self,
    run: RunStatistics,
  ) -> impl Future<Output = Result<RunIds, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Matching summaries, most recent run first.
  fn query_summary<'a>(
    &'a self,
    query: &'a SummaryQuery,
  ) -> impl Future<Output = Result<Vec<SummaryRecord>, Self::Error>> + Send + 'a;

  /// Matching yearly rows ordered by run (newest first), then year.
  fn query_yearly_comparison<'a>(
    &'a self,
    query: &'a YearlyQuery,
  ) -> impl Future<Output = Result<Vec<YearlyComparisonRecord>, Self::Error>>
  + Send
  + 'a;

  /// Matching value counts ordered by run (newest first), then count
  /// descending.
  fn query_value_counts<'a>(
    &'a self,
    query: &'a ValueCountQuery,
  ) -> impl Future<Output = Result<Vec<ValueCountRecord>, Self::Error>> + Send + 'a;

  // ── History views ─────────────────────────────────────────────────────

  /// The `limit` most recent summary runs; `None` uses the store default.
  fn summary_history<'a>(
    &'a self,
    query: &'a SummaryQuery,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<History<SummaryRecord>, Self::Error>> + Send + 'a;

  fn yearly_comparison_history<'a>(
    &'a self,
    query: &'a YearlyQuery,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<History<YearlyComparisonRecord>, Self::Error>>
  + Send
  + 'a;

  fn value_counts_history<'a>(
    &'a self,
    query: &'a ValueCountQuery,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<History<ValueCountRecord>, Self::Error>>
  + Send
  + 'a;

  // ── Tabular exports ───────────────────────────────────────────────────

  fn export_summary<'a>(
    &'a self,
    query: &'a SummaryQuery,
  ) -> impl Future<Output = Result<Table, Self::Error>> + Send + 'a;

  fn export_yearly_comparison<'a>(
    &'a self,
    query: &'a YearlyQuery,
  ) -> impl Future<Output = Result<Table, Self::Error>> + Send + 'a;

  fn export_value_counts<'a>(
    &'a self,
    query: &'a ValueCountQuery,
  ) -> impl Future<Output = Result<Table, Self::Error>> + Send + 'a;

  // ── Catalogue ─────────────────────────────────────────────────────────

  /// Every data-source label with at least one stored row, sorted.
  fn data_sources(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
