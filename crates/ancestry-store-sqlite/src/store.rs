//! [`SqliteStore`], the SQLite implementation of [`StatsStore`].

use std::path::Path;

use ancestry_core::{
  filter::{SummaryQuery, ValueCountQuery, YearlyQuery},
  history::History,
  input::{RunIds, RunStatistics, SummaryStats, ValueCount, YearlyCount},
  record::{
    AdditionalData, SummaryRecord, ValueCountRecord, YearlyComparisonRecord,
  },
  store::StatsStore,
  table::Table,
};
use chrono::Utc;
use tracing::info;

use crate::{
  Error, Result, StoreConfig,
  connection::with_connection,
  encode::{
    RawSummary, RawValueCount, RawYearly, SUMMARY_COLUMNS, VALUE_COUNT_COLUMNS,
    YEARLY_COLUMNS,
  },
  query::{
    TableSpec, summary_predicates, value_count_predicates, yearly_predicates,
  },
  schema::{TABLE_SUMMARY, TABLE_VALUE_COUNTS, TABLE_YEARLY, create_schema, read_version},
};

// ─── Table specs ─────────────────────────────────────────────────────────────

fn summary_spec(context: &'static str) -> TableSpec<RawSummary> {
  TableSpec {
    name: TABLE_SUMMARY,
    columns: SUMMARY_COLUMNS,
    order: "data_source ASC, id ASC",
    context,
    from_row: RawSummary::from_row,
  }
}

fn yearly_spec(context: &'static str) -> TableSpec<RawYearly> {
  TableSpec {
    name: TABLE_YEARLY,
    columns: YEARLY_COLUMNS,
    order: "year ASC, id ASC",
    context,
    from_row: RawYearly::from_row,
  }
}

fn value_count_spec(context: &'static str) -> TableSpec<RawValueCount> {
  TableSpec {
    name: TABLE_VALUE_COUNTS,
    columns: VALUE_COUNT_COLUMNS,
    order: "count DESC, id ASC",
    context,
    from_row: RawValueCount::from_row,
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A statistics history store backed by a single SQLite file.
///
/// The handle only holds configuration; every operation opens and closes its
/// own connection. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  config: StoreConfig,
}

impl SqliteStore {
  /// Create a handle without touching the filesystem.
  pub fn new(config: StoreConfig) -> Self { Self { config } }

  /// Create a handle and make sure the schema exists.
  pub async fn open(config: StoreConfig) -> Result<Self> {
    let store = Self::new(config);
    store.initialize().await?;
    Ok(store)
  }

  pub fn config(&self) -> &StoreConfig { &self.config }

  pub fn path(&self) -> &Path { &self.config.path }
}

// ─── StatsStore impl ─────────────────────────────────────────────────────────

impl StatsStore for SqliteStore {
  type Error = Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn initialize(&self) -> Result<()> {
    with_connection(&self.config, create_schema)
      .await
      .map_err(|e| e.classify(Error::Schema))?;
    info!(path = %self.config.path.display(), "database schema ready");
    Ok(())
  }

  async fn schema_version(&self) -> Result<i64> {
    with_connection(&self.config, |conn| read_version(conn))
      .await
      .map_err(|e| e.classify(|m| Error::query("getting schema version", m)))
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn store_summary(
    &self,
    stats: SummaryStats,
    data_source: &str,
    additional_data: Option<AdditionalData>,
  ) -> Result<i64> {
    self
      .store_summary_at(Utc::now(), stats, data_source, additional_data)
      .await
  }

  async fn store_yearly_comparison(
    &self,
    rows: Vec<YearlyCount>,
    data_source: &str,
    condition_name: &str,
  ) -> Result<Vec<i64>> {
    self
      .store_yearly_comparison_at(Utc::now(), rows, data_source, condition_name)
      .await
  }

  async fn store_value_counts(
    &self,
    counts: Vec<ValueCount>,
    column_name: &str,
    data_source: &str,
  ) -> Result<Vec<i64>> {
    self
      .store_value_counts_at(Utc::now(), counts, column_name, data_source)
      .await
  }

  async fn record_run(&self, run: RunStatistics) -> Result<RunIds> {
    self.record_run_at(Utc::now(), run).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn query_summary(&self, query: &SummaryQuery) -> Result<Vec<SummaryRecord>> {
    let preds = summary_predicates(query)?;
    let raws = self
      .select(summary_spec("querying summary statistics"), preds)
      .await?;
    raws.into_iter().map(RawSummary::into_record).collect()
  }

  async fn query_yearly_comparison(
    &self,
    query: &YearlyQuery,
  ) -> Result<Vec<YearlyComparisonRecord>> {
    let preds = yearly_predicates(query)?;
    let raws = self
      .select(yearly_spec("querying yearly comparison data"), preds)
      .await?;
    raws.into_iter().map(RawYearly::into_record).collect()
  }

  async fn query_value_counts(
    &self,
    query: &ValueCountQuery,
  ) -> Result<Vec<ValueCountRecord>> {
    let preds = value_count_predicates(query)?;
    let raws = self
      .select(value_count_spec("querying value counts"), preds)
      .await?;
    raws.into_iter().map(RawValueCount::into_record).collect()
  }

  // ── History views ─────────────────────────────────────────────────────────

  async fn summary_history(
    &self,
    query: &SummaryQuery,
    limit: Option<usize>,
  ) -> Result<History<SummaryRecord>> {
    let preds = summary_predicates(query)?;
    self
      .select_history(
        summary_spec("retrieving summary statistics history"),
        preds,
        limit,
        RawSummary::into_record,
      )
      .await
  }

  async fn yearly_comparison_history(
    &self,
    query: &YearlyQuery,
    limit: Option<usize>,
  ) -> Result<History<YearlyComparisonRecord>> {
    let preds = yearly_predicates(query)?;
    self
      .select_history(
        yearly_spec("retrieving yearly comparison history"),
        preds,
        limit,
        RawYearly::into_record,
      )
      .await
  }

  async fn value_counts_history(
    &self,
    query: &ValueCountQuery,
    limit: Option<usize>,
  ) -> Result<History<ValueCountRecord>> {
    let preds = value_count_predicates(query)?;
    self
      .select_history(
        value_count_spec("retrieving value counts history"),
        preds,
        limit,
        RawValueCount::into_record,
      )
      .await
  }

  // ── Tabular exports ───────────────────────────────────────────────────────

  async fn export_summary(&self, query: &SummaryQuery) -> Result<Table> {
    Ok(Table::from_rows(self.query_summary(query).await?))
  }

  async fn export_yearly_comparison(&self, query: &YearlyQuery) -> Result<Table> {
    Ok(Table::from_rows(self.query_yearly_comparison(query).await?))
  }

  async fn export_value_counts(&self, query: &ValueCountQuery) -> Result<Table> {
    Ok(Table::from_rows(self.query_value_counts(query).await?))
  }

  // ── Catalogue ─────────────────────────────────────────────────────────────

  async fn data_sources(&self) -> Result<Vec<String>> {
    self.select_data_sources().await
  }
}
