//! Integration tests for `SqliteStore` against a temporary database file.

use std::collections::BTreeMap;

use ancestry_core::{
  filter::{SummaryQuery, ValueCountQuery, YearlyQuery},
  input::{RunStatistics, SummaryStats, ValueCount, YearlyCount},
  record::{AdditionalData, Scalar, SummaryRecord},
  store::StatsStore,
  table::TableRow,
};
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use crate::{ErrorKind, SCHEMA_VERSION, SqliteStore, StoreConfig};

async fn store() -> (TempDir, SqliteStore) {
  let dir = tempfile::tempdir().expect("temp dir");
  let config = StoreConfig::new(dir.path().join("stats.db"));
  let store = SqliteStore::open(config).await.expect("open store");
  (dir, store)
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn stats(total: i64) -> SummaryStats {
  SummaryStats { total_records: total, ..Default::default() }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_is_idempotent() {
  let (_dir, s) = store().await;
  s.initialize().await.unwrap();
  s.initialize().await.unwrap();
  assert_eq!(s.schema_version().await.unwrap(), SCHEMA_VERSION);
}

#[tokio::test]
async fn schema_version_is_zero_before_initialize() {
  let dir = tempfile::tempdir().unwrap();
  let s = SqliteStore::new(StoreConfig::new(dir.path().join("fresh.db")));
  assert_eq!(s.schema_version().await.unwrap(), 0);
}

#[tokio::test]
async fn initialize_creates_parent_directories() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("deeper").join("stats.db");
  SqliteStore::open(StoreConfig::new(&path)).await.unwrap();
  assert!(path.exists());
}

#[tokio::test]
async fn query_before_initialize_is_a_query_error() {
  let dir = tempfile::tempdir().unwrap();
  let s = SqliteStore::new(StoreConfig::new(dir.path().join("bare.db")));
  let err = s.query_summary(&SummaryQuery::default()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Query);
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_round_trip_defaults_missing_keys() {
  let (_dir, s) = store().await;
  let input = SummaryStats::from_map([("total_records", 100), ("unique_years", 12)]);

  let mut extra = AdditionalData::new();
  extra.insert("note".into(), Scalar::from("first load"));
  extra.insert("ratio".into(), Scalar::from(0.25));

  let id = s.store_summary(input, "births", Some(extra.clone())).await.unwrap();

  let rows = s.query_summary(&SummaryQuery::for_source("births")).await.unwrap();
  assert_eq!(rows.len(), 1);
  let row = &rows[0];
  assert_eq!(row.id, id);
  assert_eq!(row.total_records, 100);
  assert_eq!(row.unique_years, 12);
  assert_eq!(row.missing_values, 0);
  assert_eq!(row.records_in_fs, 0);
  assert_eq!(row.unique_surnames, 0);
  assert_eq!(row.additional_data.as_ref(), Some(&extra));
}

#[tokio::test]
async fn empty_additional_data_is_stored_as_null() {
  let (_dir, s) = store().await;
  s.store_summary(stats(1), "births", Some(AdditionalData::new()))
    .await
    .unwrap();
  let rows = s.query_summary(&SummaryQuery::default()).await.unwrap();
  assert_eq!(rows[0].additional_data, None);
}

#[tokio::test]
async fn data_source_label_is_trimmed() {
  let (_dir, s) = store().await;
  s.store_summary(stats(1), "  births ", None).await.unwrap();
  let rows = s.query_summary(&SummaryQuery::for_source("births")).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].data_source, "births");
}

#[tokio::test]
async fn empty_data_source_is_rejected() {
  let (_dir, s) = store().await;
  let err = s.store_summary(stats(1), "   ", None).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidFilter);
  assert!(s.query_summary(&SummaryQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn summaries_newest_first() {
  let (_dir, s) = store().await;
  s.store_summary_at(at(2020, 1, 1, 9), stats(1), "births", None).await.unwrap();
  s.store_summary_at(at(2020, 3, 1, 9), stats(3), "births", None).await.unwrap();
  s.store_summary_at(at(2020, 2, 1, 9), stats(2), "births", None).await.unwrap();

  let totals: Vec<i64> = s
    .query_summary(&SummaryQuery::default())
    .await
    .unwrap()
    .iter()
    .map(|r| r.total_records)
    .collect();
  assert_eq!(totals, vec![3, 2, 1]);
}

// ─── Date filters ────────────────────────────────────────────────────────────

#[tokio::test]
async fn end_date_includes_the_whole_day() {
  let (_dir, s) = store().await;
  s.store_summary_at(at(2020, 5, 1, 10), stats(1), "births", None).await.unwrap();
  s.store_summary_at(at(2020, 5, 1, 23), stats(2), "births", None).await.unwrap();
  s.store_summary_at(at(2020, 5, 2, 0), stats(3), "births", None).await.unwrap();

  let query = SummaryQuery {
    start_date: Some("2020-05-01".into()),
    end_date: Some("2020-05-01".into()),
    ..Default::default()
  };
  let rows = s.query_summary(&query).await.unwrap();
  let totals: Vec<i64> = rows.iter().map(|r| r.total_records).collect();
  assert_eq!(totals, vec![2, 1]);
}

#[tokio::test]
async fn malformed_date_fails_before_touching_disk() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("never").join("stats.db");
  let s = SqliteStore::new(StoreConfig::new(&path));

  let query = SummaryQuery {
    start_date: Some("2020-13-45".into()),
    ..Default::default()
  };
  let err = s.query_summary(&query).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidDate);
  assert!(!path.exists());
  assert!(!path.parent().unwrap().exists());
}

#[tokio::test]
async fn inverted_range_is_rejected() {
  let (_dir, s) = store().await;
  let query = YearlyQuery {
    start_date: Some("2021-01-02".into()),
    end_date: Some("2021-01-01".into()),
    ..Default::default()
  };
  let err = s.query_yearly_comparison(&query).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidFilter);
}

// ─── Yearly comparison ───────────────────────────────────────────────────────

#[tokio::test]
async fn yearly_rows_share_one_timestamp() {
  let (_dir, s) = store().await;
  let ids = s
    .store_yearly_comparison(
      vec![YearlyCount::new(1850, 10, 4), YearlyCount::new(1851, 20, 5)],
      "births",
      "in_fs",
    )
    .await
    .unwrap();
  assert_eq!(ids.len(), 2);

  let rows = s
    .query_yearly_comparison(&YearlyQuery::for_source("births"))
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].timestamp, rows[1].timestamp);
  assert_eq!(rows[0].year, 1850);
  assert_eq!(rows[1].year, 1851);
}

#[tokio::test]
async fn duplicate_year_rolls_back_the_batch() {
  let (_dir, s) = store().await;
  let err = s
    .store_yearly_comparison(
      vec![YearlyCount::new(1850, 10, 4), YearlyCount::new(1850, 11, 5)],
      "births",
      "in_fs",
    )
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Query);

  let rows = s.query_yearly_comparison(&YearlyQuery::default()).await.unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn yearly_filters_compose() {
  let (_dir, s) = store().await;
  s.store_yearly_comparison(
    vec![YearlyCount::new(1850, 10, 4), YearlyCount::new(1851, 20, 5)],
    "births",
    "in_fs",
  )
  .await
  .unwrap();
  s.store_yearly_comparison(vec![YearlyCount::new(1850, 7, 1)], "births", "linked")
    .await
    .unwrap();

  let query = YearlyQuery {
    data_source: Some("births".into()),
    condition_name: Some("in_fs".into()),
    year: Some(1850),
    ..Default::default()
  };
  let rows = s.query_yearly_comparison(&query).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].total_records, 10);
  assert_eq!(rows[0].records_with_condition, 4);
}

// ─── Value counts ────────────────────────────────────────────────────────────

#[tokio::test]
async fn value_counts_ordered_by_count() {
  let (_dir, s) = store().await;
  let counts: Vec<ValueCount> =
    vec![("SMITH", 5).into(), ("JONES", 9).into(), ("BROWN", 1).into()];
  s.store_value_counts(counts, "normalized_surname", "births")
    .await
    .unwrap();

  let rows = s
    .query_value_counts(&ValueCountQuery::for_column("normalized_surname"))
    .await
    .unwrap();
  let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
  assert_eq!(values, vec!["JONES", "SMITH", "BROWN"]);
}

#[tokio::test]
async fn value_count_filters_are_anded() {
  let (_dir, s) = store().await;
  s.store_value_counts(
    vec![("SMITH", 5).into(), ("JONES", 9).into()],
    "normalized_surname",
    "births",
  )
  .await
  .unwrap();
  s.store_value_counts(vec![("SMITH", 2).into()], "normalized_surname", "deaths")
    .await
    .unwrap();
  s.store_value_counts(vec![("SMITH", 3).into()], "maiden_name", "births")
    .await
    .unwrap();

  let query = ValueCountQuery {
    column_name: Some("normalized_surname".into()),
    data_source: Some("births".into()),
    value: Some("SMITH".into()),
    ..Default::default()
  };
  let rows = s.query_value_counts(&query).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].count, 5);
  assert_eq!(rows[0].data_source, "births");
  assert_eq!(rows[0].column_name, "normalized_surname");
}

#[tokio::test]
async fn empty_value_count_batch_stores_nothing() {
  let (_dir, s) = store().await;
  let ids = s
    .store_value_counts(Vec::new(), "normalized_surname", "births")
    .await
    .unwrap();
  assert!(ids.is_empty());
  assert!(s.data_sources().await.unwrap().is_empty());
}

// ─── History views ───────────────────────────────────────────────────────────

#[tokio::test]
async fn history_groups_runs_newest_first() {
  let (_dir, s) = store().await;
  for (day, total) in [(1, 10), (2, 20), (3, 30)] {
    s.store_yearly_comparison_at(
      at(2021, 6, day, 12),
      vec![YearlyCount::new(1900, total, 1), YearlyCount::new(1901, total + 1, 2)],
      "births",
      "in_fs",
    )
    .await
    .unwrap();
  }

  let history = s
    .yearly_comparison_history(&YearlyQuery::for_source("births"), Some(2))
    .await
    .unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history.timestamps(), vec![at(2021, 6, 3, 12), at(2021, 6, 2, 12)]);

  let latest = history.get(at(2021, 6, 3, 12)).unwrap();
  assert_eq!(latest.len(), 2);
  assert!(latest.iter().all(|r| r.timestamp == at(2021, 6, 3, 12)));
  assert_eq!(latest[0].total_records, 30);

  assert!(history.get(at(2021, 6, 1, 12)).is_none());
}

#[tokio::test]
async fn history_uses_configured_default_limit() {
  let dir = tempfile::tempdir().unwrap();
  let config = StoreConfig::new(dir.path().join("stats.db")).with_history_limit(1);
  let s = SqliteStore::open(config).await.unwrap();
  s.store_summary_at(at(2022, 1, 1, 0), stats(1), "births", None).await.unwrap();
  s.store_summary_at(at(2022, 1, 2, 0), stats(2), "births", None).await.unwrap();

  let history = s.summary_history(&SummaryQuery::default(), None).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history.latest().unwrap().rows[0].total_records, 2);
}

#[tokio::test]
async fn value_count_history_filters_each_run() {
  let (_dir, s) = store().await;
  s.store_value_counts_at(
    at(2023, 2, 1, 8),
    vec![("SMITH", 1).into(), ("JONES", 2).into()],
    "normalized_surname",
    "births",
  )
  .await
  .unwrap();
  s.store_value_counts_at(
    at(2023, 2, 2, 8),
    vec![("SMITH", 4).into()],
    "normalized_surname",
    "births",
  )
  .await
  .unwrap();

  let query = ValueCountQuery {
    column_name: Some("normalized_surname".into()),
    value: Some("JONES".into()),
    ..Default::default()
  };
  let history = s.value_counts_history(&query, None).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history.latest().unwrap().timestamp, at(2023, 2, 1, 8));
}

#[tokio::test]
async fn history_flattens_to_table() {
  let (_dir, s) = store().await;
  s.store_summary_at(at(2022, 1, 1, 0), stats(1), "births", None).await.unwrap();
  s.store_summary_at(at(2022, 1, 2, 0), stats(2), "births", None).await.unwrap();

  let table = s
    .summary_history(&SummaryQuery::default(), None)
    .await
    .unwrap()
    .to_table();
  assert_eq!(table.len(), 2);
  let idx = table.column_index("total_records").unwrap();
  assert_eq!(table.rows()[0][idx].to_string(), "2");
}

// ─── Exports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_export_keeps_columns() {
  let (_dir, s) = store().await;
  let table = s
    .export_summary(&SummaryQuery::for_source("nothing"))
    .await
    .unwrap();
  assert!(table.is_empty());
  assert_eq!(table.columns(), SummaryRecord::COLUMNS);
}

#[tokio::test]
async fn export_matches_query() {
  let (_dir, s) = store().await;
  s.store_value_counts(
    vec![("SMITH", 5).into(), ("JONES", 9).into()],
    "normalized_surname",
    "births",
  )
  .await
  .unwrap();

  let query = ValueCountQuery::for_column("normalized_surname");
  let rows = s.query_value_counts(&query).await.unwrap();
  let table = s.export_value_counts(&query).await.unwrap();
  assert_eq!(table.len(), rows.len());
  let idx = table.column_index("value").unwrap();
  assert_eq!(table.rows()[0][idx].to_string(), "JONES");
}

// ─── Runs ────────────────────────────────────────────────────────────────────

fn sample_run() -> RunStatistics {
  let mut run = RunStatistics::new("births", stats(42));
  run.yearly = vec![YearlyCount::new(1850, 10, 4), YearlyCount::new(1851, 32, 9)];
  run.value_counts = BTreeMap::from([
    ("normalized_surname".to_owned(), vec![("SMITH", 5).into()]),
    ("given_name".to_owned(), vec![("MARY", 3).into(), ("JOHN", 2).into()]),
  ]);
  run
}

#[tokio::test]
async fn record_run_shares_one_timestamp() {
  let (_dir, s) = store().await;
  let ids = s.record_run(sample_run()).await.unwrap();
  assert_eq!(ids.yearly_ids.len(), 2);
  assert_eq!(ids.value_count_ids["given_name"].len(), 2);

  let summary = s.query_summary(&SummaryQuery::default()).await.unwrap();
  let yearly = s.query_yearly_comparison(&YearlyQuery::default()).await.unwrap();
  let values = s.query_value_counts(&ValueCountQuery::default()).await.unwrap();

  assert_eq!(summary.len(), 1);
  assert_eq!(summary[0].id, ids.summary_id);
  assert_eq!(yearly.len(), 2);
  assert_eq!(values.len(), 3);
  let ts = summary[0].timestamp;
  assert!(yearly.iter().all(|r| r.timestamp == ts));
  assert!(values.iter().all(|r| r.timestamp == ts));
  assert!(yearly.iter().all(|r| r.condition_name == "in_fs"));
}

#[tokio::test]
async fn record_run_rejects_duplicate_columns() {
  let (_dir, s) = store().await;
  let mut run = sample_run();
  run
    .value_counts
    .insert(" normalized_surname ".to_owned(), vec![("JONES", 1).into()]);

  let err = s.record_run(run).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidFilter);
  assert!(s.query_summary(&SummaryQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn record_run_is_atomic() {
  let (_dir, s) = store().await;
  let mut run = sample_run();
  run.yearly.push(YearlyCount::new(1850, 1, 1));

  let err = s.record_run(run).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Query);
  assert!(s.query_summary(&SummaryQuery::default()).await.unwrap().is_empty());
  assert!(s.query_value_counts(&ValueCountQuery::default()).await.unwrap().is_empty());
}

// ─── Catalogue ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn data_sources_span_all_tables() {
  let (_dir, s) = store().await;
  s.store_summary(stats(1), "births", None).await.unwrap();
  s.store_yearly_comparison(vec![YearlyCount::new(1900, 1, 0)], "census", "in_fs")
    .await
    .unwrap();
  s.store_value_counts(vec![("X", 1).into()], "col", "deaths")
    .await
    .unwrap();
  s.store_summary(stats(2), "births", None).await.unwrap();

  assert_eq!(s.data_sources().await.unwrap(), vec!["births", "census", "deaths"]);
}

// ─── Failure classification ──────────────────────────────────────────────────

#[tokio::test]
async fn non_database_file_is_a_schema_error_on_init() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("junk.db");
  std::fs::write(&path, vec![b'x'; 4096]).unwrap();
  let s = SqliteStore::new(StoreConfig::new(&path));

  let err = s.initialize().await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Schema);
  let message = err.to_string();
  assert!(message.contains("not a database"), "{message}");
  assert!(!message.contains("Rusqlite("), "{message}");

  let err = s.schema_version().await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Query);

  let err = s.store_summary(stats(1), "births", None).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Query);
}

#[tokio::test]
async fn unusable_directory_is_a_connection_error() {
  let dir = tempfile::tempdir().unwrap();
  let blocker = dir.path().join("not-a-dir");
  std::fs::write(&blocker, b"plain file").unwrap();
  let s = SqliteStore::new(StoreConfig::new(blocker.join("stats.db")));

  let err = s.initialize().await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Connection);
  let err = s.query_summary(&SummaryQuery::default()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Connection);
}

#[tokio::test]
async fn run_timestamps_need_four_digit_years() {
  let (_dir, s) = store().await;
  let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
  let err = s.store_summary_at(far, stats(1), "births", None).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidFilter);
  assert!(s.query_summary(&SummaryQuery::default()).await.unwrap().is_empty());
}

// ─── Busy handling ───────────────────────────────────────────────────────────

fn lock_exclusively(path: &std::path::Path) -> rusqlite::Connection {
  let locker = rusqlite::Connection::open(path).unwrap();
  locker.execute_batch("BEGIN EXCLUSIVE;").unwrap();
  locker
}

#[tokio::test]
async fn busy_without_retries_is_a_query_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("stats.db");
  let config = StoreConfig::new(&path)
    .with_busy_retries(0, 1)
    .with_busy_timeout(10);
  let s = SqliteStore::open(config).await.unwrap();

  let locker = lock_exclusively(&path);
  let err = s.store_summary(stats(1), "births", None).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Query);
  locker.execute_batch("ROLLBACK;").unwrap();

  assert!(s.query_summary(&SummaryQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn busy_write_succeeds_once_lock_is_released() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("stats.db");
  let config = StoreConfig::new(&path)
    .with_busy_retries(10, 20)
    .with_busy_timeout(10);
  let s = SqliteStore::open(config).await.unwrap();

  let locker = lock_exclusively(&path);
  let release = std::thread::spawn(move || {
    std::thread::sleep(std::time::Duration::from_millis(150));
    locker.execute_batch("COMMIT;").unwrap();
  });

  let id = s.store_summary(stats(7), "births", None).await.unwrap();
  release.join().unwrap();

  let rows = s.query_summary(&SummaryQuery::default()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].id, id);
  assert_eq!(rows[0].total_records, 7);
}
