//! SQL schema for the statistics history store.
//!
//! Applied by [`SqliteStore::initialize`](crate::SqliteStore::initialize).
//! The `schema_version` singleton is the slot future migrations compare
//! against [`SCHEMA_VERSION`].

use rusqlite::OptionalExtension as _;

use crate::encode::encode_dt;

/// Version written into a freshly initialised database.
pub const SCHEMA_VERSION: i64 = 1;

pub(crate) const TABLE_SCHEMA_VERSION: &str = "schema_version";
pub(crate) const TABLE_SUMMARY: &str = "summary_statistics";
pub(crate) const TABLE_YEARLY: &str = "yearly_comparison";
pub(crate) const TABLE_VALUE_COUNTS: &str = "value_counts";

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub(crate) const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS schema_version (
    id          INTEGER PRIMARY KEY CHECK (id = 1),
    version     INTEGER NOT NULL,
    updated_at  TEXT    NOT NULL
);

-- Rows are append-only; one shared timestamp identifies a run.
CREATE TABLE IF NOT EXISTS summary_statistics (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp        TEXT    NOT NULL,   -- RFC 3339, microseconds, UTC
    data_source      TEXT    NOT NULL,
    total_records    INTEGER NOT NULL,
    missing_values   INTEGER NOT NULL,
    unique_years     INTEGER NOT NULL,
    records_in_fs    INTEGER NOT NULL,
    unique_surnames  INTEGER NOT NULL,
    additional_data  TEXT                -- JSON object or NULL
);

CREATE TABLE IF NOT EXISTS yearly_comparison (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp               TEXT    NOT NULL,
    data_source             TEXT    NOT NULL,
    year                    INTEGER NOT NULL,
    total_records           INTEGER NOT NULL,
    records_with_condition  INTEGER NOT NULL,
    condition_name          TEXT    NOT NULL,
    UNIQUE (data_source, year, timestamp, condition_name)
);

CREATE TABLE IF NOT EXISTS value_counts (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp    TEXT    NOT NULL,
    data_source  TEXT    NOT NULL,
    column_name  TEXT    NOT NULL,
    value        TEXT    NOT NULL,
    count        INTEGER NOT NULL,
    UNIQUE (data_source, column_name, value, timestamp)
);

CREATE INDEX IF NOT EXISTS summary_source_ts_idx ON summary_statistics(data_source, timestamp);
CREATE INDEX IF NOT EXISTS yearly_source_ts_idx  ON yearly_comparison(data_source, timestamp);
CREATE INDEX IF NOT EXISTS values_column_ts_idx  ON value_counts(column_name, timestamp);
";

/// Create all tables and seed the version row if it is missing.
pub(crate) fn create_schema(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
  conn.execute_batch(SCHEMA)?;

  let tx = conn.transaction()?;
  tx.execute(
    "INSERT OR IGNORE INTO schema_version (id, version, updated_at) VALUES (1, ?1, ?2)",
    rusqlite::params![SCHEMA_VERSION, encode_dt(chrono::Utc::now())],
  )?;
  tx.commit()
}

/// The stored version, or `0` when the version table or row is absent.
pub(crate) fn read_version(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
  let has_table: bool = conn
    .query_row(
      "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
      rusqlite::params![TABLE_SCHEMA_VERSION],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);

  if !has_table {
    return Ok(0);
  }

  Ok(
    conn
      .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| {
        row.get("version")
      })
      .optional()?
      .unwrap_or(0),
  )
}
