//! Store configuration.

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_DB_PATH: &str = "data/statistics_history.db";
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_BUSY_RETRIES: usize = 3;
pub const DEFAULT_BUSY_BACKOFF_MS: u64 = 25;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Settings held by a [`SqliteStore`](crate::SqliteStore) handle.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Database file; parent directories are created on first use.
  #[serde(default = "default_path")]
  pub path:            PathBuf,
  /// Number of runs returned by history views when no limit is given.
  #[serde(default = "default_history_limit")]
  pub history_limit:   usize,
  /// Extra attempts made when SQLite reports the database busy or locked.
  #[serde(default = "default_busy_retries")]
  pub busy_retries:    usize,
  /// Backoff unit; retry `n` waits `busy_backoff_ms * 2^n` milliseconds.
  #[serde(default = "default_busy_backoff_ms")]
  pub busy_backoff_ms: u64,
  /// How long SQLite itself waits on a lock before reporting busy.
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u64,
}

fn default_path() -> PathBuf { PathBuf::from(DEFAULT_DB_PATH) }

const fn default_history_limit() -> usize { DEFAULT_HISTORY_LIMIT }

const fn default_busy_retries() -> usize { DEFAULT_BUSY_RETRIES }

const fn default_busy_backoff_ms() -> u64 { DEFAULT_BUSY_BACKOFF_MS }

const fn default_busy_timeout_ms() -> u64 { DEFAULT_BUSY_TIMEOUT_MS }

impl StoreConfig {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), ..Self::default() }
  }

  pub fn with_history_limit(mut self, limit: usize) -> Self {
    self.history_limit = limit;
    self
  }

  pub fn with_busy_retries(mut self, retries: usize, backoff_ms: u64) -> Self {
    self.busy_retries = retries;
    self.busy_backoff_ms = backoff_ms;
    self
  }

  pub fn with_busy_timeout(mut self, timeout_ms: u64) -> Self {
    self.busy_timeout_ms = timeout_ms;
    self
  }
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      path:            default_path(),
      history_limit:   DEFAULT_HISTORY_LIMIT,
      busy_retries:    DEFAULT_BUSY_RETRIES,
      busy_backoff_ms: DEFAULT_BUSY_BACKOFF_MS,
      busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
    }
  }
}
