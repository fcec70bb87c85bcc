//! Scoped connections.
//!
//! [`with_connection`] opens the configured database file, runs one unit of
//! work on the `tokio-rusqlite` thread and closes the handle again on every
//! exit path. Busy or locked failures are retried with exponential backoff.

use std::{path::PathBuf, time::Duration};

use tokio_retry::{RetryIf, strategy::ExponentialBackoff};
use tracing::{debug, warn};

use crate::{Error, config::StoreConfig};

/// Upper bound for a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// A failure observed inside a connection scope, before the calling operation
/// classifies it.
#[derive(Debug)]
pub(crate) enum ScopeError {
  /// Filesystem preparation failed.
  Prepare(String),
  /// Opening, configuring or closing the handle failed.
  Connect(tokio_rusqlite::Error),
  /// The unit of work itself failed.
  Engine(tokio_rusqlite::Error),
}

impl ScopeError {
  fn is_busy(&self) -> bool {
    let err = match self {
      ScopeError::Prepare(_) => return false,
      ScopeError::Connect(e) | ScopeError::Engine(e) => e,
    };
    matches!(
      err,
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
        if matches!(
          e.code,
          rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
        )
    )
  }

  /// Map to the public error type. Preparation and connection failures are
  /// always [`Error::Connection`]; work failures are classified by `on_engine`.
  pub(crate) fn classify(self, on_engine: impl FnOnce(String) -> Error) -> Error {
    match self {
      ScopeError::Prepare(msg) => Error::Connection(msg),
      ScopeError::Connect(e) => Error::Connection(engine_message(e)),
      ScopeError::Engine(e) => on_engine(engine_message(e)),
    }
  }
}

/// The engine's own message, without the wrapper's variant name.
fn engine_message(err: tokio_rusqlite::Error) -> String {
  match err {
    tokio_rusqlite::Error::Rusqlite(e) => e.to_string(),
    other => other.to_string(),
  }
}

/// Run `op` against a freshly opened connection to `config.path`.
///
/// `op` may run more than once when the database is busy, so it must not have
/// side effects outside the connection.
pub(crate) async fn with_connection<F, R>(
  config: &StoreConfig,
  op: F,
) -> Result<R, ScopeError>
where
  F: Fn(&mut rusqlite::Connection) -> rusqlite::Result<R> + Clone + Send + Sync + 'static,
  R: Send + 'static,
{
  let strategy = ExponentialBackoff::from_millis(2)
    .factor(config.busy_backoff_ms.max(1))
    .max_delay(MAX_BACKOFF)
    .take(config.busy_retries);

  let busy_timeout = Duration::from_millis(config.busy_timeout_ms);

  RetryIf::spawn(
    strategy,
    || attempt(config.path.clone(), busy_timeout, op.clone()),
    |e: &ScopeError| {
      let busy = e.is_busy();
      if busy {
        warn!(path = %config.path.display(), "database busy, retrying");
      }
      busy
    },
  )
  .await
}

async fn attempt<F, R>(
  path: PathBuf,
  busy_timeout: Duration,
  op: F,
) -> Result<R, ScopeError>
where
  F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
  R: Send + 'static,
{
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent).await.map_err(|e| {
      ScopeError::Prepare(format!("cannot create {}: {e}", parent.display()))
    })?;
  }

  debug!(path = %path.display(), "opening database");
  let conn = tokio_rusqlite::Connection::open(&path)
    .await
    .map_err(ScopeError::Connect)?;

  conn
    .call(move |conn| {
      conn.busy_timeout(busy_timeout)?;
      conn.execute_batch("PRAGMA foreign_keys = ON;")?;
      Ok(())
    })
    .await
    .map_err(ScopeError::Connect)?;

  let outcome = conn.call(move |conn| Ok(op(conn)?)).await;

  // Release the handle on both paths; a failed close only matters when the
  // work itself succeeded.
  let closed = conn.close().await;
  let value = outcome.map_err(ScopeError::Engine)?;
  closed.map_err(ScopeError::Connect)?;
  Ok(value)
}
