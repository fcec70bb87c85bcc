//! Error type for `ancestry-store-sqlite`.
//!
//! Engine errors never escape raw: each is classified at the operation
//! boundary and keeps only the engine's message for diagnostics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed caller input (dates, empty labels). Raised before any
  /// connection is opened.
  #[error(transparent)]
  Core(#[from] ancestry_core::Error),

  /// The database file could not be opened, configured or closed.
  #[error("database connection error: {0}")]
  Connection(String),

  #[error("error initializing database schema: {0}")]
  Schema(String),

  /// A read or write statement failed.
  #[error("error {context}: {message}")]
  Query {
    context: &'static str,
    message: String,
  },
}

impl Error {
  pub(crate) fn query(context: &'static str, message: impl ToString) -> Self {
    Self::Query { context, message: message.to_string() }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(ancestry_core::Error::InvalidDate { .. }) => ErrorKind::InvalidDate,
      Error::Core(ancestry_core::Error::InvalidFilter(_)) => ErrorKind::InvalidFilter,
      Error::Query { .. } => ErrorKind::Query,
      Error::Connection(_) => ErrorKind::Connection,
      Error::Schema(_) => ErrorKind::Schema,
    }
  }
}

/// Coarse error category, for callers that branch on cause rather than
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Connection,
  Schema,
  Query,
  InvalidDate,
  InvalidFilter,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
