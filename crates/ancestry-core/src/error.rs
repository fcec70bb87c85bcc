//! Error types for `ancestry-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A date filter that does not parse as `YYYY-MM-DD`.
  #[error("invalid date format {input:?}: expected YYYY-MM-DD ({source})")]
  InvalidDate {
    input:  String,
    #[source]
    source: chrono::ParseError,
  },

  #[error("invalid filter: {0}")]
  InvalidFilter(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
