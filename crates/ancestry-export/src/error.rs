//! Error type for `ancestry-export`.

use std::path::PathBuf;

use thiserror::Error;

use crate::ExportFormat;

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("cannot write {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("CSV export failed: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON export failed: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Excel export failed: {0}")]
  Excel(#[from] rust_xlsxwriter::XlsxError),

  /// Every format except `table` writes to a file.
  #[error("format `{0}` requires an output path")]
  MissingOutput(ExportFormat),

  #[error("unknown export format {0:?} (expected table, csv, json or excel)")]
  UnknownFormat(String),

  #[error("table too large for a worksheet: {rows} rows, {columns} columns")]
  TooLarge { rows: usize, columns: usize },
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
