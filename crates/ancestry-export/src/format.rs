//! Output formats and options.

use std::{fmt, str::FromStr};

use crate::ExportError;

/// Default worksheet name for Excel output.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
  /// Aligned plain text, for terminals.
  #[default]
  Table,
  Csv,
  Json,
  Excel,
}

impl ExportFormat {
  pub fn requires_output(self) -> bool { !matches!(self, ExportFormat::Table) }

  pub fn as_str(self) -> &'static str {
    match self {
      ExportFormat::Table => "table",
      ExportFormat::Csv => "csv",
      ExportFormat::Json => "json",
      ExportFormat::Excel => "excel",
    }
  }
}

impl fmt::Display for ExportFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ExportFormat {
  type Err = ExportError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "table" | "text" => Ok(ExportFormat::Table),
      "csv" => Ok(ExportFormat::Csv),
      "json" => Ok(ExportFormat::Json),
      "excel" | "xlsx" => Ok(ExportFormat::Excel),
      _ => Err(ExportError::UnknownFormat(s.to_owned())),
    }
  }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
  /// Worksheet name used by [`ExportFormat::Excel`].
  pub sheet_name: String,
}

impl Default for ExportOptions {
  fn default() -> Self { Self { sheet_name: DEFAULT_SHEET_NAME.to_owned() } }
}
