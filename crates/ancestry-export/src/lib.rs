//! Writes [`Table`]s produced by the store's export queries to CSV, JSON,
//! Excel or aligned plain text.
//!
//! Nothing here filters or reshapes data; a table is written exactly as
//! given.

mod delimited;
mod excel;
mod json;
mod text;

pub mod error;
pub mod format;

use std::{
  fs::File,
  io::{self, BufWriter, Write as _},
  path::Path,
};

use ancestry_core::table::Table;
use tracing::info;

pub use delimited::write_csv;
pub use error::{ExportError, Result};
pub use excel::write_excel;
pub use format::{DEFAULT_SHEET_NAME, ExportFormat, ExportOptions};
pub use json::write_json;
pub use text::write_text;

/// Write `table` in `format`.
///
/// `output` is mandatory for every format except [`ExportFormat::Table`],
/// which prints to stdout when no path is given.
pub fn write_table(
  table: &Table,
  format: ExportFormat,
  output: Option<&Path>,
  options: &ExportOptions,
) -> Result<()> {
  let Some(path) = output else {
    if format.requires_output() {
      return Err(ExportError::MissingOutput(format));
    }
    let stdout = io::stdout();
    return write_text(table, stdout.lock()).map_err(|source| ExportError::Io {
      path: "<stdout>".into(),
      source,
    });
  };

  match format {
    ExportFormat::Excel => {
      create_parent(path)?;
      write_excel(table, path, &options.sheet_name)?;
    }
    ExportFormat::Table => with_file(path, |w| {
      write_text(table, w).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
      })
    })?,
    ExportFormat::Csv => with_file(path, |w| write_csv(table, w))?,
    ExportFormat::Json => with_file(path, |w| write_json(table, w))?,
  }

  info!(%format, rows = table.len(), path = %path.display(), "exported table");
  Ok(())
}

fn with_file(
  path: &Path,
  write: impl FnOnce(&mut BufWriter<File>) -> Result<()>,
) -> Result<()> {
  let io_err = |source| ExportError::Io { path: path.to_path_buf(), source };

  create_parent(path)?;
  let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
  write(&mut writer)?;
  writer.flush().map_err(io_err)
}

fn create_parent(path: &Path) -> Result<()> {
  match path.parent().filter(|p| !p.as_os_str().is_empty()) {
    Some(parent) => std::fs::create_dir_all(parent)
      .map_err(|source| ExportError::Io { path: parent.to_path_buf(), source }),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests;
