//! Plain-text rendering for terminals.

use std::io;

use ancestry_core::table::Table;
use tabled::{builder::Builder, settings::Style};

/// Render `table` as a bordered grid with the column names as its header.
pub fn write_text<W: io::Write>(table: &Table, mut writer: W) -> io::Result<()> {
  let mut builder = Builder::default();
  builder.push_record(table.columns().iter().cloned());
  for row in table.rows() {
    builder.push_record(row.iter().map(ToString::to_string));
  }

  let mut grid = builder.build();
  grid.with(Style::ascii());
  writeln!(writer, "{grid}")?;

  if table.is_empty() {
    writeln!(writer, "(no rows)")?;
  }
  writer.flush()
}
