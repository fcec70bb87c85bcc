//! CSV output: a header row, then one line per table row. No index column.

use std::io;

use ancestry_core::table::Table;

use crate::Result;

pub fn write_csv<W: io::Write>(table: &Table, writer: W) -> Result<()> {
  let mut out = ::csv::Writer::from_writer(writer);
  out.write_record(table.columns())?;
  for row in table.rows() {
    out.write_record(row.iter().map(ToString::to_string))?;
  }
  out.flush().map_err(::csv::Error::from)?;
  Ok(())
}
