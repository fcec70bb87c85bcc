//! JSON output: a pretty-printed array with one object per row. Object keys
//! follow the table's column order.

use std::io;

use ancestry_core::table::{Cell, Table};
use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::Result;

struct RowObject<'a> {
  columns: &'a [String],
  cells:   &'a [Cell],
}

impl Serialize for RowObject<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.columns.len()))?;
    for (column, cell) in self.columns.iter().zip(self.cells) {
      map.serialize_entry(column, cell)?;
    }
    map.end()
  }
}

pub fn write_json<W: io::Write>(table: &Table, writer: W) -> Result<()> {
  let rows: Vec<RowObject<'_>> = table
    .rows()
    .iter()
    .map(|cells| RowObject { columns: table.columns(), cells })
    .collect();
  serde_json::to_writer_pretty(writer, &rows)?;
  Ok(())
}
