//! Excel output: one worksheet with a header row followed by typed cells.

use std::path::Path;

use ancestry_core::table::{Cell, Table};
use rust_xlsxwriter::{Format, Workbook};

use crate::{ExportError, Result};

pub fn write_excel(table: &Table, path: &Path, sheet_name: &str) -> Result<()> {
  let too_large = || ExportError::TooLarge {
    rows:    table.len(),
    columns: table.columns().len(),
  };

  let mut workbook = Workbook::new();
  let header = Format::new().set_bold();
  let sheet = workbook.add_worksheet();
  sheet.set_name(sheet_name)?;

  for (c, name) in table.columns().iter().enumerate() {
    let col = u16::try_from(c).map_err(|_| too_large())?;
    sheet.write_string_with_format(0, col, name, &header)?;
  }

  for (r, row) in table.rows().iter().enumerate() {
    let line = u32::try_from(r + 1).map_err(|_| too_large())?;
    for (c, cell) in row.iter().enumerate() {
      let col = u16::try_from(c).map_err(|_| too_large())?;
      match cell {
        Cell::Null => {}
        Cell::Bool(b) => {
          sheet.write_boolean(line, col, *b)?;
        }
        Cell::Int(i) => {
          sheet.write_number(line, col, *i as f64)?;
        }
        Cell::Float(x) => {
          sheet.write_number(line, col, *x)?;
        }
        Cell::Text(s) => {
          sheet.write_string(line, col, s)?;
        }
        Cell::Json(v) => {
          sheet.write_string(line, col, v.to_string())?;
        }
      }
    }
  }

  workbook.save(path)?;
  Ok(())
}
