//! A minimal column/row table used as the hand-off between queries and the
//! export adapter.

use std::fmt;

use serde::{Serialize, Serializer};

// ─── Cells ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
  /// Structured payload. Serialises as nested JSON; displays as compact JSON.
  Json(serde_json::Value),
}

impl fmt::Display for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Cell::Null => Ok(()),
      Cell::Bool(b) => write!(f, "{b}"),
      Cell::Int(i) => write!(f, "{i}"),
      Cell::Float(x) => write!(f, "{x}"),
      Cell::Text(s) => f.write_str(s),
      Cell::Json(v) => write!(f, "{v}"),
    }
  }
}

impl Serialize for Cell {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Cell::Null => serializer.serialize_none(),
      Cell::Bool(b) => serializer.serialize_bool(*b),
      Cell::Int(i) => serializer.serialize_i64(*i),
      Cell::Float(x) => serializer.serialize_f64(*x),
      Cell::Text(s) => serializer.serialize_str(s),
      Cell::Json(v) => v.serialize(serializer),
    }
  }
}

// ─── Projection trait ────────────────────────────────────────────────────────

/// A record that can be flattened into a table row.
pub trait TableRow {
  /// Column names, in field declaration order.
  const COLUMNS: &'static [&'static str];

  /// One cell per entry in [`Self::COLUMNS`].
  fn cells(&self) -> Vec<Cell>;
}

impl<T: TableRow> TableRow for &T {
  const COLUMNS: &'static [&'static str] = T::COLUMNS;

  fn cells(&self) -> Vec<Cell> { (*self).cells() }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// Named columns plus rows of equal width. An empty table still carries its
/// columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
  columns: Vec<String>,
  rows:    Vec<Vec<Cell>>,
}

impl Table {
  /// Project records into a table whose columns are the record's fields.
  pub fn from_rows<R, I>(records: I) -> Self
  where
    R: TableRow,
    I: IntoIterator<Item = R>,
  {
    Self {
      columns: R::COLUMNS.iter().map(|c| (*c).to_owned()).collect(),
      rows:    records.into_iter().map(|r| r.cells()).collect(),
    }
  }

  pub fn columns(&self) -> &[String] { &self.columns }

  pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Index of the column called `name`.
  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|c| c == name)
  }
}
