//! Snapshot grouping for history views.
//!
//! Every row written by one store call shares a timestamp, so grouping rows by
//! timestamp reconstructs the discrete runs that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::table::{Table, TableRow};

/// The rows written by a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
  pub timestamp: DateTime<Utc>,
  pub rows:      Vec<T>,
}

/// Runs ordered most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History<T> {
  snapshots: Vec<Snapshot<T>>,
}

impl<T> History<T> {
  /// Callers must supply snapshots already ordered newest first.
  pub fn new(snapshots: Vec<Snapshot<T>>) -> Self { Self { snapshots } }

  pub fn len(&self) -> usize { self.snapshots.len() }

  pub fn is_empty(&self) -> bool { self.snapshots.is_empty() }

  pub fn iter(&self) -> std::slice::Iter<'_, Snapshot<T>> {
    self.snapshots.iter()
  }

  pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
    self.snapshots.iter().map(|s| s.timestamp).collect()
  }

  /// Rows of the run recorded at exactly `timestamp`.
  pub fn get(&self, timestamp: DateTime<Utc>) -> Option<&[T]> {
    self
      .snapshots
      .iter()
      .find(|s| s.timestamp == timestamp)
      .map(|s| s.rows.as_slice())
  }

  pub fn latest(&self) -> Option<&Snapshot<T>> { self.snapshots.first() }
}

impl<T: TableRow> History<T> {
  /// Flatten every snapshot into one table, newest run first.
  pub fn to_table(&self) -> Table {
    let rows: Vec<&T> =
      self.snapshots.iter().flat_map(|s| s.rows.iter()).collect();
    Table::from_rows(rows)
  }
}

impl<T> Default for History<T> {
  fn default() -> Self { Self { snapshots: Vec::new() } }
}

impl<T> IntoIterator for History<T> {
  type IntoIter = std::vec::IntoIter<Snapshot<T>>;
  type Item = Snapshot<T>;

  fn into_iter(self) -> Self::IntoIter { self.snapshots.into_iter() }
}

impl<'a, T> IntoIterator for &'a History<T> {
  type IntoIter = std::slice::Iter<'a, Snapshot<T>>;
  type Item = &'a Snapshot<T>;

  fn into_iter(self) -> Self::IntoIter { self.snapshots.iter() }
}
