//! Statistics query engine.
//!
//! Filters are turned into AND-composed, parameterised predicates. History
//! views first select the N most recent distinct timestamps and then load each
//! run's rows with the same predicates.

use ancestry_core::{
  filter::{DateRange, SummaryQuery, ValueCountQuery, YearlyQuery},
  history::{History, Snapshot},
};
use rusqlite::{
  ToSql,
  types::{ToSqlOutput, Value},
};
use tracing::debug;

use crate::{
  Error, Result, SqliteStore,
  connection::with_connection,
  encode::{decode_dt, encode_dt},
};

// ─── Parameters ──────────────────────────────────────────────────────────────

/// An owned, cloneable bind parameter.
#[derive(Debug, Clone)]
pub(crate) enum Param {
  Int(i64),
  Text(String),
}

impl ToSql for Param {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(match self {
      Param::Int(i) => ToSqlOutput::Owned(Value::Integer(*i)),
      Param::Text(s) => ToSqlOutput::from(s.as_str()),
    })
  }
}

// ─── Predicates ──────────────────────────────────────────────────────────────

/// A list of `column op ?` clauses and their bound values, in order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Predicates {
  clauses: Vec<&'static str>,
  params:  Vec<Param>,
}

impl Predicates {
  fn text(&mut self, clause: &'static str, value: Option<&str>) -> &mut Self {
    if let Some(v) = value {
      self.clauses.push(clause);
      self.params.push(Param::Text(v.to_owned()));
    }
    self
  }

  fn int(&mut self, clause: &'static str, value: Option<i64>) -> &mut Self {
    if let Some(v) = value {
      self.clauses.push(clause);
      self.params.push(Param::Int(v));
    }
    self
  }

  fn range(&mut self, range: DateRange) -> &mut Self {
    self.text("timestamp >= ?", range.start.map(encode_dt).as_deref());
    self.text("timestamp <= ?", range.end.map(encode_dt).as_deref())
  }

  /// `" WHERE a AND b"`, or an empty string when nothing is filtered.
  pub(crate) fn where_clause(&self) -> String {
    if self.clauses.is_empty() {
      String::new()
    } else {
      format!(" WHERE {}", self.clauses.join(" AND "))
    }
  }

  /// The same predicates with `timestamp = ?` prepended, for loading one run.
  fn scoped_to(&self, timestamp: &str) -> Self {
    let mut scoped = Self::default();
    scoped.text("timestamp = ?", Some(timestamp));
    scoped.clauses.extend(self.clauses.iter().copied());
    scoped.params.extend(self.params.iter().cloned());
    scoped
  }
}

/// Dates are parsed here, before any connection exists, so a malformed date
/// can never be reported as a storage failure.
pub(crate) fn summary_predicates(q: &SummaryQuery) -> Result<Predicates> {
  let range = q.date_range()?;
  let mut p = Predicates::default();
  p.text("data_source = ?", q.data_source()).range(range);
  Ok(p)
}

pub(crate) fn yearly_predicates(q: &YearlyQuery) -> Result<Predicates> {
  let range = q.date_range()?;
  let mut p = Predicates::default();
  p.text("data_source = ?", q.data_source())
    .range(range)
    .text("condition_name = ?", q.condition_name())
    .int("year = ?", q.year.map(i64::from));
  Ok(p)
}

pub(crate) fn value_count_predicates(q: &ValueCountQuery) -> Result<Predicates> {
  let range = q.date_range()?;
  let mut p = Predicates::default();
  p.text("column_name = ?", q.column_name())
    .text("data_source = ?", q.data_source())
    .range(range)
    .text("value = ?", q.value());
  Ok(p)
}

// ─── Table descriptions ──────────────────────────────────────────────────────

/// What a read needs to know about one statistics table.
pub(crate) struct TableSpec<R> {
  pub name:     &'static str,
  pub columns:  &'static str,
  /// Ordering inside a single run; queries prefix it with `timestamp DESC`.
  pub order:    &'static str,
  pub context:  &'static str,
  pub from_row: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
}

// ─── Execution ───────────────────────────────────────────────────────────────

impl SqliteStore {
  /// All rows matching `preds`, most recent run first.
  pub(crate) async fn select<R>(
    &self,
    spec:  TableSpec<R>,
    preds: Predicates,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    let sql = format!(
      "SELECT {} FROM {}{} ORDER BY timestamp DESC, {}",
      spec.columns,
      spec.name,
      preds.where_clause(),
      spec.order,
    );
    debug!(%sql, "running query");

    let params = preds.params;
    let from_row = spec.from_row;

    with_connection(self.config(), move |conn| {
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await
    .map_err(|e| e.classify(|m| Error::query(spec.context, m)))
  }

  /// The `limit` most recent runs matching `preds`, each with its own rows.
  pub(crate) async fn select_history<R, T>(
    &self,
    spec:   TableSpec<R>,
    preds:  Predicates,
    limit:  Option<usize>,
    decode: fn(R) -> Result<T>,
  ) -> Result<History<T>>
  where
    R: Send + 'static,
  {
    let limit = limit.unwrap_or(self.config().history_limit);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let stamps_sql = format!(
      "SELECT DISTINCT timestamp FROM {}{} ORDER BY timestamp DESC LIMIT ?",
      spec.name,
      preds.where_clause(),
    );
    let mut stamps_params = preds.params.clone();
    stamps_params.push(Param::Int(limit));
    let from_row = spec.from_row;
    let name = spec.name;
    let columns = spec.columns;
    let order = spec.order;

    let runs: Vec<(String, Vec<R>)> = with_connection(self.config(), move |conn| {
      let timestamps = {
        let mut stmt = conn.prepare(&stamps_sql)?;
        stmt
          .query_map(rusqlite::params_from_iter(stamps_params.iter()), |row| {
            row.get::<_, String>("timestamp")
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?
      };

      let mut runs = Vec::with_capacity(timestamps.len());
      for ts in timestamps {
        let scoped = preds.scoped_to(&ts);
        let sql = format!(
          "SELECT {columns} FROM {name}{} ORDER BY {order}",
          scoped.where_clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(scoped.params.iter()), from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        runs.push((ts, rows));
      }
      Ok(runs)
    })
    .await
    .map_err(|e| e.classify(|m| Error::query(spec.context, m)))?;

    let snapshots = runs
      .into_iter()
      .map(|(ts, rows)| {
        Ok(Snapshot {
          timestamp: decode_dt(&ts)?,
          rows:      rows.into_iter().map(decode).collect::<Result<_>>()?,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(History::new(snapshots))
  }

  /// Distinct data-source labels across all statistics tables.
  pub(crate) async fn select_data_sources(&self) -> Result<Vec<String>> {
    with_connection(self.config(), |conn| {
      let mut stmt = conn.prepare(
        "SELECT data_source FROM summary_statistics
         UNION SELECT data_source FROM yearly_comparison
         UNION SELECT data_source FROM value_counts
         ORDER BY data_source",
      )?;
      let rows = stmt
        .query_map([], |row| row.get::<_, String>("data_source"))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await
    .map_err(|e| e.classify(|m| Error::query("listing data sources", m)))
  }
}
