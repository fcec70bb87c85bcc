//! Query filters for reading statistics back out of a store.
//!
//! Every filter field is optional; a store AND-composes one predicate per
//! field that is set. Date bounds arrive as `YYYY-MM-DD` strings and are
//! validated by [`DateRange::parse`] before any storage access happens.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::{Error, Result, record::ensure_fixed_width};

/// Accepted format for date filter bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` date filter.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|source| {
    Error::InvalidDate { input: input.to_owned(), source }
  })
}

/// The first instant of `date` in UTC.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
  date.and_time(NaiveTime::MIN).and_utc()
}

/// The last representable microsecond of `date` in UTC.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
  start_of_day(date) + Duration::days(1) - Duration::microseconds(1)
}

/// An inclusive timestamp range built from bare calendar dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
  pub start: Option<DateTime<Utc>>,
  pub end:   Option<DateTime<Utc>>,
}

impl DateRange {
  /// The start bound covers its whole day from midnight; the end bound is
  /// shifted to the end of its day so records written at any time on that
  /// date are included.
  pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
    let start_date = start.map(parse_date).transpose()?;
    let end_date = end.map(parse_date).transpose()?;

    if let (Some(s), Some(e)) = (start_date, end_date)
      && s > e
    {
      return Err(Error::InvalidFilter(format!(
        "start date {s} is after end date {e}"
      )));
    }

    Ok(Self {
      start: start_date.map(start_of_day).map(ensure_fixed_width).transpose()?,
      end:   end_date.map(end_of_day).map(ensure_fixed_width).transpose()?,
    })
  }
}

/// Treat blank filter values as absent.
fn non_blank(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for summary queries and history views.
#[derive(Debug, Clone, Default)]
pub struct SummaryQuery {
  pub data_source: Option<String>,
  /// Inclusive lower bound, `YYYY-MM-DD`.
  pub start_date:  Option<String>,
  /// Inclusive upper bound, `YYYY-MM-DD`.
  pub end_date:    Option<String>,
}

impl SummaryQuery {
  pub fn for_source(data_source: impl Into<String>) -> Self {
    Self { data_source: Some(data_source.into()), ..Default::default() }
  }

  pub fn date_range(&self) -> Result<DateRange> {
    DateRange::parse(non_blank(&self.start_date), non_blank(&self.end_date))
  }

  pub fn data_source(&self) -> Option<&str> { non_blank(&self.data_source) }
}

/// Parameters for yearly-comparison queries and history views.
#[derive(Debug, Clone, Default)]
pub struct YearlyQuery {
  pub data_source:    Option<String>,
  pub start_date:     Option<String>,
  pub end_date:       Option<String>,
  pub condition_name: Option<String>,
  pub year:           Option<i32>,
}

impl YearlyQuery {
  pub fn for_source(data_source: impl Into<String>) -> Self {
    Self { data_source: Some(data_source.into()), ..Default::default() }
  }

  pub fn date_range(&self) -> Result<DateRange> {
    DateRange::parse(non_blank(&self.start_date), non_blank(&self.end_date))
  }

  pub fn data_source(&self) -> Option<&str> { non_blank(&self.data_source) }

  pub fn condition_name(&self) -> Option<&str> {
    non_blank(&self.condition_name)
  }
}

/// Parameters for value-count queries and history views.
#[derive(Debug, Clone, Default)]
pub struct ValueCountQuery {
  pub column_name: Option<String>,
  pub data_source: Option<String>,
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
  pub value:       Option<String>,
}

impl ValueCountQuery {
  pub fn for_column(column_name: impl Into<String>) -> Self {
    Self { column_name: Some(column_name.into()), ..Default::default() }
  }

  pub fn date_range(&self) -> Result<DateRange> {
    DateRange::parse(non_blank(&self.start_date), non_blank(&self.end_date))
  }

  pub fn column_name(&self) -> Option<&str> { non_blank(&self.column_name) }

  pub fn data_source(&self) -> Option<&str> { non_blank(&self.data_source) }

  /// Values are matched verbatim, so only an empty string counts as unset.
  pub fn value(&self) -> Option<&str> {
    self.value.as_deref().filter(|v| !v.is_empty())
  }
}
