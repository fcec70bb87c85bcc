//! Command-line arguments.

use std::path::PathBuf;

use ancestry_core::filter::{SummaryQuery, ValueCountQuery, YearlyQuery};
use ancestry_export::{
  DEFAULT_SHEET_NAME, ExportError, ExportFormat, ExportOptions,
};
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(
  name = "ancestry",
  author,
  version,
  about = "Record and query the history of genealogical dataset statistics"
)]
pub struct Cli {
  /// Path to the TOML configuration file. A missing file is not an error.
  #[arg(short, long, value_name = "FILE", default_value = "ancestry.toml")]
  pub config: PathBuf,

  /// Database file; overrides `path` from the config file and environment.
  #[arg(long, value_name = "FILE")]
  pub db: Option<PathBuf>,

  /// Default log level when `RUST_LOG` is unset.
  #[arg(long, value_name = "LEVEL")]
  pub log_level: Option<LevelFilter>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create the database schema if it does not exist.
  Init,

  /// Print the stored schema version (0 when uninitialised).
  Version,

  /// Record one run of statistics from a JSON document.
  Record {
    /// JSON file holding a single run (`data_source`, `summary`, `yearly`,
    /// `value_counts`, ...).
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },

  /// Query summary statistics.
  Summary {
    #[command(flatten)]
    filter: SummaryFilter,
    #[command(flatten)]
    output: OutputArgs,
  },

  /// Query per-year comparison rows.
  Yearly {
    #[command(flatten)]
    filter: YearlyFilter,
    #[command(flatten)]
    output: OutputArgs,
  },

  /// Query value counts.
  Values {
    #[command(flatten)]
    filter: ValueFilter,
    #[command(flatten)]
    output: OutputArgs,
  },

  /// Show the most recent runs, grouped by run timestamp.
  History {
    #[command(subcommand)]
    view: HistoryView,
  },

  /// List every data source with stored statistics.
  Sources,
}

#[derive(Subcommand, Debug)]
pub enum HistoryView {
  Summary {
    #[command(flatten)]
    filter: SummaryFilter,
    #[command(flatten)]
    limit: LimitArg,
    #[command(flatten)]
    output: OutputArgs,
  },
  Yearly {
    #[command(flatten)]
    filter: YearlyFilter,
    #[command(flatten)]
    limit: LimitArg,
    #[command(flatten)]
    output: OutputArgs,
  },
  Values {
    #[command(flatten)]
    filter: ValueFilter,
    #[command(flatten)]
    limit: LimitArg,
    #[command(flatten)]
    output: OutputArgs,
  },
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Clone, Default)]
pub struct DateArgs {
  /// Inclusive start date, YYYY-MM-DD.
  #[arg(long, value_name = "DATE")]
  pub start: Option<String>,

  /// Inclusive end date, YYYY-MM-DD. Covers the whole day.
  #[arg(long, value_name = "DATE")]
  pub end: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SummaryFilter {
  #[arg(long, value_name = "NAME")]
  pub source: Option<String>,
  #[command(flatten)]
  pub dates:  DateArgs,
}

impl From<SummaryFilter> for SummaryQuery {
  fn from(f: SummaryFilter) -> Self {
    SummaryQuery {
      data_source: f.source,
      start_date:  f.dates.start,
      end_date:    f.dates.end,
    }
  }
}

#[derive(Args, Debug, Clone, Default)]
pub struct YearlyFilter {
  #[arg(long, value_name = "NAME")]
  pub source:    Option<String>,
  #[arg(long, value_name = "NAME")]
  pub condition: Option<String>,
  #[arg(long)]
  pub year:      Option<i32>,
  #[command(flatten)]
  pub dates:     DateArgs,
}

impl From<YearlyFilter> for YearlyQuery {
  fn from(f: YearlyFilter) -> Self {
    YearlyQuery {
      data_source:    f.source,
      start_date:     f.dates.start,
      end_date:       f.dates.end,
      condition_name: f.condition,
      year:           f.year,
    }
  }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ValueFilter {
  #[arg(long, value_name = "NAME")]
  pub column: Option<String>,
  #[arg(long, value_name = "NAME")]
  pub source: Option<String>,
  /// Exact value to match.
  #[arg(long)]
  pub value:  Option<String>,
  #[command(flatten)]
  pub dates:  DateArgs,
}

impl From<ValueFilter> for ValueCountQuery {
  fn from(f: ValueFilter) -> Self {
    ValueCountQuery {
      column_name: f.column,
      data_source: f.source,
      start_date:  f.dates.start,
      end_date:    f.dates.end,
      value:       f.value,
    }
  }
}

#[derive(Args, Debug, Clone, Default)]
pub struct LimitArg {
  /// Number of runs to show; defaults to `history_limit` from the config.
  #[arg(long)]
  pub limit: Option<usize>,
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
  /// table, csv, json or excel.
  #[arg(long, default_value = "table", value_parser = parse_format)]
  pub format: ExportFormat,

  /// Destination file; required for every format except `table`.
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Worksheet name for Excel output.
  #[arg(long, default_value = DEFAULT_SHEET_NAME)]
  pub sheet_name: String,
}

impl OutputArgs {
  /// Reject a file format without a destination before any query runs.
  pub fn check(&self) -> Result<(), ExportError> {
    if self.format.requires_output() && self.output.is_none() {
      return Err(ExportError::MissingOutput(self.format));
    }
    Ok(())
  }

  pub fn options(&self) -> ExportOptions {
    ExportOptions { sheet_name: self.sheet_name.clone() }
  }
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
  s.parse().map_err(|e: ExportError| e.to_string())
}
