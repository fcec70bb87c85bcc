//! `ancestry`: record and inspect the history of genealogical dataset
//! statistics.
//!
//! # Usage
//!
//! ```
//! ancestry init
//! ancestry record --input run.json
//! ancestry summary --source births --start 2024-01-01
//! ancestry history values --column normalized_surname --limit 3
//! ancestry yearly --format csv --output yearly.csv
//! ```

mod cli;
mod commands;
mod settings;

use std::process::ExitCode;

use ancestry_export::ExportError;
use ancestry_store_sqlite::{Error as StoreError, ErrorKind};
use clap::Parser;
use cli::Cli;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Exit status for bad arguments, dates or filters.
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();

  // Logs go to stderr so tables on stdout stay clean.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(cli.log_level.unwrap_or(LevelFilter::INFO).into())
        .from_env_lossy(),
    )
    .init();

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      let kind = store_error_kind(&err);
      tracing::error!(kind = ?kind, "{err:#}");
      ExitCode::from(exit_code(&err, kind))
    }
  }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
  let config = settings::load(&cli.config, cli.db.as_deref())?;
  tracing::debug!(path = %config.path.display(), "using database");
  commands::run(cli.command, config).await
}

fn store_error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
  err
    .chain()
    .find_map(|e| e.downcast_ref::<StoreError>())
    .map(StoreError::kind)
}

fn exit_code(err: &anyhow::Error, kind: Option<ErrorKind>) -> u8 {
  let bad_input = matches!(kind, Some(ErrorKind::InvalidDate | ErrorKind::InvalidFilter))
    || err.chain().any(|e| {
      matches!(
        e.downcast_ref::<ExportError>(),
        Some(ExportError::MissingOutput(_) | ExportError::UnknownFormat(_))
      )
    });
  if bad_input { EXIT_USAGE } else { 1 }
}
