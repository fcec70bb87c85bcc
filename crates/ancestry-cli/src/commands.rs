//! Command handlers.

use std::{io, path::Path};

use ancestry_core::{
  history::History,
  input::RunStatistics,
  record::format_timestamp,
  store::StatsStore,
  table::{Table, TableRow},
};
use ancestry_export::{write_table, write_text};
use ancestry_store_sqlite::{SqliteStore, StoreConfig};
use anyhow::Context as _;
use tracing::info;

use crate::cli::{Command, HistoryView, OutputArgs};

pub async fn run(command: Command, config: StoreConfig) -> anyhow::Result<()> {
  let store = SqliteStore::new(config);

  match command {
    Command::Init => {
      store.initialize().await?;
      println!("initialised {}", store.path().display());
    }

    Command::Version => {
      let version = store.schema_version().await?;
      println!("{version}");
    }

    Command::Record { input } => {
      let run = read_run(&input).await?;
      store.initialize().await?;
      let ids = store.record_run(run).await?;
      println!(
        "recorded summary {} with {} yearly rows and {} value-count columns",
        ids.summary_id,
        ids.yearly_ids.len(),
        ids.value_count_ids.len(),
      );
    }

    Command::Summary { filter, output } => {
      output.check()?;
      let table = store.export_summary(&filter.into()).await?;
      emit(&table, &output)?;
    }

    Command::Yearly { filter, output } => {
      output.check()?;
      let table = store.export_yearly_comparison(&filter.into()).await?;
      emit(&table, &output)?;
    }

    Command::Values { filter, output } => {
      output.check()?;
      let table = store.export_value_counts(&filter.into()).await?;
      emit(&table, &output)?;
    }

    Command::History { view } => history(&store, view).await?,

    Command::Sources => {
      for source in store.data_sources().await? {
        println!("{source}");
      }
    }
  }

  Ok(())
}

async fn history(store: &SqliteStore, view: HistoryView) -> anyhow::Result<()> {
  match view {
    HistoryView::Summary { filter, limit, output } => {
      output.check()?;
      let history = store.summary_history(&filter.into(), limit.limit).await?;
      emit_history(&history, &output)
    }
    HistoryView::Yearly { filter, limit, output } => {
      output.check()?;
      let history = store
        .yearly_comparison_history(&filter.into(), limit.limit)
        .await?;
      emit_history(&history, &output)
    }
    HistoryView::Values { filter, limit, output } => {
      output.check()?;
      let history = store
        .value_counts_history(&filter.into(), limit.limit)
        .await?;
      emit_history(&history, &output)
    }
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

fn emit(table: &Table, output: &OutputArgs) -> anyhow::Result<()> {
  write_table(table, output.format, output.output.as_deref(), &output.options())?;
  Ok(())
}

/// Terminal output prints one block per run; file output flattens every run
/// into a single table.
fn emit_history<T: TableRow>(
  history: &History<T>,
  output: &OutputArgs,
) -> anyhow::Result<()> {
  if output.output.is_some() {
    return emit(&history.to_table(), output);
  }

  if history.is_empty() {
    println!("no recorded runs");
    return Ok(());
  }

  let stdout = io::stdout();
  let mut out = stdout.lock();
  for snapshot in history {
    use io::Write as _;
    writeln!(
      out,
      "\n== run {} ({} rows) ==",
      format_timestamp(snapshot.timestamp),
      snapshot.rows.len()
    )?;
    write_text(&Table::from_rows(&snapshot.rows), &mut out)?;
  }
  Ok(())
}

// ─── Input ───────────────────────────────────────────────────────────────────

async fn read_run(path: &Path) -> anyhow::Result<RunStatistics> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("reading run file {}", path.display()))?;
  let run: RunStatistics = serde_json::from_str(&raw)
    .with_context(|| format!("parsing run file {}", path.display()))?;
  info!(data_source = %run.data_source, path = %path.display(), "loaded run");
  Ok(run)
}
