//! Layered configuration: optional TOML file, then `ANCESTRY_*` environment
//! variables, then command-line overrides.

use std::path::{Path, PathBuf};

use ancestry_store_sqlite::StoreConfig;
use anyhow::Context as _;

pub const ENV_PREFIX: &str = "ANCESTRY";

pub fn load(file: &Path, db: Option<&Path>) -> anyhow::Result<StoreConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(file.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    .set_override_option("path", db.map(|p| p.to_string_lossy().into_owned()))
    .context("failed to apply --db override")?
    .build()
    .with_context(|| format!("failed to read config file {}", file.display()))?;

  let mut store: StoreConfig = settings
    .try_deserialize()
    .context("failed to deserialise store configuration")?;
  store.path = expand_tilde(&store.path);
  Ok(store)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
