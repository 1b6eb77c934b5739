//! Runtime configuration, layered from built-in defaults, an optional TOML
//! file and `CPI_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cpi_core::catalog::Catalog;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub catalog:    Catalog,
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8050)?
      .set_default("store_path", "observations.db")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CPI"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  /// Expand a leading `~` in the store path to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }
}
