//! Settings read from `transplant.toml` and `TRANSPLANT_*` environment
//! variables. Command-line flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
  /// Hospital the operator works at.
  pub hospital:     Option<String>,
  /// JSON file holding the donor registry.
  pub donors_path:  Option<PathBuf>,
  /// List organs whose viability window has closed.
  #[serde(default)]
  pub show_expired: bool,
}

impl Settings {
  /// Layer the optional file at `path` under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TRANSPLANT"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  /// The registry path, preferring `flag` when given.
  pub fn donors_path(&self, flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    flag.or_else(|| self.donors_path.clone()).context(
      "no donor registry given; pass --donors or set donors_path in the config",
    )
  }
}
