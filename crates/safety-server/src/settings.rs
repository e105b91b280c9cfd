//! Runtime configuration.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8420;
pub const DEFAULT_STORE_PATH: &str = "~/.local/share/safety-tracker/safety_tracker.db";

/// Server configuration, deserialised from `config.toml` layered under
/// `SAFETY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment, falling back to the
  /// built-in defaults for anything neither sets.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", DEFAULT_HOST)?
      .set_default("port", i64::from(DEFAULT_PORT))?
      .set_default("store_path", DEFAULT_STORE_PATH)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SAFETY"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = ServerConfig::load(Path::new("does-not-exist.toml")).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.address(), format!("{DEFAULT_HOST}:{DEFAULT_PORT}"));
    assert!(cfg.store_path().ends_with("safety-tracker/safety_tracker.db"));
  }

  #[test]
  fn tilde_only_expands_as_prefix() {
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
    assert_eq!(expand_tilde(Path::new("a/~/b")), PathBuf::from("a/~/b"));
  }
}
