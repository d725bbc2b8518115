pub mod schema;

pub use schema::{DisplayConfig, FreqConfig, SamplingConfig};

use freq_core::{FreqError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `FreqConfig::default()` if
/// the file doesn't exist so sampling always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<FreqConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(FreqConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| FreqError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse and validate a TOML document.
pub fn parse(raw: &str) -> Result<FreqConfig> {
    let config: FreqConfig =
        toml::from_str(raw).map_err(|e| FreqError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("freqplot").join("freqplot.toml")
}
