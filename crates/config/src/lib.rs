pub mod schema;
pub mod source;
pub mod watcher;

pub use schema::{BatteryConfig, PowerBarConfig, StyleConfig};
pub use source::{ConfigSource, SharedConfig};
pub use watcher::ConfigWatcher;

use powerbar_core::{PowerBarError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `PowerBarConfig::default()`
/// if the file doesn't exist so the widget always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<PowerBarConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(PowerBarConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| PowerBarError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse configuration from TOML text.
pub fn parse(raw: &str) -> Result<PowerBarConfig> {
    toml::from_str(raw).map_err(|e| PowerBarError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("powerbar").join("powerbar.toml")
}

/// Host hook for merging the widget into a surrounding configuration.
/// The widget adds nothing of its own, so the config passes through.
pub fn decorate_config(config: PowerBarConfig) -> PowerBarConfig {
    config
}
