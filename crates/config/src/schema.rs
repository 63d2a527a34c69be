use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure parsed from `powerbar.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerBarConfig {
    /// `false` hides the bar container; the widget keeps rendering.
    pub show_battery_bar: bool,
    /// Stylesheet injection settings.
    pub style: StyleConfig,
    /// Power-supply discovery and polling.
    pub battery: BatteryConfig,
}

impl Default for PowerBarConfig {
    fn default() -> Self {
        Self {
            show_battery_bar: true,
            style: StyleConfig::default(),
            battery: BatteryConfig::default(),
        }
    }
}

/// `[style]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Name of the static stylesheet, also used to tag the style node.
    pub stylesheet: String,
    /// Directory the stylesheet name is resolved against.
    /// `None` = next to the config file.
    pub directory: Option<PathBuf>,
    /// Custom properties emitted into the generated `:root` block.
    pub variables: BTreeMap<String, String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            stylesheet: "style.css".to_string(),
            directory:  None,
            variables:  BTreeMap::from([("height".to_string(), "2px".to_string())]),
        }
    }
}

/// `[battery]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    /// Power-supply name under `/sys/class/power_supply` (e.g. `"BAT0"`).
    /// `None` = first entry whose `type` is `Battery`.
    pub device: Option<String>,
    /// Period of the sysfs change poller in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            device: None,
            poll_interval_ms: 5_000,
        }
    }
}
