use crate::PowerSupply;
use futures::future::BoxFuture;
use powerbar_config::BatteryConfig;
use powerbar_core::{state::BatteryState, PowerBarError, PowerEvent, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

/// Where Linux exposes power supplies.
pub const SYSFS_POWER_SUPPLY: &str = "/sys/class/power_supply";

/// Battery read from the Linux sysfs power-supply interface.
///
/// Change notifications come from a background poller that is started on the
/// first subscription and stops once every receiver has been dropped.
#[derive(Debug)]
pub struct SysfsBattery {
    path:     PathBuf,
    interval: Duration,
    events:   broadcast::Sender<PowerEvent>,
    poller:   Mutex<Option<JoinHandle<()>>>,
}

impl SysfsBattery {
    /// Find the configured device, or the first entry whose `type` is
    /// `Battery`, under [`SYSFS_POWER_SUPPLY`].
    pub fn discover(config: &BatteryConfig) -> Result<Self> {
        Self::discover_in(Path::new(SYSFS_POWER_SUPPLY), config)
    }

    /// Like [`discover`](Self::discover) but rooted at `root`.
    pub fn discover_in(root: &Path, config: &BatteryConfig) -> Result<Self> {
        let interval = Duration::from_millis(config.poll_interval_ms.max(1));

        if let Some(device) = &config.device {
            let path = root.join(device);
            if !path.is_dir() {
                return Err(PowerBarError::CapabilityUnavailable(format!(
                    "power supply '{}' not found",
                    path.display()
                )));
            }
            return Ok(Self::with_path(path, interval));
        }

        let entries = std::fs::read_dir(root).map_err(|e| {
            PowerBarError::CapabilityUnavailable(format!("cannot list '{}': {e}", root.display()))
        })?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .find(|path| {
                std::fs::read_to_string(path.join("type"))
                    .is_ok_and(|kind| kind.trim() == "Battery")
            })
            .map(|path| Self::with_path(path, interval))
            .ok_or_else(|| {
                PowerBarError::CapabilityUnavailable(format!(
                    "no battery found under '{}'",
                    root.display()
                ))
            })
    }

    pub fn with_path(path: PathBuf, interval: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            path,
            interval,
            events,
            poller: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_poller(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if poller.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let path = self.path.clone();
        let tx = self.events.clone();
        let interval = self.interval;

        *poller = Some(tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            let mut last: Option<BatteryState> = None;

            loop {
                ticker.tick().await;
                if tx.receiver_count() == 0 {
                    break; // all subscribers gone
                }

                match read_state(&path).await {
                    Ok(state) => {
                        if let Some(previous) = last {
                            for event in state.changes_from(&previous) {
                                debug!("{} reported {event}", path.display());
                                let _ = tx.send(event);
                            }
                        }
                        last = Some(state);
                    }
                    Err(e) => debug!("Battery poll failed: {e}"),
                }
            }
        }));
    }
}

impl Drop for SysfsBattery {
    fn drop(&mut self) {
        let poller = self.poller.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = poller.take() {
            task.abort();
        }
    }
}

impl PowerSupply for SysfsBattery {
    fn status(&self) -> BoxFuture<'_, Result<BatteryState>> {
        Box::pin(read_state(&self.path))
    }

    fn subscribe(&self) -> BoxFuture<'_, Result<broadcast::Receiver<PowerEvent>>> {
        Box::pin(async move {
            if !self.path.is_dir() {
                return Err(PowerBarError::CapabilityUnavailable(format!(
                    "power supply '{}' disappeared",
                    self.path.display()
                )));
            }
            // Receiver first, so the poller never sees zero subscribers.
            let rx = self.events.subscribe();
            self.ensure_poller();
            Ok(rx)
        })
    }
}

/// Raw attribute values of one power-supply directory.
///
/// Energy attributes are in µWh / µW; batteries that only report charge use
/// µAh / µA instead.  Either pair works for the ratios computed here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SysfsReadings {
    pub capacity: Option<f64>,
    pub status:   Option<String>,
    pub now:      Option<f64>,
    pub full:     Option<f64>,
    pub rate:     Option<f64>,
}

impl SysfsReadings {
    /// Convert raw readings into a [`BatteryState`].
    ///
    /// `capacity` wins over `now / full` for the level.  Time estimates are
    /// only produced when the supply reports a non-zero rate.
    pub fn into_state(self) -> Option<BatteryState> {
        let level = match (self.capacity, self.now, self.full) {
            (Some(capacity), _, _) => capacity / 100.0,
            (None, Some(now), Some(full)) if full > 0.0 => now / full,
            _ => return None,
        }
        .clamp(0.0, 1.0);

        let status = self.status.as_deref().unwrap_or("Unknown");
        let full_now = status == "Full";
        let charging = matches!(status, "Charging" | "Full");

        let rate = self.rate.filter(|r| *r > 0.0);
        let seconds_at_rate = |amount: f64| rate.map(|r| amount.max(0.0) / r * 3600.0);

        let (charging_time, discharging_time) = if full_now {
            (Some(0.0), None)
        } else if charging {
            let missing = match (self.now, self.full) {
                (Some(now), Some(full)) => Some(full - now),
                _ => None,
            };
            (missing.and_then(seconds_at_rate), None)
        } else {
            (None, self.now.and_then(seconds_at_rate))
        };

        Some(BatteryState {
            level,
            charging,
            charging_time,
            discharging_time,
        })
    }
}

async fn read_attr(dir: &Path, name: &str) -> Option<String> {
    tokio::fs::read_to_string(dir.join(name))
        .await
        .ok()
        .map(|raw| raw.trim().to_string())
}

async fn read_number(dir: &Path, names: &[&str]) -> Option<f64> {
    for name in names {
        if let Some(value) = read_attr(dir, name).await.and_then(|v| v.parse().ok()) {
            return Some(value);
        }
    }
    None
}

/// Read and convert one power-supply directory.
pub async fn read_state(dir: &Path) -> Result<BatteryState> {
    let readings = SysfsReadings {
        capacity: read_number(dir, &["capacity"]).await,
        status:   read_attr(dir, "status").await,
        now:      read_number(dir, &["energy_now", "charge_now"]).await,
        full:     read_number(dir, &["energy_full", "charge_full"]).await,
        rate:     read_number(dir, &["power_now", "current_now"]).await,
    };

    readings.into_state().ok_or_else(|| {
        PowerBarError::CapabilityUnavailable(format!(
            "cannot read charge level from '{}'",
            dir.display()
        ))
    })
}
