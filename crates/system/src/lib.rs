pub mod battery;
pub mod format;
pub mod observer;
pub mod sim;

pub use battery::SysfsBattery;
pub use format::{format_percentage, format_time, UNKNOWN_TIME};
pub use observer::{observe, Subscription};
pub use sim::SimulatedBattery;

use futures::future::BoxFuture;
use powerbar_config::BatteryConfig;
use powerbar_core::{
    state::{BatteryState, FormattedSummary, StateTag},
    PowerBarError, PowerEvent, Result,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Host power-supply capability: a status query plus change notifications.
///
/// Implementations must tolerate concurrent `status()` calls.
pub trait PowerSupply: Send + Sync {
    /// Query the current battery state.
    fn status(&self) -> BoxFuture<'_, Result<BatteryState>>;

    /// Register for change notifications.  Every call yields an independent
    /// receiver; dropping it unregisters.
    fn subscribe(&self) -> BoxFuture<'_, Result<broadcast::Receiver<PowerEvent>>>;
}

/// Capability stand-in for hosts without a battery (desktop, VM).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBattery;

impl PowerSupply for NoBattery {
    fn status(&self) -> BoxFuture<'_, Result<BatteryState>> {
        Box::pin(async { Err(no_battery()) })
    }

    fn subscribe(&self) -> BoxFuture<'_, Result<broadcast::Receiver<PowerEvent>>> {
        Box::pin(async { Err(no_battery()) })
    }
}

fn no_battery() -> PowerBarError {
    PowerBarError::CapabilityUnavailable("no power supply present".into())
}

/// Pick the sysfs battery if one can be found, otherwise [`NoBattery`].
pub fn detect(config: &BatteryConfig) -> Arc<dyn PowerSupply> {
    match SysfsBattery::discover(config) {
        Ok(battery) => {
            tracing::info!("Using power supply at {}", battery.path().display());
            Arc::new(battery)
        }
        Err(e) => {
            tracing::warn!("No usable battery: {e}");
            Arc::new(NoBattery)
        }
    }
}

/// Async accessors the widget renders from.
///
/// Each accessor queries the supply on its own, so they can be awaited
/// concurrently and combined.
#[derive(Clone)]
pub struct BatteryInfoSource {
    supply: Arc<dyn PowerSupply>,
}

impl BatteryInfoSource {
    pub fn new(supply: Arc<dyn PowerSupply>) -> Self {
        Self { supply }
    }

    pub fn supply(&self) -> &Arc<dyn PowerSupply> {
        &self.supply
    }

    /// Charge percentage (0 – 100), unrounded.
    pub async fn level(&self) -> Result<f64> {
        Ok(self.supply.status().await?.percentage())
    }

    /// `" until full"` or `" until empty"`.
    pub async fn charging_label(&self) -> Result<&'static str> {
        Ok(self.supply.status().await?.charging_suffix())
    }

    /// Formatted time until full (charging) or empty (discharging).
    pub async fn time_remaining(&self) -> Result<String> {
        Ok(format_time(self.supply.status().await?.active_time()))
    }

    /// Fetch all three accessors concurrently and build a summary.
    ///
    /// Fails as a whole if any accessor fails.
    pub async fn summary(&self) -> Result<FormattedSummary> {
        let (level, time_text, charging_suffix) =
            tokio::try_join!(self.level(), self.time_remaining(), self.charging_label())?;

        Ok(FormattedSummary {
            level,
            percentage_text: format_percentage(level),
            time_text,
            charging_suffix,
            state_tag: StateTag::classify(level),
        })
    }
}
