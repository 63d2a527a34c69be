pub mod battery;

pub use battery::BatteryWidget;

use powerbar_core::{PowerEvent, Result};
use powerbar_renderer::{Node, WidgetElements};
use powerbar_system::{observe, PowerSupply, Subscription};
use std::sync::Arc;

/// Battery building blocks handed to a host that composes several widgets.
#[derive(Clone)]
pub struct BatteryCapabilities {
    supply: Arc<dyn PowerSupply>,
}

impl BatteryCapabilities {
    pub fn new(supply: Arc<dyn PowerSupply>) -> Self {
        Self { supply }
    }

    /// Build the widget's container, label and indicator under `root`.
    pub fn create_elements(&self, root: &Node) -> WidgetElements {
        WidgetElements::create(root)
    }

    /// Run `callback` now and on every level / time-to-empty change.
    pub async fn observe_battery_change<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn(Option<PowerEvent>) + Send + Sync + 'static,
    {
        observe(self.supply.as_ref(), callback).await
    }
}

/// Host props extended with the battery capabilities.
#[derive(Clone)]
pub struct HostProps<P> {
    pub inner:   P,
    pub battery: BatteryCapabilities,
}

/// Inject [`BatteryCapabilities`] into a host's props, leaving the rest
/// untouched.
pub fn map_host_state<P>(props: P, supply: Arc<dyn PowerSupply>) -> HostProps<P> {
    HostProps {
        inner:   props,
        battery: BatteryCapabilities::new(supply),
    }
}
