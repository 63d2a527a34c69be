//! powerbar: a battery indicator widget, hosted in a headless element tree.
//!
//! Run with:  `RUST_LOG=debug powerbar [--simulate]`

use anyhow::Result;
use powerbar_config::{ConfigWatcher, PowerBarConfig, SharedConfig};
use powerbar_core::state::BatteryState;
use powerbar_renderer::Node;
use powerbar_system::{PowerSupply, SimulatedBattery};
use powerbar_theme::{FileStylesheets, InlineStylesheets, StyleInjector, StylesheetSource};
use powerbar_widgets::BatteryWidget;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How often the demo host logs the rendered markup.
const DUMP_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("powerbar v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = powerbar_config::default_path();
    let config = powerbar_config::decorate_config(powerbar_config::load(&config_path)?);
    let shared = SharedConfig::new(config.clone());
    let _watcher = ConfigWatcher::spawn_reloader(&config_path, shared.clone());

    let supply: Arc<dyn PowerSupply> = if std::env::args().any(|arg| arg == "--simulate") {
        let battery = Arc::new(SimulatedBattery::new(BatteryState {
            level: 0.8,
            charging: false,
            charging_time: None,
            discharging_time: Some(4.0 * 3600.0),
        }));
        tokio::spawn(simulate_discharge(Arc::clone(&battery)));
        battery
    } else {
        powerbar_system::detect(&config.battery)
    };

    let styles = StyleInjector::new(stylesheets(&config, &config_path));
    let mut widget = BatteryWidget::new(supply, Arc::new(shared), styles);
    let root = Node::new("body");

    widget.mount(&root).await?;

    let mut ticker = tokio::time::interval(DUMP_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => info!("{}", root.to_markup()),
            res = &mut shutdown => {
                if let Err(e) = res {
                    warn!("Cannot listen for Ctrl-C: {e}");
                }
                break;
            }
        }
    }

    widget.unmount()?;
    info!("powerbar stopped");
    Ok(())
}

/// File-backed stylesheets, or an empty inline sheet when the configured
/// file does not exist.
fn stylesheets(config: &PowerBarConfig, config_path: &Path) -> Arc<dyn StylesheetSource> {
    let files = FileStylesheets::for_config(&config.style, config_path);
    let path = files.resolve(&config.style.stylesheet);

    if path.exists() {
        Arc::new(files)
    } else {
        warn!("Stylesheet '{}' not found; using an empty one.", path.display());
        Arc::new(InlineStylesheets::new().with(config.style.stylesheet.clone(), ""))
    }
}

/// Drain the simulated battery, plug it in near empty and unplug it when full.
async fn simulate_discharge(battery: Arc<SimulatedBattery>) {
    const STEP: f64 = 0.01;
    let mut ticker = tokio::time::interval(Duration::from_secs(2));

    loop {
        ticker.tick().await;
        let mut state = battery.state();

        if state.charging {
            state.level = (state.level + STEP).min(1.0);
        } else {
            state.level = (state.level - STEP).max(0.0);
        }

        if state.level <= 0.05 {
            state.charging = true;
        } else if state.level >= 1.0 {
            state.charging = false;
        }

        // One percent every two seconds in either direction.
        let remaining = if state.charging { 1.0 - state.level } else { state.level };
        let seconds = remaining / STEP * 2.0;
        state.charging_time    = state.charging.then_some(seconds);
        state.discharging_time = (!state.charging).then_some(seconds);

        battery.set_state(state);
    }
}
