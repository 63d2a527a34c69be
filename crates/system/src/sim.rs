use crate::PowerSupply;
use futures::future::BoxFuture;
use powerbar_core::{state::BatteryState, PowerBarError, PowerEvent, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

/// In-memory power supply driven by hand.
///
/// Used by the test suites and by `powerbar --simulate`.
#[derive(Debug)]
pub struct SimulatedBattery {
    state:     Mutex<BatteryState>,
    available: AtomicBool,
    queries:   AtomicUsize,
    events:    broadcast::Sender<PowerEvent>,
}

impl SimulatedBattery {
    pub fn new(state: BatteryState) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(state),
            available: AtomicBool::new(true),
            queries: AtomicUsize::new(0),
            events,
        }
    }

    /// Current simulated reading.
    pub fn state(&self) -> BatteryState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the reading and broadcast one event per changed field.
    pub fn set_state(&self, next: BatteryState) {
        let previous = std::mem::replace(
            &mut *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            next,
        );
        for event in next.changes_from(&previous) {
            self.emit(event);
        }
    }

    /// Broadcast `event` without touching the reading.
    pub fn emit(&self, event: PowerEvent) {
        // No receivers is fine: nobody is observing yet.
        let _ = self.events.send(event);
    }

    /// Toggle whether queries succeed.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of `status()` calls served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PowerBarError::CapabilityUnavailable(
                "simulated supply disabled".into(),
            ))
        }
    }
}

impl PowerSupply for SimulatedBattery {
    fn status(&self) -> BoxFuture<'_, Result<BatteryState>> {
        Box::pin(async move {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            Ok(self.state())
        })
    }

    fn subscribe(&self) -> BoxFuture<'_, Result<broadcast::Receiver<PowerEvent>>> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self.events.subscribe())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_state_broadcasts_changed_fields() {
        let battery = SimulatedBattery::new(BatteryState::default());
        let mut rx = battery.subscribe().await.unwrap();

        battery.set_state(BatteryState {
            level: 0.9,
            ..BatteryState::default()
        });

        assert_eq!(rx.recv().await.unwrap(), PowerEvent::LevelChange);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn disabled_supply_refuses_queries_and_subscriptions() {
        let battery = SimulatedBattery::new(BatteryState::default());
        battery.set_available(false);

        assert!(battery.status().await.is_err());
        assert!(battery.subscribe().await.is_err());
        assert_eq!(battery.query_count(), 1);
    }
}
