use crate::PowerSupply;
use powerbar_core::{PowerEvent, Result};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Disposer returned by [`observe`].
///
/// [`dispose`](Self::dispose) consumes the handle, so it can only be called
/// once.  Dropping the handle disposes it as well.  Neither cancels a render
/// cycle that a callback has already started.
#[derive(Debug)]
pub struct Subscription {
    delivery: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivering change events to the callback.
    pub fn dispose(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.delivery.abort();
    }
}

/// Invoke `on_change` whenever the battery level or the time-to-empty
/// estimate changes, and once right away.
///
/// The immediate call receives `None` and happens before this function
/// returns, so a widget is never left blank waiting for the first event.
/// Subsequent calls receive the triggering event.  Other events
/// (charging state, time-to-full) are ignored.
pub async fn observe<F>(supply: &dyn PowerSupply, on_change: F) -> Result<Subscription>
where
    F: Fn(Option<PowerEvent>) + Send + Sync + 'static,
{
    let mut events = supply.subscribe().await?;
    let on_change = Arc::new(on_change);

    let callback = Arc::clone(&on_change);
    let delivery = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if event.triggers_render() => callback(Some(event)),
                Ok(event) => debug!("Ignoring {event}"),
                Err(RecvError::Lagged(missed)) => {
                    // Only the latest state matters; one refresh covers them all.
                    warn!("Missed {missed} power events");
                    callback(None);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    on_change(None);

    Ok(Subscription { delivery })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulatedBattery;
    use powerbar_core::state::BatteryState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<Option<PowerEvent>>>>, impl Fn(Option<PowerEvent>) + Send + Sync) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        (calls, move |event| sink.lock().unwrap().push(event))
    }

    #[tokio::test]
    async fn initial_call_happens_before_return() {
        let battery = SimulatedBattery::new(BatteryState::default());
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let _subscription = observe(&battery, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn level_and_discharging_events_are_delivered_once_each() {
        let battery = SimulatedBattery::new(BatteryState::default());
        let (calls, callback) = recorder();
        let _subscription = observe(&battery, callback).await.unwrap();

        battery.emit(PowerEvent::LevelChange);
        battery.emit(PowerEvent::ChargingChange);
        battery.emit(PowerEvent::DischargingTimeChange);
        battery.emit(PowerEvent::ChargingTimeChange);
        settle().await;

        assert_eq!(
            *calls.lock().unwrap(),
            [
                None,
                Some(PowerEvent::LevelChange),
                Some(PowerEvent::DischargingTimeChange),
            ]
        );
    }

    #[tokio::test]
    async fn dispose_stops_delivery() {
        let battery = SimulatedBattery::new(BatteryState::default());
        let (calls, callback) = recorder();
        let subscription = observe(&battery, callback).await.unwrap();

        battery.emit(PowerEvent::LevelChange);
        settle().await;
        assert_eq!(calls.lock().unwrap().len(), 2);

        subscription.dispose();
        settle().await;
        assert_eq!(battery.subscriber_count(), 0);

        battery.emit(PowerEvent::LevelChange);
        settle().await;
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unavailable_supply_fails_without_calling_back() {
        let battery = SimulatedBattery::new(BatteryState::default());
        battery.set_available(false);
        let (calls, callback) = recorder();

        let err = observe(&battery, callback).await.unwrap_err();
        assert!(err.is_capability_unavailable());
        assert!(calls.lock().unwrap().is_empty());
    }
}
