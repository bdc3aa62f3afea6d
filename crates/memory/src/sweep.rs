use crate::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Shortest accepted sweep period
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(10);

/// Periodically drop sessions idle for longer than `timeout`
///
/// The first sweep runs one full `every` after spawning; periods below
/// [`MIN_SWEEP_PERIOD`] are raised to it. Each sweep (and the snapshot write
/// it may trigger) runs on the blocking pool. Abort the returned handle to
/// stop sweeping.
pub fn spawn_expiry_sweep(
    store: Arc<SessionStore>,
    every: Duration,
    timeout: chrono::Duration,
) -> JoinHandle<()> {
    let every = if every < MIN_SWEEP_PERIOD {
        log::warn!("Expiry sweep period {every:?} too short, using {MIN_SWEEP_PERIOD:?}");
        MIN_SWEEP_PERIOD
    } else {
        every
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let store = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || store.cleanup_expired(timeout)).await {
                Ok(0) => {}
                Ok(removed) => log::debug!("Expiry sweep removed {removed} sessions"),
                Err(err) => log::error!("Expiry sweep failed: {err}"),
            }
        }
    })
}
