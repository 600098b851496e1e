// ── Background polling ──
//
// Periodic refresh owned by the store. The task holds only a weak
// reference so dropping the last `DeviceStore` handle ends it.

use std::sync::Weak;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{DeviceStore, StoreInner};

/// Refresh immediately, then once per `interval` until cancelled or the
/// store is gone.
pub(super) async fn poll_task(
    store: Weak<StoreInner>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // A slow backend should not cause a burst of catch-up refreshes.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(inner) = store.upgrade() else { break };
                let store = DeviceStore { inner };
                if let Err(e) = store.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }

    debug!("poll task stopped");
}
