//! Data bridge: connects [`DeviceStore`] observation channels to TUI actions.
//!
//! Runs as a background task. Sends the current snapshot, availability and
//! loading state once, then forwards every change as an [`Action`] until
//! cancelled.

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use devman_core::DeviceStore;

use crate::action::Action;

pub async fn spawn_data_bridge(
    store: DeviceStore,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut devices = store.devices();
    let mut available = store.availability();
    let mut loading = store.loading();
    let mut notifications = store.notifications();

    // Initial state so the first frame is not blank.
    let _ = action_tx.send(Action::DevicesUpdated(devices.current().clone()));
    let _ = action_tx.send(Action::AvailabilityChanged(*available.borrow_and_update()));
    let _ = action_tx.send(Action::LoadingChanged(*loading.borrow_and_update()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = devices.changed() => {
                debug!(count = snapshot.len(), "dispatching DevicesUpdated");
                let _ = action_tx.send(Action::DevicesUpdated(snapshot));
            }
            Ok(()) = available.changed() => {
                let up = *available.borrow_and_update();
                debug!(available = up, "dispatching AvailabilityChanged");
                let _ = action_tx.send(Action::AvailabilityChanged(up));
            }
            Ok(()) = loading.changed() => {
                let busy = *loading.borrow_and_update();
                let _ = action_tx.send(Action::LoadingChanged(busy));
            }
            result = notifications.recv() => match result {
                Ok(notification) => {
                    let _ = action_tx.send(Action::Notify(notification));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    debug!("data bridge shut down");
}
