// ── Device store ──
//
// Owns the in-memory device collection, the availability flag and the
// polling task. Every operation reports its outcome both as a
// `Notification` and as a `Result`.

mod collection;
mod refresh;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use devman_api::{ApiClient, DeviceWrite};

use self::collection::DeviceCollection;
use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::model::{Device, DeviceId, DeviceStatus};
use crate::notify::Notification;
use crate::stream::{DeviceSnapshot, DeviceStream};
use crate::validate::DeviceInput;

const NOTIFICATION_CHANNEL_SIZE: usize = 64;

/// Client-side cache of the device inventory.
///
/// Cheaply cloneable via `Arc<StoreInner>`. The polling task is cancelled
/// on [`shutdown()`](Self::shutdown) or when the last handle is dropped.
#[derive(Clone)]
pub struct DeviceStore {
    inner: Arc<StoreInner>,
}

pub(crate) struct StoreInner {
    config: StoreConfig,
    api: ApiClient,
    devices: DeviceCollection,
    available: watch::Sender<bool>,
    in_flight: watch::Sender<usize>,
    loading: watch::Sender<bool>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    notify_tx: broadcast::Sender<Notification>,
    poller: Mutex<Option<Poller>>,
    shutdown: CancellationToken,
}

struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl DeviceStore {
    /// Build a store and its HTTP client from configuration. No request is
    /// made until [`refresh()`](Self::refresh) or polling starts.
    pub fn new(config: StoreConfig) -> Result<Self, CoreError> {
        let api = ApiClient::new(&config.base_url, &config.transport())?;
        Ok(Self::with_client(api, config))
    }

    /// Build a store around an existing API client.
    pub fn with_client(api: ApiClient, config: StoreConfig) -> Self {
        let (available, _) = watch::channel(true);
        let (in_flight, _) = watch::channel(0);
        let (loading, _) = watch::channel(false);
        let (last_refresh, _) = watch::channel(None);
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);

        Self {
            inner: Arc::new(StoreInner {
                config,
                api,
                devices: DeviceCollection::new(),
                available,
                in_flight,
                loading,
                last_refresh,
                notify_tx,
                poller: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// The resolved API base URL.
    pub fn base_url(&self) -> &str {
        self.inner.api.base_url()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the full device list and replace the collection.
    ///
    /// On failure the collection is kept, the store is marked unavailable
    /// and the error is both notified and returned. Returns the number of
    /// devices loaded.
    pub async fn refresh(&self) -> Result<usize, CoreError> {
        let _busy = FetchGuard::new(&self.inner);

        match self.inner.api.list_devices().await {
            Ok(records) => {
                let devices: Vec<Device> = records.into_iter().map(Device::from).collect();
                let count = devices.len();
                self.inner.devices.replace_all(devices);
                self.inner.last_refresh.send_replace(Some(Utc::now()));
                self.set_available(true);
                debug!(count, "devices refreshed");
                Ok(count)
            }
            Err(e) => {
                warn!(status = ?e.status(), no_response = e.is_transport(), "refresh failed");
                self.set_available(false);
                Err(self.fail(e, "Failed to load devices"))
            }
        }
    }

    /// Create a device and put it at the front of the collection.
    pub async fn create(&self, input: &DeviceInput) -> Result<Device, CoreError> {
        self.ensure_available()?;

        let record = self
            .inner
            .api
            .create_device(&DeviceWrite::from(input))
            .await
            .map_err(|e| self.fail(e, "Failed to create device"))?;

        let device = Device::from(record);
        self.inner.devices.prepend(device.clone());
        self.notify(Notification::success("Device created"));
        Ok(device)
    }

    /// Update a device and replace the matching local record in place.
    ///
    /// If the device is not in the local collection the server response
    /// is returned but the collection is left untouched.
    pub async fn update(&self, id: &DeviceId, input: &DeviceInput) -> Result<Device, CoreError> {
        self.ensure_available()?;

        let record = self
            .inner
            .api
            .update_device(id.as_str(), &DeviceWrite::from(input))
            .await
            .map_err(|e| self.fail(e, "Failed to update device"))?;

        let device = Device::from(record);
        if !self.inner.devices.replace(id, device.clone()) {
            debug!(%id, "updated device not in local collection");
        }
        self.notify(Notification::success("Device updated"));
        Ok(device)
    }

    /// Delete a device and drop it from the collection.
    pub async fn delete(&self, id: &DeviceId) -> Result<(), CoreError> {
        self.ensure_available()?;

        self.inner
            .api
            .delete_device(id.as_str())
            .await
            .map_err(|e| self.fail(e, "Failed to delete device"))?;

        self.inner.devices.remove(id);
        self.notify(Notification::success("Device deleted"));
        Ok(())
    }

    /// Ask the backend for a device's live status and patch only that
    /// field locally. Allowed while unavailable since it is a read.
    pub async fn check_status(&self, id: &DeviceId) -> Result<DeviceStatus, CoreError> {
        let report = self
            .inner
            .api
            .device_status(id.as_str())
            .await
            .map_err(|e| self.fail(e, "Status check failed"))?;

        let status = DeviceStatus::from_wire(report.status.as_deref());
        self.inner.devices.set_status(id, status);
        self.notify(Notification::success(format!("Status: {status}")));
        Ok(status)
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Start refreshing every `interval`, beginning immediately.
    ///
    /// Replaces any running poll task. Must be called from within a tokio
    /// runtime.
    pub fn start_polling(&self, interval: Duration) {
        // `tokio::time::interval` panics on zero.
        let interval = interval.max(Duration::from_millis(1));
        let cancel = self.inner.shutdown.child_token();
        let handle = tokio::spawn(refresh::poll_task(
            Arc::downgrade(&self.inner),
            interval,
            cancel.clone(),
        ));

        let previous = self.lock_poller().replace(Poller { cancel, handle });
        if let Some(previous) = previous {
            previous.cancel.cancel();
            debug!("replaced running poll task");
        }
        info!(interval_ms = interval.as_millis(), "polling started");
    }

    /// Stop the poll task. Returns `false` if none was running.
    pub fn stop_polling(&self) -> bool {
        let Some(poller) = self.lock_poller().take() else {
            return false;
        };
        poller.cancel.cancel();
        info!("polling stopped");
        true
    }

    pub fn is_polling(&self) -> bool {
        self.lock_poller()
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Stop polling and cancel every task tied to this store.
    pub fn shutdown(&self) {
        self.stop_polling();
        self.inner.shutdown.cancel();
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Subscribe to the device collection.
    pub fn devices(&self) -> DeviceStream {
        DeviceStream::new(self.inner.devices.subscribe())
    }

    /// Current collection (cheap `Arc` clone).
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.inner.devices.snapshot()
    }

    pub fn device(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.inner.devices.get(id)
    }

    /// `false` while the most recent fetch failed.
    pub fn availability(&self) -> watch::Receiver<bool> {
        self.inner.available.subscribe()
    }

    pub fn is_available(&self) -> bool {
        *self.inner.available.borrow()
    }

    /// `true` while at least one fetch is in flight.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refresh.borrow()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notify_tx.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn ensure_available(&self) -> Result<(), CoreError> {
        if self.is_available() {
            return Ok(());
        }
        let err = CoreError::BackendUnavailable;
        debug!("write rejected: backend unavailable");
        self.notify(Notification::error(err.to_string()));
        Err(err)
    }

    fn set_available(&self, available: bool) {
        let changed = self.inner.available.send_if_modified(|current| {
            let changed = *current != available;
            *current = available;
            changed
        });
        if changed {
            if available {
                info!("device service available again");
            } else {
                warn!("device service unavailable; writes disabled");
            }
        }
    }

    /// Notify an error and convert it for the caller.
    fn fail(&self, err: impl Into<CoreError>, fallback: &str) -> CoreError {
        let err = err.into();
        let message = err.to_string();
        let message = if message.is_empty() {
            fallback.to_owned()
        } else {
            message
        };
        self.notify(Notification::error(message));
        err
    }

    fn notify(&self, notification: Notification) {
        // No subscribers is fine.
        let _ = self.inner.notify_tx.send(notification);
    }

    fn lock_poller(&self) -> std::sync::MutexGuard<'_, Option<Poller>> {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a fetch as in flight for as long as it lives.
struct FetchGuard<'a> {
    inner: &'a StoreInner,
}

impl<'a> FetchGuard<'a> {
    fn new(inner: &'a StoreInner) -> Self {
        inner.adjust_in_flight(true);
        Self { inner }
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.inner.adjust_in_flight(false);
    }
}

impl StoreInner {
    fn adjust_in_flight(&self, start: bool) {
        self.in_flight.send_modify(|count| {
            *count = if start {
                *count + 1
            } else {
                count.saturating_sub(1)
            };
            let busy = *count > 0;
            self.loading.send_if_modified(|loading| {
                let changed = *loading != busy;
                *loading = busy;
                changed
            });
        });
    }
}
