// ── Runtime store configuration ──
//
// Describes how to reach the device service. Built by the CLI/TUI from
// their config layer and handed in; core never reads config files.

use std::time::Duration;

use devman_api::{DEFAULT_BASE_URL, TransportConfig};

/// Default interval between background refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Configuration for a [`DeviceStore`](crate::DeviceStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API base URL (e.g. `http://localhost:3001/api/v1`).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Interval used by `start_polling` when none is given.
    pub poll_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: TransportConfig::default().timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl StoreConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(self.timeout)
    }
}
