// devman-api: Async Rust client for a JSON REST device inventory API

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{ApiClient, DEFAULT_BASE_URL, resolve_base_url};
pub use error::Error;
pub use models::{DeviceRecord, DeviceStatusReport, DeviceWrite};
pub use transport::TransportConfig;
