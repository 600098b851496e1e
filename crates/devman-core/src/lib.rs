//! Client-side data layer between `devman-api` and UI consumers (CLI / TUI).
//!
//! - **[`DeviceStore`]** caches the device inventory in a `watch` channel,
//!   tracks backend availability, gates writes on it, and owns an optional
//!   cancellable polling task.
//!
//! - **[`DeviceStream`]** is the subscription handle vended by the store.
//!   Exposes `current()` / `latest()` / `changed()` for reactive rendering.
//!
//! - **[`query`]** filters and sorts snapshots without touching the store.
//!
//! - **[`validate`]** checks raw form input and turns it into a typed
//!   [`DeviceInput`].
//!
//! - **Domain model** ([`model`]): [`Device`], [`DeviceId`], [`DeviceType`],
//!   [`DeviceStatus`].

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod notify;
pub mod query;
pub mod store;
pub mod stream;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_POLL_INTERVAL, StoreConfig};
pub use error::CoreError;
pub use model::{Device, DeviceId, DeviceStatus, DeviceType};
pub use notify::{Notification, NotificationLevel};
pub use query::{DeviceFilter, SortDirection, SortKey, SortSpec, StatusFilter, TypeFilter};
pub use store::DeviceStore;
pub use stream::{DeviceSnapshot, DeviceStream};
pub use validate::{DeviceDraft, DeviceInput, Field, ValidationErrors, is_ipv4};
