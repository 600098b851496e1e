// ── Domain model ──
//
// Canonical types shared by the store, query and validation layers.
// Wire types from `devman-api` are converted into these in `convert.rs`.

mod device;
mod device_id;

pub use device::{Device, DeviceStatus, DeviceType};
pub use device_id::DeviceId;
