// ── Filter and sort over device snapshots ──
//
// Used by the CLI and TUI to derive the visible subset without touching
// the store. Every function here is pure: inputs are never mutated.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::model::{Device, DeviceStatus, DeviceType};

// ── Filters ──────────────────────────────────────────────────────────

/// Type filter. `All` disables it.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Router,
    Switch,
    Server,
}

impl TypeFilter {
    pub fn matches(self, kind: &DeviceType) -> bool {
        match self {
            Self::All => true,
            Self::Router => *kind == DeviceType::Router,
            Self::Switch => *kind == DeviceType::Switch,
            Self::Server => *kind == DeviceType::Server,
        }
    }

    /// The next filter in declaration order, wrapping around.
    pub fn cycle(self) -> Self {
        cycle_next(self)
    }
}

/// Status filter. `All` disables it.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Online,
    Offline,
    Unknown,
}

impl StatusFilter {
    pub fn matches(self, status: DeviceStatus) -> bool {
        match self {
            Self::All => true,
            Self::Online => status == DeviceStatus::Online,
            Self::Offline => status == DeviceStatus::Offline,
            Self::Unknown => status == DeviceStatus::Unknown,
        }
    }

    pub fn cycle(self) -> Self {
        cycle_next(self)
    }
}

/// Text, type and status criteria. All must hold for a device to match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFilter {
    /// Case-insensitive substring matched against name, IP, type and location.
    pub query: String,
    pub device_type: TypeFilter,
    pub status: StatusFilter,
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        self.device_type.matches(&device.device_type)
            && self.status.matches(device.status)
            && matches_text(device, &self.query.to_lowercase())
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.device_type != TypeFilter::All || self.status != StatusFilter::All
    }
}

fn matches_text(device: &Device, needle: &str) -> bool {
    needle.is_empty()
        || [
            device.name.as_str(),
            device.ip_address.as_str(),
            device.device_type.as_str(),
            device.location.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn cycle_next<T: IntoEnumIterator + PartialEq + Copy>(current: T) -> T {
    T::iter()
        .skip_while(|v| *v != current)
        .nth(1)
        .or_else(|| T::iter().next())
        .unwrap_or(current)
}

// ── Sorting ──────────────────────────────────────────────────────────

/// Column a device list can be ordered by.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    IpAddress,
    #[serde(rename = "type")]
    #[strum(to_string = "type")]
    Type,
    Location,
    Status,
}

impl SortKey {
    fn value(self, device: &Device) -> &str {
        match self {
            Self::Name => &device.name,
            Self::IpAddress => &device.ip_address,
            Self::Type => device.device_type.as_str(),
            Self::Location => &device.location,
            Self::Status => device.status.as_ref(),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Sort key plus direction. Defaults to name ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Same key flips direction; a different key starts ascending.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self::new(key, self.direction.reversed())
        } else {
            Self::new(key, SortDirection::Asc)
        }
    }

    fn compare(self, a: &Device, b: &Device) -> Ordering {
        let ord = self
            .key
            .value(a)
            .to_lowercase()
            .cmp(&self.key.value(b).to_lowercase());
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

// ── Apply ────────────────────────────────────────────────────────────

/// Filter then sort a snapshot. Equal keys keep their input order.
pub fn apply(devices: &[Arc<Device>], filter: &DeviceFilter, sort: SortSpec) -> Vec<Arc<Device>> {
    let mut visible: Vec<Arc<Device>> = devices
        .iter()
        .filter(|d| filter.matches(d))
        .cloned()
        .collect();
    visible.sort_by(|a, b| sort.compare(a, b));
    visible
}
