// ── Device domain types ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

use super::device_id::DeviceId;

/// Kind of network device.
///
/// Unrecognised strings from the backend are preserved in `Other` so the
/// listing never drops a record; user input can only pick the three known
/// kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DeviceType {
    Router,
    Switch,
    Server,
    Other(String),
}

impl DeviceType {
    /// The kinds a user may assign.
    pub const KNOWN: [Self; 3] = [Self::Router, Self::Switch, Self::Server];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Router => "router",
            Self::Switch => "switch",
            Self::Server => "server",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DeviceType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "router" => Self::Router,
            "switch" => Self::Switch,
            "server" => Self::Server,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for DeviceType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<DeviceType> for String {
    fn from(kind: DeviceType) -> Self {
        match kind {
            DeviceType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

/// Reachability as last reported by the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl DeviceStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }

    /// Parse a backend status string. Missing or unrecognised values are
    /// `Unknown`.
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|s| Self::from_str(s).ok())
            .unwrap_or_default()
    }

    /// Statuses a user may assign (`unknown` is backend-only).
    pub fn settable() -> impl Iterator<Item = Self> {
        Self::iter().filter(|s| *s != Self::Unknown)
    }
}

/// A network device managed by the inventory backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub ip_address: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub location: String,
    pub status: DeviceStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn device_type_round_trips_known_and_unknown() {
        assert_eq!(DeviceType::from("switch"), DeviceType::Switch);
        let odd = DeviceType::from("firewall");
        assert_eq!(odd, DeviceType::Other("firewall".into()));
        assert_eq!(odd.to_string(), "firewall");
        assert!(!odd.is_known());
        assert_eq!(String::from(DeviceType::Server), "server");
    }

    #[test]
    fn status_from_wire_defaults_to_unknown() {
        assert_eq!(DeviceStatus::from_wire(Some("online")), DeviceStatus::Online);
        assert_eq!(DeviceStatus::from_wire(Some("rebooting")), DeviceStatus::Unknown);
        assert_eq!(DeviceStatus::from_wire(None), DeviceStatus::Unknown);
    }

    #[test]
    fn unknown_is_not_settable() {
        let settable: Vec<_> = DeviceStatus::settable().collect();
        assert_eq!(settable, vec![DeviceStatus::Online, DeviceStatus::Offline]);
    }

    #[test]
    fn device_serializes_with_wire_keys() {
        let device = Device {
            id: DeviceId::from("7"),
            name: "core".into(),
            ip_address: "10.0.0.1".into(),
            device_type: DeviceType::Router,
            location: "DC".into(),
            status: DeviceStatus::Online,
        };
        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(value["id"], "7");
        assert_eq!(value["type"], "router");
        assert_eq!(value["status"], "online");
    }
}
