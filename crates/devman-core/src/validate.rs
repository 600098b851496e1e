// ── Device form validation ──
//
// Checks raw, string-typed input before it is sent to the backend. All
// rules run on every call so callers can show every problem at once.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Device, DeviceStatus, DeviceType};

/// A field of the device form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Name,
    IpAddress,
    #[serde(rename = "type")]
    #[strum(to_string = "type")]
    Type,
    Location,
    Status,
}

/// Error messages keyed by field. Empty means the draft is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Drop the message for `field`, e.g. once the user edits it.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_owned());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Raw form input for creating or editing a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDraft {
    pub name: String,
    pub ip_address: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub location: String,
    pub status: String,
}

impl Default for DeviceDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            ip_address: String::new(),
            device_type: DeviceType::Router.to_string(),
            location: String::new(),
            status: DeviceStatus::Offline.to_string(),
        }
    }
}

impl DeviceDraft {
    /// Seed an edit form from an existing device.
    pub fn from_device(device: &Device) -> Self {
        Self {
            name: device.name.clone(),
            ip_address: device.ip_address.clone(),
            device_type: device.device_type.to_string(),
            location: device.location.clone(),
            status: device.status.to_string(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::IpAddress => &self.ip_address,
            Field::Type => &self.device_type,
            Field::Location => &self.location,
            Field::Status => &self.status,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::IpAddress => &mut self.ip_address,
            Field::Type => &mut self.device_type,
            Field::Location => &mut self.location,
            Field::Status => &mut self.status,
        }
    }

    /// Validate and convert into a typed payload.
    pub fn into_input(self) -> Result<DeviceInput, CoreError> {
        let errors = validate(&self);
        if !errors.is_empty() {
            return Err(CoreError::ValidationFailed(errors));
        }
        let status = match self.status.as_str() {
            "online" => DeviceStatus::Online,
            _ => DeviceStatus::Offline,
        };
        Ok(DeviceInput {
            name: self.name,
            ip_address: self.ip_address,
            device_type: DeviceType::from(self.device_type),
            location: self.location,
            status,
        })
    }
}

/// A validated create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInput {
    pub name: String,
    pub ip_address: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub location: String,
    pub status: DeviceStatus,
}

/// Check every rule against `draft`.
pub fn validate(draft: &DeviceDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if draft.name.is_empty() {
        errors.insert(Field::Name, "Name is required");
    }
    if draft.ip_address.is_empty() {
        errors.insert(Field::IpAddress, "IP address is required");
    } else if !is_ipv4(&draft.ip_address) {
        errors.insert(Field::IpAddress, "Invalid IPv4 address");
    }
    if !DeviceType::from(draft.device_type.as_str()).is_known() {
        errors.insert(Field::Type, "Type must be router, switch, or server");
    }
    if draft.location.is_empty() {
        errors.insert(Field::Location, "Location is required");
    }
    if !matches!(draft.status.as_str(), "online" | "offline") {
        errors.insert(Field::Status, "Status must be online or offline");
    }

    errors
}

/// Dotted-quad IPv4: four groups of 1–3 digits, each in `0..=255`.
///
/// A three-digit group may not start with `0`; one- and two-digit groups
/// are taken as written (`00`, `07`).
pub fn is_ipv4(value: &str) -> bool {
    let mut groups = 0;
    for part in value.split('.') {
        groups += 1;
        let well_formed = (1..=3).contains(&part.len())
            && part.bytes().all(|b| b.is_ascii_digit())
            && !(part.len() == 3 && part.starts_with('0'));
        if !well_formed || !part.parse::<u16>().is_ok_and(|n| n <= 255) {
            return false;
        }
    }
    groups == 4
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceId;

    fn valid_draft() -> DeviceDraft {
        DeviceDraft {
            name: "core-rtr".into(),
            ip_address: "192.168.0.1".into(),
            device_type: "router".into(),
            location: "DC1".into(),
            status: "online".into(),
        }
    }

    #[test]
    fn ipv4_accepts_dotted_quads() {
        assert!(is_ipv4("192.168.0.1"));
        assert!(is_ipv4("0.0.0.0"));
        assert!(is_ipv4("255.255.255.255"));
        assert!(is_ipv4("00.07.0.1"));
    }

    #[test]
    fn ipv4_rejects_zero_padded_three_digit_groups() {
        for bad in ["10.001.0.1", "010.0.0.1", "1.2.3.000"] {
            assert!(!is_ipv4(bad), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn ipv4_rejects_out_of_range_and_malformed() {
        for bad in [
            "256.1.1.1",
            "1.2.3",
            "1.2.3.4.5",
            "1..2.3",
            "a.b.c.d",
            "1.2.3.0400",
            " 1.2.3.4",
            "1.2.3.-4",
            "",
        ] {
            assert!(!is_ipv4(bad), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn valid_draft_has_no_errors() {
        assert!(validate(&valid_draft()).is_empty());
    }

    #[test]
    fn empty_draft_reports_every_field() {
        let draft = DeviceDraft {
            name: String::new(),
            ip_address: String::new(),
            device_type: String::new(),
            location: String::new(),
            status: String::new(),
        };
        let errors = validate(&draft);

        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get(Field::Name), Some("Name is required"));
        assert_eq!(errors.get(Field::IpAddress), Some("IP address is required"));
        assert_eq!(
            errors.get(Field::Type),
            Some("Type must be router, switch, or server")
        );
        assert_eq!(errors.get(Field::Location), Some("Location is required"));
        assert_eq!(
            errors.get(Field::Status),
            Some("Status must be online or offline")
        );
    }

    #[test]
    fn bad_ip_is_reported_as_invalid() {
        let draft = DeviceDraft {
            ip_address: "300.1.1.1".into(),
            ..valid_draft()
        };
        let errors = validate(&draft);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::IpAddress), Some("Invalid IPv4 address"));
    }

    #[test]
    fn unknown_status_is_not_user_settable() {
        let draft = DeviceDraft {
            status: "unknown".into(),
            ..valid_draft()
        };
        assert!(validate(&draft).get(Field::Status).is_some());
    }

    #[test]
    fn new_draft_defaults() {
        let draft = DeviceDraft::default();
        assert_eq!(draft.device_type, "router");
        assert_eq!(draft.status, "offline");
    }

    #[test]
    fn into_input_types_the_payload() {
        let input = valid_draft().into_input().expect("draft is valid");
        assert_eq!(input.device_type, DeviceType::Router);
        assert_eq!(input.status, DeviceStatus::Online);

        let Err(CoreError::ValidationFailed(errors)) = DeviceDraft::default().into_input() else {
            panic!("empty draft must fail validation");
        };
        assert!(errors.get(Field::Name).is_some());
        assert_eq!(
            errors.to_string(),
            "name: Name is required; ip_address: IP address is required; location: Location is required"
        );
    }

    #[test]
    fn edit_draft_is_seeded_from_device() {
        let device = Device {
            id: DeviceId::from("4"),
            name: "sw".into(),
            ip_address: "10.0.0.4".into(),
            device_type: DeviceType::Switch,
            location: "Lab".into(),
            status: DeviceStatus::Unknown,
        };
        let draft = DeviceDraft::from_device(&device);
        assert_eq!(draft.device_type, "switch");
        assert_eq!(draft.status, "unknown");
        assert!(validate(&draft).get(Field::Status).is_some());
    }
}
