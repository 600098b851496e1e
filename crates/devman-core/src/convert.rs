// ── API-to-domain type conversions ──
//
// Bridges raw `devman_api` wire types into canonical `devman_core::model`
// types and back. Missing status becomes `Unknown`; unrecognised device
// types are preserved verbatim.

use devman_api::{DeviceRecord, DeviceWrite};

use crate::model::{Device, DeviceId, DeviceStatus, DeviceType};
use crate::validate::DeviceInput;

impl From<DeviceRecord> for Device {
    fn from(record: DeviceRecord) -> Self {
        Self {
            id: DeviceId::from(record.id),
            name: record.name,
            ip_address: record.ip_address,
            device_type: DeviceType::from(record.device_type),
            location: record.location,
            status: DeviceStatus::from_wire(record.status.as_deref()),
        }
    }
}

impl From<&DeviceInput> for DeviceWrite {
    fn from(input: &DeviceInput) -> Self {
        Self {
            name: input.name.clone(),
            ip_address: input.ip_address.clone(),
            device_type: input.device_type.to_string(),
            location: input.location.clone(),
            status: input.status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: Option<&str>, kind: &str) -> DeviceRecord {
        DeviceRecord {
            id: "12".into(),
            name: "dist-sw".into(),
            ip_address: "10.1.0.2".into(),
            device_type: kind.into(),
            location: "Floor 2".into(),
            status: status.map(str::to_owned),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn record_without_status_is_unknown() {
        let device = Device::from(record(None, "switch"));
        assert_eq!(device.status, DeviceStatus::Unknown);
        assert_eq!(device.device_type, DeviceType::Switch);
        assert_eq!(device.id.as_str(), "12");
    }

    #[test]
    fn unrecognised_type_is_preserved() {
        let device = Device::from(record(Some("online"), "load-balancer"));
        assert_eq!(device.device_type, DeviceType::Other("load-balancer".into()));
        assert!(device.status.is_online());
    }

    #[test]
    fn input_becomes_wire_strings() {
        let input = DeviceInput {
            name: "srv".into(),
            ip_address: "10.0.0.9".into(),
            device_type: DeviceType::Server,
            location: "DC".into(),
            status: DeviceStatus::Offline,
        };
        let body = DeviceWrite::from(&input);
        assert_eq!(body.device_type, "server");
        assert_eq!(body.status, "offline");
    }
}
