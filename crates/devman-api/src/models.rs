// Device inventory wire types
//
// Shapes exchanged with the REST backend. Decoding is lenient: ids may be
// strings or numbers, text fields may be null or missing, and unknown
// fields are kept in `extra` so nothing the server sends is lost.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Device ───────────────────────────────────────────────────────────

/// A device record as returned by `GET /devices` and the write endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ip_address: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub device_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    /// `None` when the backend has not reported a status yet.
    #[serde(default)]
    pub status: Option<String>,
    /// Catch-all for fields the client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Body for `POST /devices` and `PUT /devices/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceWrite {
    pub name: String,
    pub ip_address: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub location: String,
    pub status: String,
}

// ── Status ───────────────────────────────────────────────────────────

/// Result of `GET /devices/{id}/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatusReport {
    #[serde(default)]
    pub status: Option<String>,
}

// ── Helpers ──────────────────────────────────────────────────────────

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_id_is_kept_as_text() {
        let record: DeviceRecord = serde_json::from_value(json!({
            "id": 42,
            "name": "core-rtr",
            "ip_address": "10.0.0.1",
            "type": "router",
            "location": "DC1",
            "status": "online"
        }))
        .unwrap();

        assert_eq!(record.id, "42");
        assert_eq!(record.device_type, "router");
        assert_eq!(record.status.as_deref(), Some("online"));
    }

    #[test]
    fn missing_and_null_fields_are_tolerated() {
        let record: DeviceRecord = serde_json::from_value(json!({
            "id": "a1",
            "name": null,
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(record.name, "");
        assert_eq!(record.location, "");
        assert_eq!(record.status, None);
        assert!(record.extra.contains_key("created_at"));
    }

    #[test]
    fn object_id_is_rejected() {
        let result: Result<DeviceRecord, _> = serde_json::from_value(json!({ "id": {} }));
        assert!(result.is_err());
    }

    #[test]
    fn write_body_uses_type_key() {
        let body = DeviceWrite {
            name: "sw-1".into(),
            ip_address: "10.0.0.2".into(),
            device_type: "switch".into(),
            location: "Lab".into(),
            status: "offline".into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "switch");
        assert!(value.get("id").is_none());
    }
}
