// Device endpoints
//
// Typed wrappers over the `/devices` routes. The backend may answer with a
// bare payload or wrap it as `{"data": ...}`; both shapes are accepted.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{DeviceRecord, DeviceStatusReport, DeviceWrite};

impl ApiClient {
    /// List all devices in server order.
    ///
    /// `GET /devices`
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        debug!("listing devices");
        let body = self.get("/devices").await?;
        match body {
            Value::Array(_) => decode(body),
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(data) => decode(data),
            },
            _ => Ok(Vec::new()),
        }
    }

    /// Create a device and return the stored record.
    ///
    /// `POST /devices`
    pub async fn create_device(&self, device: &DeviceWrite) -> Result<DeviceRecord, Error> {
        debug!(name = %device.name, "creating device");
        let body = self.post("/devices", device).await?;
        decode(unwrap_data(body))
    }

    /// Replace a device's fields and return the stored record.
    ///
    /// `PUT /devices/{id}`
    pub async fn update_device(
        &self,
        id: &str,
        device: &DeviceWrite,
    ) -> Result<DeviceRecord, Error> {
        debug!(id, "updating device");
        let body = self.put(&format!("/devices/{id}"), device).await?;
        decode(unwrap_data(body))
    }

    /// Delete a device.
    ///
    /// `DELETE /devices/{id}`
    pub async fn delete_device(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting device");
        self.delete(&format!("/devices/{id}")).await?;
        Ok(())
    }

    /// Ask the backend for a device's live status.
    ///
    /// `GET /devices/{id}/status`
    pub async fn device_status(&self, id: &str) -> Result<DeviceStatusReport, Error> {
        debug!(id, "checking device status");
        let body = self.get(&format!("/devices/{id}/status")).await?;
        let nested = body
            .get("data")
            .and_then(|data| data.get("status"))
            .and_then(Value::as_str);
        let status = nested
            .or_else(|| body.get("status").and_then(Value::as_str))
            .map(str::to_owned);
        Ok(DeviceStatusReport { status })
    }
}

/// Take `data` out of a `{"data": ...}` envelope, or return the body as-is.
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: value.to_string(),
    })
}
