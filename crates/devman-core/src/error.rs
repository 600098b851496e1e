// ── Core error types ──
//
// User-facing errors from devman-core. The `From<devman_api::Error>` impl
// translates transport-layer failures into domain variants so consumers
// match on what went wrong, not on how the request was made.

use thiserror::Error;

use crate::validate::ValidationErrors;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach device service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to device service timed out")]
    Timeout,

    /// Writes are refused locally while the last fetch failed.
    #[error("Device service is unavailable; changes are disabled until it recovers")]
    BackendUnavailable,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code, when the server answered.
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::DeviceNotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Returns `true` if the device does not exist locally or remotely.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<devman_api::Error> for CoreError {
    fn from(err: devman_api::Error) -> Self {
        match err {
            devman_api::Error::Request { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            devman_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            devman_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            devman_api::Error::Client(message) => CoreError::Config { message },
            devman_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_keeps_server_message() {
        let err = CoreError::from(devman_api::Error::Request {
            status: 503,
            message: "Database unavailable".into(),
        });
        assert_eq!(err.to_string(), "Database unavailable");
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn not_found_status_is_reported() {
        let err = CoreError::from(devman_api::Error::Request {
            status: 404,
            message: "Device not found".into(),
        });
        assert!(err.is_not_found());
    }

    #[test]
    fn deserialization_is_internal() {
        let err = CoreError::from(devman_api::Error::Deserialization {
            message: "bad".into(),
            body: "{}".into(),
        });
        assert!(matches!(err, CoreError::Internal(_)));
    }
}
