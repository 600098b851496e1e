use thiserror::Error;

/// Top-level error type for the `devman-api` crate.
///
/// Covers every failure mode of the REST transport: non-2xx responses,
/// requests that never received a response, and bodies that could not be
/// decoded into the expected wire type. `devman-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── HTTP ────────────────────────────────────────────────────────
    /// The server answered with a status outside `200..300`.
    ///
    /// `message` is the `error` field of the response body when present,
    /// otherwise `"Request failed: <status>"`.
    #[error("{message}")]
    Request { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// No response was received (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status carried by this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if no response reached the client.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_displays_message_verbatim() {
        let err = Error::Request {
            status: 503,
            message: "Database unavailable".into(),
        };
        assert_eq!(err.to_string(), "Database unavailable");
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_transport());
    }

    #[test]
    fn deserialization_error_has_no_status() {
        let err = Error::Deserialization {
            message: "expected a sequence".into(),
            body: "{}".into(),
        };
        assert_eq!(err.status(), None);
    }
}
