// REST HTTP client
//
// Wraps `reqwest::Client` with base-URL resolution and a single response
// normalization path: every verb yields parsed JSON on 2xx and a
// `Error::Request` carrying the server's `error` message otherwise.
// Typed device endpoints live in `devices.rs` as inherent methods.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api/v1";

/// Resolve the API base URL from an optional configured value.
///
/// Blank or missing values fall back to [`DEFAULT_BASE_URL`]; trailing
/// slashes are stripped so paths can be appended verbatim.
pub fn resolve_base_url(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(url) if !url.is_empty() => url.trim_end_matches('/').to_owned(),
        _ => DEFAULT_BASE_URL.to_owned(),
    }
}

/// Raw HTTP client for the device inventory REST API.
///
/// Paths passed to the verb methods are appended to the base URL as-is and
/// must start with `/` (e.g. `"/devices"`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from a base URL and a `TransportConfig`.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = resolve_base_url(Some(base_url));
        // Reject malformed URLs up front rather than on the first request.
        Url::parse(&base_url)?;
        Ok(Self { http, base_url })
    }

    /// The resolved base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// Send a GET request and return the parsed body.
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    /// Send a POST request with a JSON body and return the parsed body.
    pub async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    /// Send a PUT request with a JSON body and return the parsed body.
    pub async fn put<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        handle_response(resp).await
    }

    /// Send a DELETE request and return the parsed body.
    pub async fn delete(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_response(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response(resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();

    if status == StatusCode::NO_CONTENT {
        return Ok(json!({ "success": true }));
    }

    let body = resp.text().await?;
    let parsed = parse_body(&body);

    if status.is_success() {
        Ok(parsed)
    } else {
        let message = error_message(&parsed, status);
        trace!(status = status.as_u16(), %message, "request failed");
        Err(Error::Request {
            status: status.as_u16(),
            message,
        })
    }
}

/// Parse a response body, treating empty or non-JSON bodies as `{}`.
fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Prefer the server's `{"error": "..."}` message over a generic one.
fn error_message(body: &Value, status: StatusCode) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .map_or_else(
            || format!("Request failed: {}", status.as_u16()),
            str::to_owned,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_defaults_when_unset_or_blank() {
        assert_eq!(resolve_base_url(None), DEFAULT_BASE_URL);
        assert_eq!(resolve_base_url(Some("   ")), DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_strips_trailing_slashes() {
        assert_eq!(
            resolve_base_url(Some("http://inventory:8080/api///")),
            "http://inventory:8080/api"
        );
    }

    #[test]
    fn non_json_body_parses_as_empty_object() {
        assert_eq!(parse_body(""), json!({}));
        assert_eq!(parse_body("<html>bad gateway</html>"), json!({}));
        assert_eq!(parse_body("[1,2]"), json!([1, 2]));
    }

    #[test]
    fn error_message_prefers_body_error_field() {
        let body = json!({ "error": "Database unavailable" });
        assert_eq!(
            error_message(&body, StatusCode::SERVICE_UNAVAILABLE),
            "Database unavailable"
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(
            error_message(&json!({}), StatusCode::INTERNAL_SERVER_ERROR),
            "Request failed: 500"
        );
        assert_eq!(
            error_message(&json!({ "error": "" }), StatusCode::BAD_REQUEST),
            "Request failed: 400"
        );
        assert_eq!(
            error_message(&json!({ "error": { "code": 7 } }), StatusCode::CONFLICT),
            "Request failed: 409"
        );
    }

    #[test]
    fn with_client_rejects_malformed_url() {
        let result = ApiClient::with_client(reqwest::Client::new(), "not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
