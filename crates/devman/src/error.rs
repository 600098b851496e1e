//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use devman_config::ConfigError;
use devman_core::{CoreError, ValidationErrors};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const UNAVAILABLE: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the device service at {url}")]
    #[diagnostic(
        code(devman::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             {reason}\n\
             Override the URL with --api-url or DEVMAN_API_BASE_URL."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Device service is unavailable")]
    #[diagnostic(
        code(devman::unavailable),
        help("The last fetch failed, so changes are disabled. Retry once the service recovers.")
    )]
    Unavailable,

    // ── Resources ────────────────────────────────────────────────────
    #[error("device '{identifier}' not found")]
    #[diagnostic(
        code(devman::not_found),
        help("Run: devman devices list to see available devices")
    )]
    NotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(devman::api_error))]
    ApiError { message: String, status: Option<u16> },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(devman::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid device: {0}")]
    #[diagnostic(
        code(devman::invalid_device),
        help("Fix the listed fields and try again.")
    )]
    InvalidDevice(ValidationErrors),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(devman::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(devman::config))]
    Config(Box<figment::Error>),

    #[error("{0}")]
    #[diagnostic(code(devman::config))]
    ConfigInvalid(String),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(devman::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(devman::timeout),
        help("Increase timeout with --timeout or check service responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("{0}")]
    #[diagnostic(code(devman::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(devman::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Figment(inner) => Self::Config(inner),
            ConfigError::Io(inner) => Self::Io(inner),
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Serialization(inner) => Self::ConfigInvalid(inner.to_string()),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Unavailable => exit_code::UNAVAILABLE,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::InvalidDevice(_)
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

/// Convert a core error, recording the configured timeout for the message.
pub fn from_core(err: CoreError, timeout_secs: u64) -> CliError {
    match err {
        CoreError::Timeout => CliError::Timeout {
            seconds: timeout_secs,
        },
        other => other.into(),
    }
}

/// Like [`from_core`], but a missing device is reported under the id the
/// caller asked about.
pub fn from_core_for_device(err: CoreError, timeout_secs: u64, id: &str) -> CliError {
    if err.is_not_found() {
        return CliError::NotFound {
            identifier: id.to_owned(),
        };
    }
    from_core(err, timeout_secs)
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout => CliError::Timeout { seconds: 0 },
            CoreError::BackendUnavailable => CliError::Unavailable,
            CoreError::DeviceNotFound { identifier } => CliError::NotFound { identifier },
            CoreError::ValidationFailed(errors) => CliError::InvalidDevice(errors),
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::Config { message } => CliError::ConfigInvalid(message),
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
