//! CLI configuration: a thin wrapper around `devman_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --timeout, --output, --color).

use devman_core::StoreConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use devman_config::{Config, config_path, load_config, save_config};

/// Settings after layering flags over the config file.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub store: StoreConfig,
    pub output: OutputFormat,
    pub color: ColorMode,
    pub timeout_secs: u64,
}

/// Flags win over env, env over the file, the file over defaults.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let mut cfg = cfg.clone();
    if let Some(ref url) = global.api_url {
        cfg.api_base_url = Some(url.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    let store = cfg.to_store_config()?;

    let output = match global.output {
        Some(output) => output,
        None => parse_output(&cfg.defaults.output)?,
    };
    let color = match global.color {
        Some(color) => color,
        None => parse_color(&cfg.defaults.color)?,
    };

    Ok(Resolved {
        store,
        output,
        color,
        timeout_secs: cfg.timeout,
    })
}

fn parse_output(raw: &str) -> Result<OutputFormat, CliError> {
    clap::ValueEnum::from_str(raw, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!("expected table, json, json-compact, yaml or plain, got '{raw}'"),
    })
}

fn parse_color(raw: &str) -> Result<ColorMode, CliError> {
    clap::ValueEnum::from_str(raw, true).map_err(|_| CliError::Validation {
        field: "defaults.color".into(),
        reason: format!("expected auto, always or never, got '{raw}'"),
    })
}
