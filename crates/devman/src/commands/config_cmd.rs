//! Config subcommand handlers.

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn format_toml(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    let base = devman_api::resolve_base_url(cfg.api_base_url.as_deref());
    let _ = writeln!(out, "api_base_url = \"{base}\"");
    let _ = writeln!(out, "timeout = {}", cfg.timeout);
    let _ = writeln!(out, "poll_interval_ms = {}", cfg.poll_interval_ms);
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = write!(out, "color = \"{}\"", cfg.defaults.color);
    out
}

/// Config file values with `--api-url` / `--timeout` applied on top.
fn effective(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = config::load_config()?;
    if let Some(ref url) = global.api_url {
        cfg.api_base_url = Some(url.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    Ok(cfg)
}

fn prompt_config(mut cfg: Config) -> Result<Config, CliError> {
    let base: String = Input::new()
        .with_prompt("Device service URL")
        .default(devman_api::resolve_base_url(cfg.api_base_url.as_deref()))
        .interact_text()
        .map_err(prompt_err)?;
    cfg.api_base_url = Some(base);

    cfg.poll_interval_ms = Input::new()
        .with_prompt("Poll interval (ms)")
        .default(cfg.poll_interval_ms)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.timeout = Input::new()
        .with_prompt("Request timeout (s)")
        .default(cfg.timeout)
        .interact_text()
        .map_err(prompt_err)?;
    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = effective(global)?;
            cfg.validate()?;
            let format = global.output.unwrap_or(OutputFormat::Table);
            let out = output::render_single(format, &cfg, format_toml, |c| {
                devman_api::resolve_base_url(c.api_base_url.as_deref())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = effective(global)?;
            if !global.yes {
                output::print_message(
                    &format!("Config path: {}", path.display()),
                    global.quiet,
                );
                cfg = prompt_config(cfg)?;
            }
            cfg.validate()?;

            let written = config::save_config(&cfg)?;
            output::print_message(
                &format!("Configuration written to {}", written.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_view_shows_resolved_base_url() {
        let text = format_toml(&Config::default());
        assert!(text.contains("api_base_url = \"http://localhost:3001/api/v1\""));
        assert!(text.contains("poll_interval_ms = 5000"));
        assert!(text.contains("[defaults]"));
    }
}
