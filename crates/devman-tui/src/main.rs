//! `devman-tui`: interactive terminal front end for the device inventory.
//!
//! Logs go to a file (default `/tmp/devman-tui.log`) so they never corrupt
//! the terminal. A background data bridge forwards store changes into the
//! action loop while the store polls the backend.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod state;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use devman_core::DeviceStore;

use crate::app::App;
use crate::theme::ThemeMode;

/// Terminal UI for browsing and managing network devices.
#[derive(Parser, Debug)]
#[command(name = "devman-tui", version, about)]
struct Cli {
    /// Device service base URL (e.g. http://localhost:3001/api/v1)
    #[arg(short = 'u', long, env = "DEVMAN_API_BASE_URL")]
    api_url: Option<String>,

    /// Background refresh interval (e.g. 5s, 500ms)
    #[arg(short = 'p', long, value_parser = humantime::parse_duration)]
    poll_interval: Option<Duration>,

    /// Start with the light theme
    #[arg(long)]
    light: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/devman-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Holding the guard keeps the writer flushing.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "devman_tui={log_level},devman_core={log_level},devman_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("devman-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Layer flags over the shared config file.
fn build_store(cli: &Cli) -> Result<(DeviceStore, Duration)> {
    let mut cfg = devman_config::load_config().wrap_err("failed to load config")?;
    if let Some(url) = &cli.api_url {
        cfg.api_base_url = Some(url.clone());
    }
    let store_config = cfg.to_store_config().wrap_err("invalid configuration")?;
    let interval = cli.poll_interval.unwrap_or(store_config.poll_interval);
    let store = DeviceStore::new(store_config).wrap_err("failed to build HTTP client")?;
    Ok((store, interval))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let (store, interval) = build_store(&cli)?;
    info!(
        base_url = store.base_url(),
        interval_ms = interval.as_millis(),
        "starting devman-tui"
    );

    let theme = if cli.light {
        ThemeMode::Light
    } else {
        ThemeMode::Dark
    };
    let mut app = App::new(store, interval, theme);
    app.run().await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn poll_interval_accepts_humantime() {
        let cli = Cli::try_parse_from(["devman-tui", "--poll-interval", "750ms", "--light"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.poll_interval, Some(Duration::from_millis(750)));
        assert!(cli.light);
    }
}
