//! Clap derive structures for the `devman` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use devman_core::{SortKey, StatusFilter, TypeFilter};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// devman -- manage a network device inventory from the command line
#[derive(Debug, Parser)]
#[command(
    name = "devman",
    version,
    about = "Manage network device inventories from the command line",
    long_about = "List, filter, create, edit and delete routers, switches and servers\n\
        held by a REST device inventory service, and poll their live status.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device service base URL (overrides the config file)
    #[arg(long, short = 'u', env = "DEVMAN_API_BASE_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "DEVMAN_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "DEVMAN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, inspect and edit devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices, optionally filtered and sorted
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show a single device
    Get {
        /// Device id
        id: String,
    },

    /// Create a device
    #[command(alias = "create")]
    Add(DeviceFields),

    /// Edit a device; omitted fields keep their current value
    #[command(alias = "edit")]
    Update {
        /// Device id
        id: String,

        #[command(flatten)]
        fields: UpdateFields,
    },

    /// Delete a device
    #[command(alias = "rm", alias = "delete")]
    Remove {
        /// Device id
        id: String,
    },

    /// Ask the service for a device's live status
    Status {
        /// Device id
        id: String,
    },

    /// Poll the service and re-render whenever the list changes
    Watch(WatchArgs),
}

/// Filter and sort arguments shared by `list` and `watch`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive text matched against name, IP, type and location
    #[arg(long, short = 'f')]
    pub query: Option<String>,

    /// Only devices of this type
    #[arg(long = "type", short = 't', default_value = "all", value_parser = parse_type_filter)]
    pub device_type: TypeFilter,

    /// Only devices with this status
    #[arg(long, short = 's', default_value = "all", value_parser = parse_status_filter)]
    pub status: StatusFilter,

    /// Sort column
    #[arg(long, default_value = "name", value_parser = parse_sort_key)]
    pub sort: SortKey,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Poll interval (e.g. "5s", "500ms"); defaults to the configured interval
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

/// Fields for `devices add`. Type and status default like a new form.
#[derive(Debug, Args)]
pub struct DeviceFields {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// IPv4 address
    #[arg(long, alias = "ip")]
    pub ip_address: String,

    /// router, switch or server
    #[arg(long = "type", default_value = "router")]
    pub device_type: String,

    /// Physical location
    #[arg(long)]
    pub location: String,

    /// online or offline
    #[arg(long, default_value = "offline")]
    pub status: String,
}

#[derive(Debug, Args)]
pub struct UpdateFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, alias = "ip")]
    pub ip_address: Option<String>,

    #[arg(long = "type")]
    pub device_type: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub status: Option<String>,
}

impl UpdateFields {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ip_address.is_none()
            && self.device_type.is_none()
            && self.location.is_none()
            && self.status.is_none()
    }
}

fn parse_type_filter(raw: &str) -> Result<TypeFilter, String> {
    raw.to_lowercase()
        .parse()
        .map_err(|_| format!("expected all, router, switch or server, got '{raw}'"))
}

fn parse_status_filter(raw: &str) -> Result<StatusFilter, String> {
    raw.to_lowercase()
        .parse()
        .map_err(|_| format!("expected all, online, offline or unknown, got '{raw}'"))
}

fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    let normalized = raw.to_lowercase().replace('-', "_");
    let normalized = if normalized == "ip" { "ip_address".into() } else { normalized };
    normalized
        .parse()
        .map_err(|_| format!("expected name, ip_address, type, location or status, got '{raw}'"))
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file, prompting for values unless --yes
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
