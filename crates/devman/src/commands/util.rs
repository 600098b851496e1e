//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use devman_core::{
    Device, DeviceFilter, DeviceStore, SortDirection, SortSpec, StoreConfig, query,
};

use crate::cli::ListArgs;
use crate::error::CliError;

/// Build a store for one command invocation. No polling is started.
pub fn open_store(config: StoreConfig) -> Result<DeviceStore, CliError> {
    tracing::debug!(base_url = %config.base_url, "opening device store");
    Ok(DeviceStore::new(config)?)
}

/// Filter and sort order described by `list` / `watch` flags.
pub fn query_from_args(args: &ListArgs) -> (DeviceFilter, SortSpec) {
    let filter = DeviceFilter {
        query: args.query.clone().unwrap_or_default(),
        device_type: args.device_type,
        status: args.status,
    };
    let direction = if args.desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    (filter, SortSpec::new(args.sort, direction))
}

/// Apply the list flags to a snapshot.
pub fn visible(devices: &[Arc<Device>], args: &ListArgs) -> Vec<Arc<Device>> {
    let (filter, sort) = query_from_args(args);
    query::apply(devices, &filter, sort)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
