//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;
use tokio::sync::broadcast::error::RecvError;

use devman_core::{Device, DeviceDraft, DeviceId, DeviceStore, Notification};

use crate::cli::{DeviceFields, DevicesArgs, DevicesCommand, GlobalOpts, UpdateFields, WatchArgs};
use crate::config::Resolved;
use crate::error::{self, CliError};
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            ip: d.ip_address.clone(),
            kind: d.device_type.to_string(),
            location: d.location.clone(),
            status: output::paint_status(d.status, color),
        }
    }
}

fn detail(d: &Device, color: bool) -> String {
    [
        format!("ID:       {}", d.id),
        format!("Name:     {}", d.name),
        format!("IP:       {}", d.ip_address),
        format!("Type:     {}", d.device_type),
        format!("Location: {}", d.location),
        format!("Status:   {}", output::paint_status(d.status, color)),
    ]
    .join("\n")
}

struct Ctx<'a> {
    resolved: &'a Resolved,
    global: &'a GlobalOpts,
    color: bool,
}

impl Ctx<'_> {
    fn err(&self, err: devman_core::CoreError) -> CliError {
        error::from_core(err, self.resolved.timeout_secs)
    }

    fn device_err(&self, err: devman_core::CoreError, id: &str) -> CliError {
        error::from_core_for_device(err, self.resolved.timeout_secs, id)
    }

    fn print_list(&self, devices: &[Arc<Device>]) -> Result<(), CliError> {
        let out = output::render_list(
            self.resolved.output,
            devices,
            |d| DeviceRow::new(d, self.color),
            |d| d.id.to_string(),
        )?;
        output::print_output(&out, self.global.quiet);
        Ok(())
    }

    fn print_device(&self, device: &Device) -> Result<(), CliError> {
        let out = output::render_single(
            self.resolved.output,
            device,
            |d| detail(d, self.color),
            |d| d.id.to_string(),
        )?;
        output::print_output(&out, self.global.quiet);
        Ok(())
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: DevicesArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = util::open_store(resolved.store.clone())?;
    let ctx = Ctx {
        resolved,
        global,
        color: output::should_color(resolved.color),
    };

    match args.command {
        DevicesCommand::List(list) => {
            store.refresh().await.map_err(|e| ctx.err(e))?;
            let visible = util::visible(&store.snapshot(), &list);
            ctx.print_list(&visible)
        }

        DevicesCommand::Get { id } => {
            let device = fetch_one(&store, &ctx, &id).await?;
            ctx.print_device(&device)
        }

        DevicesCommand::Add(fields) => {
            let input = draft_from_fields(fields).into_input()?;
            let created = store.create(&input).await.map_err(|e| ctx.err(e))?;
            output::print_message(&format!("Created device {}", created.id), global.quiet);
            ctx.print_device(&created)
        }

        DevicesCommand::Update { id, fields } => {
            if fields.is_empty() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "pass at least one of --name, --ip-address, --type, --location, --status"
                        .into(),
                });
            }
            let current = fetch_one(&store, &ctx, &id).await?;
            let mut draft = DeviceDraft::from_device(&current);
            apply_updates(&mut draft, fields);
            let input = draft.into_input()?;
            let updated = store
                .update(&current.id, &input)
                .await
                .map_err(|e| ctx.device_err(e, &id))?;
            output::print_message(&format!("Updated device {}", updated.id), global.quiet);
            ctx.print_device(&updated)
        }

        DevicesCommand::Remove { id } => {
            if !util::confirm(&format!("Delete device {id}?"), global.yes)? {
                output::print_message("Aborted", global.quiet);
                return Ok(());
            }
            store
                .delete(&DeviceId::from(id.as_str()))
                .await
                .map_err(|e| ctx.device_err(e, &id))?;
            output::print_message(&format!("Deleted device {id}"), global.quiet);
            Ok(())
        }

        DevicesCommand::Status { id } => {
            let status = store
                .check_status(&DeviceId::from(id.as_str()))
                .await
                .map_err(|e| ctx.device_err(e, &id))?;
            let report = serde_json::json!({ "id": id, "status": status });
            let out = output::render_single(
                resolved.output,
                &report,
                |_| format!("{id}: {}", output::paint_status(status, ctx.color)),
                |_| status.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Watch(watch) => run_watch(&store, &ctx, watch).await,
    }
}

/// Refresh, then look the id up in the fresh snapshot.
async fn fetch_one(store: &DeviceStore, ctx: &Ctx<'_>, id: &str) -> Result<Arc<Device>, CliError> {
    store.refresh().await.map_err(|e| ctx.err(e))?;
    store
        .device(&DeviceId::from(id))
        .ok_or_else(|| CliError::NotFound {
            identifier: id.to_owned(),
        })
}

fn draft_from_fields(fields: DeviceFields) -> DeviceDraft {
    DeviceDraft {
        name: fields.name,
        ip_address: fields.ip_address,
        device_type: fields.device_type,
        location: fields.location,
        status: fields.status,
    }
}

fn apply_updates(draft: &mut DeviceDraft, fields: UpdateFields) {
    let UpdateFields {
        name,
        ip_address,
        device_type,
        location,
        status,
    } = fields;
    for (slot, value) in [
        (&mut draft.name, name),
        (&mut draft.ip_address, ip_address),
        (&mut draft.device_type, device_type),
        (&mut draft.location, location),
        (&mut draft.status, status),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

// ── Watch ───────────────────────────────────────────────────────────

async fn run_watch(store: &DeviceStore, ctx: &Ctx<'_>, args: WatchArgs) -> Result<(), CliError> {
    let interval = args.interval.unwrap_or(store.config().poll_interval);
    let mut stream = store.devices();
    let mut notes = store.notifications();
    let mut available = store.availability();

    store.start_polling(interval);
    tracing::info!(interval = %humantime::format_duration(interval), "watching devices");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            snap = stream.changed() => {
                let Some(snap) = snap else { break };
                ctx.print_list(&util::visible(&snap, &args.list))?;
            }
            note = notes.recv() => match note {
                Ok(note) => report(&note, ctx.global.quiet),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "notification receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            changed = available.changed() => {
                if changed.is_err() {
                    break;
                }
                if !*available.borrow_and_update() {
                    output::print_message("Device service unavailable; showing last known list", ctx.global.quiet);
                }
            }
        }
    }

    store.shutdown();
    Ok(())
}

fn report(note: &Notification, quiet: bool) {
    if note.is_error() {
        eprintln!("error: {}", note.message);
    } else {
        output::print_message(&note.message, quiet);
    }
}
