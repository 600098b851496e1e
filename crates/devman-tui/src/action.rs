//! All possible UI actions. Actions are the sole mechanism for state mutation.

use devman_core::{DeviceSnapshot, Notification, SortKey};
use tui_input::InputRequest;

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Data events (from the store) ──────────────────────────────
    DevicesUpdated(DeviceSnapshot),
    AvailabilityChanged(bool),
    LoadingChanged(bool),
    Notify(Notification),

    // ── Navigation ────────────────────────────────────────────────
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    PageDown,
    PageUp,
    ToggleDetail,
    ToggleHelp,
    ToggleTheme,
    /// Esc in browse mode: close detail, then clear filters.
    Back,

    // ── Search / filter / sort ────────────────────────────────────
    OpenSearch,
    SearchEdit(InputRequest),
    /// Leave search mode; `clear` drops the query.
    CloseSearch { clear: bool },
    CycleTypeFilter,
    CycleStatusFilter,
    ClearFilters,
    SortBy(SortKey),

    // ── Store operations ──────────────────────────────────────────
    Refresh,
    CheckStatus,
    OpenCreateForm,
    OpenEditForm,
    RequestDelete,
    ConfirmYes,
    ConfirmNo,

    // ── Form ──────────────────────────────────────────────────────
    FormEdit(InputRequest),
    FormFocus { forward: bool },
    FormCycle { forward: bool },
    FormSubmit,
    FormCancel,
    /// The store finished a create/update; `ok` closes the form.
    FormFinished { ok: bool },
}
