//! Explicit UI state and the reducer that applies actions to it.
//!
//! Everything the screen shows lives in [`AppState`]. [`AppState::update`]
//! is synchronous and side-effect free: work that needs the store is
//! returned as an [`Effect`] for the app loop to run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tui_input::Input;

use devman_core::{
    Device, DeviceFilter, DeviceId, DeviceInput, DeviceSnapshot, Notification, SortSpec, query,
};

use crate::action::Action;
use crate::theme::ThemeMode;
use crate::widgets::form::{FormKind, FormState};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

const PAGE: isize = 10;

const UNAVAILABLE: &str = "Device service is unavailable; changes are disabled";

#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

/// Which overlay (if any) owns the keyboard.
#[derive(Debug, Clone, Default)]
pub enum Mode {
    #[default]
    Browse,
    Search,
    Help,
    Form(Box<FormState>),
    ConfirmDelete {
        id: DeviceId,
        name: String,
    },
}

/// Work the reducer asks the app loop to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    Refresh,
    Create(DeviceInput),
    Update(DeviceId, DeviceInput),
    Delete(DeviceId),
    CheckStatus(DeviceId),
}

#[derive(Debug)]
pub struct AppState {
    pub theme: ThemeMode,
    pub devices: DeviceSnapshot,
    /// `devices` after filter and sort.
    pub visible: Vec<Arc<Device>>,
    /// Index into `visible`.
    pub selected: usize,
    pub filter: DeviceFilter,
    pub search: Input,
    pub sort: SortSpec,
    pub available: bool,
    pub loading: bool,
    pub toast: Option<Toast>,
    pub mode: Mode,
    pub detail_open: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            devices: Arc::new(Vec::new()),
            visible: Vec::new(),
            selected: 0,
            filter: DeviceFilter::default(),
            search: Input::default(),
            sort: SortSpec::default(),
            available: true,
            loading: false,
            toast: None,
            mode: Mode::Browse,
            detail_open: false,
        }
    }
}

impl AppState {
    pub fn new(theme: ThemeMode) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn selected_device(&self) -> Option<&Arc<Device>> {
        self.visible.get(self.selected)
    }

    /// Writes are allowed only while the last fetch succeeded.
    pub fn can_write(&self) -> bool {
        self.available
    }

    /// Re-derive `visible`, keeping the selected device selected if it
    /// survives the new filter.
    fn recompute(&mut self) {
        let keep = self.selected_device().map(|d| d.id.clone());
        self.visible = query::apply(&self.devices, &self.filter, self.sort);
        self.selected = keep
            .and_then(|id| self.visible.iter().position(|d| d.id == id))
            .unwrap_or_else(|| self.selected.min(self.visible.len().saturating_sub(1)));
        if self.visible.is_empty() {
            self.detail_open = false;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    fn toast(&mut self, notification: Notification, now: Instant) {
        self.toast = Some(Toast {
            notification,
            shown_at: now,
        });
    }

    fn reject_write(&mut self, now: Instant) -> Option<Effect> {
        self.toast(Notification::error(UNAVAILABLE), now);
        None
    }

    fn clear_filters(&mut self) {
        self.search.reset();
        self.filter = DeviceFilter::default();
        self.recompute();
    }

    /// Apply one action. `now` drives toast expiry.
    #[allow(clippy::too_many_lines)]
    pub fn update(&mut self, action: &Action, now: Instant) -> Option<Effect> {
        match action {
            Action::Quit => return Some(Effect::Quit),
            Action::Render | Action::Resize(..) => {}

            Action::Tick => {
                if self
                    .toast
                    .as_ref()
                    .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= TOAST_TTL)
                {
                    self.toast = None;
                }
            }

            // ── Data ───────────────────────────────────────────────
            Action::DevicesUpdated(snapshot) => {
                self.devices = Arc::clone(snapshot);
                self.recompute();
            }
            Action::AvailabilityChanged(available) => self.available = *available,
            Action::LoadingChanged(loading) => self.loading = *loading,
            Action::Notify(notification) => self.toast(notification.clone(), now),

            // ── Navigation ─────────────────────────────────────────
            Action::SelectNext => self.move_selection(1),
            Action::SelectPrev => self.move_selection(-1),
            Action::PageDown => self.move_selection(PAGE),
            Action::PageUp => self.move_selection(-PAGE),
            Action::SelectFirst => self.selected = 0,
            Action::SelectLast => self.selected = self.visible.len().saturating_sub(1),
            Action::ToggleDetail => {
                self.detail_open = !self.detail_open && self.selected_device().is_some();
            }
            Action::ToggleHelp => {
                self.mode = match self.mode {
                    Mode::Help => Mode::Browse,
                    _ => Mode::Help,
                };
            }
            Action::ToggleTheme => self.theme = self.theme.toggled(),
            Action::Back => {
                if self.detail_open {
                    self.detail_open = false;
                } else if self.filter.is_active() {
                    self.clear_filters();
                }
            }

            // ── Search / filter / sort ─────────────────────────────
            Action::OpenSearch => self.mode = Mode::Search,
            Action::SearchEdit(request) => {
                if self.search.handle(*request).is_some() {
                    self.filter.query = self.search.value().to_owned();
                    self.recompute();
                }
            }
            Action::CloseSearch { clear } => {
                if *clear {
                    self.search.reset();
                    self.filter.query.clear();
                    self.recompute();
                }
                self.mode = Mode::Browse;
            }
            Action::CycleTypeFilter => {
                self.filter.device_type = self.filter.device_type.cycle();
                self.recompute();
            }
            Action::CycleStatusFilter => {
                self.filter.status = self.filter.status.cycle();
                self.recompute();
            }
            Action::ClearFilters => self.clear_filters(),
            Action::SortBy(key) => {
                self.sort = self.sort.toggle(*key);
                self.recompute();
            }

            // ── Store operations ───────────────────────────────────
            Action::Refresh => {
                if !self.loading {
                    return Some(Effect::Refresh);
                }
            }
            Action::CheckStatus => {
                return self
                    .selected_device()
                    .map(|d| Effect::CheckStatus(d.id.clone()));
            }
            Action::OpenCreateForm => {
                if !self.can_write() {
                    return self.reject_write(now);
                }
                self.mode = Mode::Form(Box::new(FormState::create()));
            }
            Action::OpenEditForm => {
                if !self.can_write() {
                    return self.reject_write(now);
                }
                if let Some(device) = self.selected_device() {
                    self.mode = Mode::Form(Box::new(FormState::edit(device)));
                }
            }
            Action::RequestDelete => {
                if !self.can_write() {
                    return self.reject_write(now);
                }
                if let Some(device) = self.selected_device() {
                    self.mode = Mode::ConfirmDelete {
                        id: device.id.clone(),
                        name: device.name.clone(),
                    };
                }
            }
            Action::ConfirmYes => {
                if let Mode::ConfirmDelete { id, .. } = &self.mode {
                    let id = id.clone();
                    self.mode = Mode::Browse;
                    if !self.can_write() {
                        return self.reject_write(now);
                    }
                    return Some(Effect::Delete(id));
                }
            }
            Action::ConfirmNo => {
                if matches!(self.mode, Mode::ConfirmDelete { .. }) {
                    self.mode = Mode::Browse;
                }
            }

            // ── Form ───────────────────────────────────────────────
            Action::FormEdit(request) => {
                if let Mode::Form(form) = &mut self.mode {
                    form.apply_edit(*request);
                }
            }
            Action::FormFocus { forward } => {
                if let Mode::Form(form) = &mut self.mode {
                    if *forward {
                        form.focus_next();
                    } else {
                        form.focus_prev();
                    }
                }
            }
            Action::FormCycle { forward } => {
                if let Mode::Form(form) = &mut self.mode {
                    form.cycle_choice(*forward);
                }
            }
            Action::FormSubmit => {
                if !self.can_write() && matches!(self.mode, Mode::Form(_)) {
                    return self.reject_write(now);
                }
                if let Mode::Form(form) = &mut self.mode {
                    let input = form.submit()?;
                    return Some(match &form.kind {
                        FormKind::Create => Effect::Create(input),
                        FormKind::Edit(id) => Effect::Update(id.clone(), input),
                    });
                }
            }
            Action::FormCancel => {
                if matches!(self.mode, Mode::Form(_)) {
                    self.mode = Mode::Browse;
                }
            }
            Action::FormFinished { ok } => {
                if let Mode::Form(form) = &mut self.mode {
                    if *ok {
                        self.mode = Mode::Browse;
                    } else {
                        form.submitting = false;
                    }
                }
            }
        }
        None
    }
}
