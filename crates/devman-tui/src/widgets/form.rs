//! Add / edit form: state, key mapping and popup rendering.
//!
//! Text fields are `tui_input::Input`s; type and status are choice fields
//! cycled with ←/→ or space. Validation runs on submit and errors are
//! drawn under the offending field until it is edited.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tui_input::{Input, InputRequest};

use devman_core::{
    Device, DeviceDraft, DeviceId, DeviceInput, DeviceStatus, DeviceType, Field, ValidationErrors,
    validate::validate,
};

use crate::action::Action;
use crate::component::Component;
use crate::state::{AppState, Mode};
use crate::theme::Theme;
use crate::widgets::{centered, input_request};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Create,
    Edit(DeviceId),
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub focus: Field,
    name: Input,
    ip_address: Input,
    location: Input,
    device_type: String,
    status: String,
    pub errors: ValidationErrors,
    /// A request is in flight; further submits are ignored.
    pub submitting: bool,
}

impl FormState {
    pub const FIELDS: [Field; 5] = [
        Field::Name,
        Field::IpAddress,
        Field::Type,
        Field::Location,
        Field::Status,
    ];

    pub fn create() -> Self {
        Self::from_draft(FormKind::Create, DeviceDraft::default())
    }

    pub fn edit(device: &Device) -> Self {
        Self::from_draft(
            FormKind::Edit(device.id.clone()),
            DeviceDraft::from_device(device),
        )
    }

    fn from_draft(kind: FormKind, draft: DeviceDraft) -> Self {
        Self {
            kind,
            focus: Field::Name,
            name: Input::new(draft.name),
            ip_address: Input::new(draft.ip_address),
            location: Input::new(draft.location),
            device_type: draft.device_type,
            status: draft.status,
            errors: ValidationErrors::default(),
            submitting: false,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Create => " Add device ",
            FormKind::Edit(_) => " Edit device ",
        }
    }

    pub fn draft(&self) -> DeviceDraft {
        DeviceDraft {
            name: self.name.value().to_owned(),
            ip_address: self.ip_address.value().to_owned(),
            device_type: self.device_type.clone(),
            location: self.location.value().to_owned(),
            status: self.status.clone(),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => self.name.value(),
            Field::IpAddress => self.ip_address.value(),
            Field::Type => &self.device_type,
            Field::Location => self.location.value(),
            Field::Status => &self.status,
        }
    }

    pub fn is_choice(field: Field) -> bool {
        matches!(field, Field::Type | Field::Status)
    }

    fn input(&self, field: Field) -> Option<&Input> {
        match field {
            Field::Name => Some(&self.name),
            Field::IpAddress => Some(&self.ip_address),
            Field::Location => Some(&self.location),
            Field::Type | Field::Status => None,
        }
    }

    fn input_mut(&mut self, field: Field) -> Option<&mut Input> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::IpAddress => Some(&mut self.ip_address),
            Field::Location => Some(&mut self.location),
            Field::Type | Field::Status => None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = step(self.focus, true);
    }

    pub fn focus_prev(&mut self) {
        self.focus = step(self.focus, false);
    }

    /// Apply an edit to the focused text field.
    pub fn apply_edit(&mut self, request: InputRequest) {
        let focus = self.focus;
        if let Some(input) = self.input_mut(focus) {
            if input.handle(request).is_some() {
                self.errors.clear(focus);
            }
        }
    }

    /// Move the focused choice field to its next or previous option.
    pub fn cycle_choice(&mut self, forward: bool) {
        match self.focus {
            Field::Type => {
                let options: Vec<String> = DeviceType::KNOWN.iter().map(ToString::to_string).collect();
                self.device_type = cycle_option(&options, &self.device_type, forward);
            }
            Field::Status => {
                let options: Vec<String> = DeviceStatus::settable().map(|s| s.to_string()).collect();
                self.status = cycle_option(&options, &self.status, forward);
            }
            _ => return,
        }
        self.errors.clear(self.focus);
    }

    /// Validate the draft. Returns the typed payload and marks the form as
    /// submitting, or records the errors and returns `None`.
    pub fn submit(&mut self) -> Option<DeviceInput> {
        if self.submitting {
            return None;
        }
        let draft = self.draft();
        self.errors = validate(&draft);
        if !self.errors.is_empty() {
            if let Some((first, _)) = self.errors.iter().next() {
                self.focus = first;
            }
            return None;
        }
        let input = draft.into_input().ok()?;
        self.submitting = true;
        Some(input)
    }
}

fn step(field: Field, forward: bool) -> Field {
    let fields = FormState::FIELDS;
    let idx = fields.iter().position(|f| *f == field).unwrap_or(0);
    let next = if forward {
        (idx + 1) % fields.len()
    } else {
        (idx + fields.len() - 1) % fields.len()
    };
    fields.get(next).copied().unwrap_or(Field::Name)
}

/// Unrecognised current values restart at the first option.
fn cycle_option(options: &[String], current: &str, forward: bool) -> String {
    let Some(idx) = options.iter().position(|o| o == current) else {
        return options.first().cloned().unwrap_or_default();
    };
    let next = if forward {
        (idx + 1) % options.len()
    } else {
        (idx + options.len() - 1) % options.len()
    };
    options.get(next).cloned().unwrap_or_default()
}

fn label(field: Field) -> &'static str {
    match field {
        Field::Name => "Name",
        Field::IpAddress => "IP address",
        Field::Type => "Type",
        Field::Location => "Location",
        Field::Status => "Status",
    }
}

// ── Component ───────────────────────────────────────────────────────

/// The form popup shown over the device table.
pub struct DeviceForm;

impl Component for DeviceForm {
    fn handle_key_event(&self, key: KeyEvent, state: &AppState) -> Option<Action> {
        let Mode::Form(form) = &state.mode else {
            return None;
        };
        match key.code {
            KeyCode::Esc => Some(Action::FormCancel),
            KeyCode::Enter => Some(Action::FormSubmit),
            KeyCode::Tab | KeyCode::Down => Some(Action::FormFocus { forward: true }),
            KeyCode::BackTab | KeyCode::Up => Some(Action::FormFocus { forward: false }),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::FormSubmit)
            }
            KeyCode::Left if FormState::is_choice(form.focus) => {
                Some(Action::FormCycle { forward: false })
            }
            KeyCode::Right | KeyCode::Char(' ') if FormState::is_choice(form.focus) => {
                Some(Action::FormCycle { forward: true })
            }
            _ if FormState::is_choice(form.focus) => None,
            _ => input_request(key).map(Action::FormEdit),
        }
    }

    fn id(&self) -> &'static str {
        "device_form"
    }

    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let Mode::Form(form) = &state.mode else {
            return;
        };

        let popup = centered(area, 56, 19);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(form.title())
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_focused())
            .style(theme.base());
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let mut constraints: Vec<Constraint> = FormState::FIELDS
            .iter()
            .map(|_| Constraint::Length(3))
            .collect();
        constraints.push(Constraint::Min(1));
        let rows = Layout::vertical(constraints).split(inner);

        for (i, field) in FormState::FIELDS.iter().copied().enumerate() {
            let Some(row) = rows.get(i).copied() else {
                continue;
            };
            render_field(frame, row, form, field, theme);
        }

        let hint = if form.submitting {
            Line::from(Span::styled("  Saving…", theme.key_hint()))
        } else {
            Line::from(vec![
                Span::styled("  Tab ", theme.key_hint_key()),
                Span::styled("next  ", theme.key_hint()),
                Span::styled("←/→ ", theme.key_hint_key()),
                Span::styled("choose  ", theme.key_hint()),
                Span::styled("Enter ", theme.key_hint_key()),
                Span::styled("save  ", theme.key_hint()),
                Span::styled("Esc ", theme.key_hint_key()),
                Span::styled("cancel", theme.key_hint()),
            ])
        };
        if let Some(area) = rows.last().copied() {
            frame.render_widget(Paragraph::new(hint), area);
        }
    }
}

fn render_field(frame: &mut Frame, area: Rect, form: &FormState, field: Field, theme: &Theme) {
    let focused = form.focus == field;
    let [label_area, value_area, error_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let label_style = if focused {
        theme.key_hint_key()
    } else {
        theme.key_hint()
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(format!("  {}", label(field)), label_style))),
        label_area,
    );

    let value_style = if focused {
        theme.table_selected()
    } else {
        theme.table_row()
    };
    let width = usize::from(value_area.width.saturating_sub(4));
    if let Some(input) = form.input(field) {
        let scroll = input.visual_scroll(width);
        let shown: String = input.value().chars().skip(scroll).collect();
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!("  {shown}"), value_style))),
            value_area,
        );
        if focused {
            let offset = input.visual_cursor().saturating_sub(scroll);
            let x = value_area
                .x
                .saturating_add(2)
                .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
            frame.set_cursor_position((x.min(value_area.right().saturating_sub(1)), value_area.y));
        }
    } else {
        let text = format!("  ‹ {} ›", form.value(field));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(text, value_style))),
            value_area,
        );
    }

    if let Some(message) = form.errors.get(field) {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!("  {message}"), theme.error_text()))),
            error_area,
        );
    }
}
