//! Application core: event loop, action dispatch, store effects and the
//! frame chrome around the devices screen.

use std::time::{Duration, Instant};

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use devman_core::{DeviceStore, NotificationLevel};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, Rates, spawn_event_reader};
use crate::screens::devices::DevicesScreen;
use crate::state::{AppState, Effect, Mode};
use crate::theme::{Theme, ThemeMode};
use crate::tui::Tui;
use crate::widgets::{centered, form::DeviceForm};

const RATES: Rates = Rates {
    tick: Duration::from_millis(250),
    render: Duration::from_millis(33),
};

/// Top-level application: owns the store handle, UI state and the loop.
pub struct App {
    store: DeviceStore,
    poll_interval: Duration,
    state: AppState,
    screen: DevicesScreen,
    form: DeviceForm,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(store: DeviceStore, poll_interval: Duration, theme: ThemeMode) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            store,
            poll_interval,
            state: AppState::new(theme),
            screen: DevicesScreen,
            form: DeviceForm,
            running: true,
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Run until the user quits. Polling starts here and stops on exit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let bridge = tokio::spawn(spawn_data_bridge(
            self.store.clone(),
            self.action_tx.clone(),
            self.cancel.child_token(),
        ));
        self.store.start_polling(self.poll_interval);

        let (mut events, reader) = spawn_event_reader(RATES, self.cancel.child_token());
        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.recv().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key) {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                } else {
                    self.process_action(&action);
                }
            }
        }

        self.cancel.cancel();
        self.store.shutdown();
        let _ = tokio::join!(bridge, reader);
        tui.exit()?;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Overlays capture keys first; the screen sees what is left.
    fn handle_key_event(&self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match &self.state.mode {
            Mode::Help => match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            },
            Mode::ConfirmDelete { .. } => match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            },
            Mode::Form(_) => self.dispatch_key(&self.form, key),
            Mode::Browse | Mode::Search => self.dispatch_key(&self.screen, key),
        }
    }

    fn dispatch_key(&self, component: &dyn Component, key: KeyEvent) -> Option<Action> {
        trace!(component = component.id(), code = ?key.code, "dispatching key");
        component.handle_key_event(key, &self.state)
    }

    fn process_action(&mut self, action: &Action) {
        if !matches!(action, Action::Tick | Action::Render) {
            trace!(?action, "processing action");
        }
        if let Some(effect) = self.state.update(action, Instant::now()) {
            self.run_effect(effect);
        }
    }

    /// Start store work in the background. Outcomes come back through the
    /// data bridge as notifications; form submissions also report
    /// `FormFinished` so the popup can close or re-enable.
    fn run_effect(&mut self, effect: Effect) {
        debug!(?effect, "running effect");
        let store = self.store.clone();
        let tx = self.action_tx.clone();
        match effect {
            Effect::Quit => self.running = false,
            Effect::Refresh => {
                tokio::spawn(async move {
                    let _ = store.refresh().await;
                });
            }
            Effect::Create(input) => {
                tokio::spawn(async move {
                    let ok = store.create(&input).await.is_ok();
                    let _ = tx.send(Action::FormFinished { ok });
                });
            }
            Effect::Update(id, input) => {
                tokio::spawn(async move {
                    let ok = store.update(&id, &input).await.is_ok();
                    let _ = tx.send(Action::FormFinished { ok });
                });
            }
            Effect::Delete(id) => {
                tokio::spawn(async move {
                    let _ = store.delete(&id).await;
                });
            }
            Effect::CheckStatus(id) => {
                tokio::spawn(async move {
                    let _ = store.check_status(&id).await;
                });
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let theme = Theme::for_mode(self.state.theme);
        let area = frame.area();
        frame.render_widget(Block::default().style(theme.base()), area);

        let banner_height = u16::from(!self.state.available);
        let [header_area, banner_area, content_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(frame, header_area, &theme);
        if !self.state.available {
            render_banner(frame, banner_area, &theme);
        }
        self.screen.render(frame, content_area, &self.state, &theme);
        self.render_status_bar(frame, status_area, &theme);

        match &self.state.mode {
            Mode::Form(_) => self.form.render(frame, area, &self.state, &theme),
            Mode::ConfirmDelete { name, .. } => render_confirm(frame, area, name, &theme),
            Mode::Help => render_help(frame, area, &theme),
            Mode::Browse | Mode::Search => {}
        }

        if let Some(toast) = &self.state.toast {
            render_toast(frame, area, toast.notification.level, &toast.notification.message, &theme);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let indicator = if self.state.available {
            Span::styled("● connected", theme.status(devman_core::DeviceStatus::Online))
        } else {
            Span::styled("○ unavailable", theme.error_text())
        };
        let mut spans = vec![
            Span::styled(" devman ", theme.title()),
            Span::styled(format!(" {}  ", self.store.base_url()), theme.key_hint()),
            indicator,
        ];
        if self.state.loading {
            spans.push(Span::styled("  ◐ refreshing…", theme.key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let refreshed = self.store.last_refresh().map_or_else(
            || "never".to_owned(),
            |at| at.with_timezone(&Local).format("%H:%M:%S").to_string(),
        );
        let line = Line::from(vec![
            Span::styled(format!(" Last refresh {refreshed}"), theme.key_hint()),
            Span::styled(format!(" │ theme {}", self.state.theme.label()), theme.key_hint()),
            Span::styled(" │ ", theme.key_hint()),
            Span::styled("t ", theme.key_hint_key()),
            Span::styled("theme  ", theme.key_hint()),
            Span::styled("? ", theme.key_hint_key()),
            Span::styled("help  ", theme.key_hint()),
            Span::styled("q ", theme.key_hint_key()),
            Span::styled("quit", theme.key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_banner(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = " Device service unavailable. Showing last known data; changes are disabled. Press r to retry.";
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, theme.error_text()))),
        area,
    );
}

fn render_confirm(frame: &mut Frame, area: Rect, name: &str, theme: &Theme) {
    let popup = centered(area, 48, 6);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Delete device ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.error_text())
        .style(theme.base());
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  Delete {name}?"), theme.table_row())),
        Line::from(vec![
            Span::styled("  y ", theme.key_hint_key()),
            Span::styled("delete  ", theme.key_hint()),
            Span::styled("n/Esc ", theme.key_hint_key()),
            Span::styled("cancel", theme.key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered(area, 60, 24);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_focused())
        .style(theme.base());

    let section = |title: &'static str| Line::from(Span::styled(format!("  {title}"), theme.title()));
    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<12}"), theme.key_hint_key()),
            Span::styled(what, theme.key_hint()),
        ])
    };
    let lines = vec![
        Line::from(""),
        section("Navigation"),
        entry("j/k ↑/↓", "Move up / down"),
        entry("g/G", "Top / bottom"),
        entry("Ctrl+d/u", "Page down / up"),
        entry("Enter", "Toggle detail panel"),
        entry("Esc", "Close detail, then clear filters"),
        Line::from(""),
        section("Search, filter, sort"),
        entry("/", "Search name, IP, type, location"),
        entry("f / s", "Cycle type / status filter"),
        entry("x", "Clear all filters"),
        entry("1-5", "Sort by column (again to reverse)"),
        Line::from(""),
        section("Devices"),
        entry("r", "Refresh now"),
        entry("n", "Add device"),
        entry("e", "Edit selected"),
        entry("d", "Delete selected"),
        entry("c", "Check live status"),
        Line::from(""),
        entry("t", "Toggle light / dark theme"),
        entry("q", "Quit"),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_toast(frame: &mut Frame, area: Rect, level: NotificationLevel, message: &str, theme: &Theme) {
    let text_width = u16::try_from(message.chars().count()).unwrap_or(u16::MAX);
    let width = text_width.saturating_add(4).min(area.width.saturating_sub(2)).max(12);
    let height = 3;
    let rect = Rect::new(
        area.right().saturating_sub(width + 1),
        area.bottom().saturating_sub(height + 1),
        width.min(area.width),
        height.min(area.height),
    );
    let style = match level {
        NotificationLevel::Success => theme.status(devman_core::DeviceStatus::Online),
        NotificationLevel::Error => theme.error_text(),
        NotificationLevel::Info => theme.border_focused(),
    };
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(style)
        .style(theme.base());
    frame.render_widget(
        Paragraph::new(Span::styled(message.to_owned(), style))
            .wrap(Wrap { trim: true })
            .block(block),
        rect,
    );
}
