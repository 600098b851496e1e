//! Devices screen: filter line, sortable table, detail panel and search box.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use devman_core::{Device, SortDirection, SortKey};

use crate::action::Action;
use crate::component::Component;
use crate::state::{AppState, Mode};
use crate::theme::{Theme, status_glyph};
use crate::widgets::input_request;

/// Column order; the number keys 1-5 sort by the matching column.
const COLUMNS: [(SortKey, &str); 5] = [
    (SortKey::Name, "Name"),
    (SortKey::IpAddress, "IP"),
    (SortKey::Type, "Type"),
    (SortKey::Location, "Location"),
    (SortKey::Status, "Status"),
];

pub struct DevicesScreen;

impl DevicesScreen {
    fn search_key(key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::CloseSearch { clear: true }),
            KeyCode::Enter => Some(Action::CloseSearch { clear: false }),
            _ => input_request(key).map(Action::SearchEdit),
        }
    }

    fn browse_key(key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Char('d') if ctrl => Action::PageDown,
            KeyCode::Char('u') if ctrl => Action::PageUp,
            _ if ctrl => return None,

            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::SelectNext,
            KeyCode::Char('k') | KeyCode::Up => Action::SelectPrev,
            KeyCode::Char('g') | KeyCode::Home => Action::SelectFirst,
            KeyCode::Char('G') | KeyCode::End => Action::SelectLast,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Enter => Action::ToggleDetail,
            KeyCode::Esc => Action::Back,

            KeyCode::Char('/') => Action::OpenSearch,
            KeyCode::Char('f') => Action::CycleTypeFilter,
            KeyCode::Char('s') => Action::CycleStatusFilter,
            KeyCode::Char('x') => Action::ClearFilters,
            KeyCode::Char(c @ '1'..='5') => {
                let ((key, _), _) = COLUMNS.iter().zip('1'..='5').find(|(_, n)| *n == c)?;
                Action::SortBy(*key)
            }

            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('n' | 'a') => Action::OpenCreateForm,
            KeyCode::Char('e') => Action::OpenEditForm,
            KeyCode::Char('d') | KeyCode::Delete => Action::RequestDelete,
            KeyCode::Char('c') => Action::CheckStatus,

            KeyCode::Char('t') => Action::ToggleTheme,
            KeyCode::Char('?') => Action::ToggleHelp,
            _ => return None,
        };
        Some(action)
    }

    fn render_filter_line(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let arrow = match state.sort.direction {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        };
        let count = if state.filter.is_active() {
            format!("{} of {} devices", state.visible.len(), state.devices.len())
        } else {
            format!("{} devices", state.devices.len())
        };
        let line = Line::from(vec![
            Span::styled(" Type: ", theme.key_hint()),
            Span::styled(format!("[{}]", state.filter.device_type), theme.key_hint_key()),
            Span::styled("  Status: ", theme.key_hint()),
            Span::styled(format!("[{}]", state.filter.status), theme.key_hint_key()),
            Span::styled("  Sort: ", theme.key_hint()),
            Span::styled(format!("[{} {arrow}]", state.sort.key), theme.key_hint_key()),
            Span::styled(format!("  {count}"), theme.key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        if state.visible.is_empty() {
            let message = if state.loading && state.devices.is_empty() {
                "Loading devices…"
            } else if state.devices.is_empty() {
                "No devices yet. Press n to add one."
            } else {
                "No devices match the current filters. Press x to clear them."
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(format!("  {message}"), theme.key_hint()))),
                area,
            );
            return;
        }

        let arrow = match state.sort.direction {
            SortDirection::Asc => " ↑",
            SortDirection::Desc => " ↓",
        };
        let mut header_cells = vec![Cell::from(" ").style(theme.table_header())];
        header_cells.extend(COLUMNS.iter().enumerate().map(|(i, (key, label))| {
            let suffix = if *key == state.sort.key { arrow } else { "" };
            Cell::from(format!("{}·{label}{suffix}", i + 1)).style(theme.table_header())
        }));
        let header = Row::new(header_cells);

        let rows: Vec<Row> = state
            .visible
            .iter()
            .enumerate()
            .map(|(i, dev)| {
                let is_selected = i == state.selected;
                let prefix = if is_selected { "▸" } else { " " };
                let name_style = Style::default().fg(theme.highlight).add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });
                Row::new(vec![
                    Cell::from(format!("{prefix}{}", status_glyph(dev.status)))
                        .style(theme.status(dev.status)),
                    Cell::from(dev.name.clone()).style(name_style),
                    Cell::from(dev.ip_address.clone()),
                    Cell::from(dev.device_type.to_string()),
                    Cell::from(dev.location.clone()),
                    Cell::from(dev.status.to_string()).style(theme.status(dev.status)),
                ])
                .style(theme.table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(14),
            Constraint::Length(17),
            Constraint::Length(10),
            Constraint::Min(10),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme.table_selected());

        let mut table_state = TableState::default().with_selected(Some(state.selected));
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_detail(frame: &mut Frame, area: Rect, device: &Device, theme: &Theme) {
        let block = Block::default()
            .title(format!(" {} ", device.name))
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let row = |label: &str, value: Span<'static>| {
            Line::from(vec![Span::styled(format!("  {label:<10}"), theme.key_hint()), value])
        };
        let lines = vec![
            Line::from(""),
            row("ID", Span::styled(device.id.to_string(), theme.table_row())),
            row("IP", Span::styled(device.ip_address.clone(), theme.table_row())),
            row("Type", Span::styled(device.device_type.to_string(), theme.table_row())),
            row("Location", Span::styled(device.location.clone(), theme.table_row())),
            row(
                "Status",
                Span::styled(
                    format!("{} {}", status_glyph(device.status), device.status),
                    theme.status(device.status),
                ),
            ),
            Line::from(""),
            Line::from(vec![
                Span::styled("  e ", theme.key_hint_key()),
                Span::styled("edit  ", theme.key_hint()),
                Span::styled("d ", theme.key_hint_key()),
                Span::styled("delete  ", theme.key_hint()),
                Span::styled("c ", theme.key_hint_key()),
                Span::styled("check status", theme.key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_search(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let editing = matches!(state.mode, Mode::Search);
        let prompt_style = if editing {
            theme.key_hint_key()
        } else {
            theme.key_hint()
        };
        let width = usize::from(area.width.saturating_sub(4));
        let scroll = state.search.visual_scroll(width);
        let shown: String = state.search.value().chars().skip(scroll).collect();
        let line = Line::from(vec![
            Span::styled(" / ", prompt_style),
            Span::styled(shown, theme.table_row()),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        if editing {
            let offset = state.search.visual_cursor().saturating_sub(scroll);
            let x = area
                .x
                .saturating_add(3)
                .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        }
    }

    fn render_hints(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let pairs: &[(&str, &str)] = if matches!(state.mode, Mode::Search) {
            &[("Enter ", "keep  "), ("Esc ", "clear")]
        } else if state.can_write() {
            &[
                ("j/k ", "move  "),
                ("/ ", "search  "),
                ("f/s ", "filter  "),
                ("1-5 ", "sort  "),
                ("n ", "add  "),
                ("e ", "edit  "),
                ("d ", "delete  "),
                ("r ", "refresh"),
            ]
        } else {
            &[
                ("j/k ", "move  "),
                ("/ ", "search  "),
                ("f/s ", "filter  "),
                ("1-5 ", "sort  "),
                ("r ", "retry"),
            ]
        };
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in pairs {
            spans.push(Span::styled(*key, theme.key_hint_key()));
            spans.push(Span::styled(*label, theme.key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for DevicesScreen {
    fn handle_key_event(&self, key: KeyEvent, state: &AppState) -> Option<Action> {
        match state.mode {
            Mode::Search => Self::search_key(key),
            Mode::Browse => Self::browse_key(key),
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let block = Block::default()
            .title(" Devices ")
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if matches!(state.mode, Mode::Browse | Mode::Search) {
                theme.border_focused()
            } else {
                theme.border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let show_search = matches!(state.mode, Mode::Search) || !state.filter.query.is_empty();
        let [filter_area, body_area, search_area, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(u16::from(show_search)),
            Constraint::Length(1),
        ])
        .areas(inner);

        Self::render_filter_line(frame, filter_area, state, theme);

        let detail = state.selected_device().filter(|_| state.detail_open);
        if let Some(device) = detail {
            let [table_area, detail_area] =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(body_area);
            Self::render_table(frame, table_area, state, theme);
            Self::render_detail(frame, detail_area, device, theme);
        } else {
            Self::render_table(frame, body_area, state, theme);
        }

        if show_search {
            Self::render_search(frame, search_area, state, theme);
        }
        Self::render_hints(frame, hint_area, state, theme);
    }

    fn id(&self) -> &'static str {
        "devices"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tui_input::InputRequest;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn action_name(action: Option<Action>) -> String {
        format!("{action:?}")
    }

    #[test]
    fn browse_keys_map_to_actions() {
        let state = AppState::default();
        let screen = DevicesScreen;
        let cases = [
            (KeyCode::Char('j'), "Some(SelectNext)"),
            (KeyCode::Char('/'), "Some(OpenSearch)"),
            (KeyCode::Char('f'), "Some(CycleTypeFilter)"),
            (KeyCode::Char('2'), "Some(SortBy(IpAddress))"),
            (KeyCode::Char('n'), "Some(OpenCreateForm)"),
            (KeyCode::Char('d'), "Some(RequestDelete)"),
            (KeyCode::Char('9'), "None"),
        ];
        for (code, expected) in cases {
            assert_eq!(action_name(screen.handle_key_event(key(code), &state)), expected);
        }
    }

    #[test]
    fn ctrl_d_pages_instead_of_deleting() {
        let state = AppState::default();
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert!(matches!(
            DevicesScreen.handle_key_event(ctrl_d, &state),
            Some(Action::PageDown)
        ));
    }

    #[test]
    fn search_mode_routes_text_to_the_query() {
        let state = AppState {
            mode: Mode::Search,
            ..AppState::default()
        };
        assert!(matches!(
            DevicesScreen.handle_key_event(key(KeyCode::Char('q')), &state),
            Some(Action::SearchEdit(InputRequest::InsertChar('q')))
        ));
        assert!(matches!(
            DevicesScreen.handle_key_event(key(KeyCode::Esc), &state),
            Some(Action::CloseSearch { clear: true })
        ));
    }
}
