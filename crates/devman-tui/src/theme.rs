//! Light and dark palettes plus the semantic styles built from them.

use ratatui::style::{Color, Modifier, Style};

use devman_core::DeviceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// Resolved colors for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub highlight: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub bg: Color,
    pub bg_selected: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            accent: Color::Rgb(225, 53, 255),    // #e135ff
            highlight: Color::Rgb(128, 255, 234), // #80ffea
            text: Color::Rgb(189, 193, 207),
            muted: Color::Rgb(98, 114, 164),
            border: Color::Rgb(98, 114, 164),
            bg: Color::Rgb(30, 31, 41),
            bg_selected: Color::Rgb(40, 42, 54),
            success: Color::Rgb(80, 250, 123),
            warning: Color::Rgb(241, 250, 140),
            error: Color::Rgb(255, 99, 99),
        }
    }

    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(136, 57, 239),
            highlight: Color::Rgb(4, 120, 140),
            text: Color::Rgb(40, 42, 54),
            muted: Color::Rgb(110, 115, 141),
            border: Color::Rgb(156, 160, 176),
            bg: Color::Rgb(239, 241, 245),
            bg_selected: Color::Rgb(220, 224, 232),
            success: Color::Rgb(30, 130, 60),
            warning: Color::Rgb(180, 120, 10),
            error: Color::Rgb(200, 40, 50),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.bg)
    }

    /// Title text for blocks/panels.
    pub fn title(&self) -> Style {
        Style::default().fg(self.highlight).add_modifier(Modifier::BOLD)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn border_default(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn table_header(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn table_row(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn table_selected(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.bg_selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn key_hint_key(&self) -> Style {
        Style::default().fg(self.highlight).add_modifier(Modifier::BOLD)
    }

    pub fn error_text(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn status(&self, status: DeviceStatus) -> Style {
        let color = match status {
            DeviceStatus::Online => self.success,
            DeviceStatus::Offline => self.error,
            DeviceStatus::Unknown => self.warning,
        };
        Style::default().fg(color)
    }
}

/// Single-character status glyph for table rows.
pub fn status_glyph(status: DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Online => "●",
        DeviceStatus::Offline => "○",
        DeviceStatus::Unknown => "◐",
    }
}
