//! Theme and styling configuration.
//!
//! The theme is built once at startup from `settings.theme` and handed to
//! [`crate::app::App`]; nothing reads it from a global.

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Body text.
    pub text: Color,
    /// Background of the action button.
    pub button_background: Color,
    /// Text on the action button.
    pub button_text: Color,
    /// Titles and the focused field.
    pub accent: Color,
    /// Secondary text such as hints and wait times.
    pub muted: Color,
    /// Errors.
    pub error: Color,
    /// Background of the selected list row.
    pub highlight_bg: Color,
}

impl Theme {
    /// Light text on a dark terminal.
    pub fn dark() -> Self {
        Self {
            text: Color::White,
            button_background: Color::Cyan,
            button_text: Color::Black,
            accent: Color::Yellow,
            muted: Color::DarkGray,
            error: Color::Red,
            highlight_bg: Color::DarkGray,
        }
    }

    /// Dark text on a light terminal.
    pub fn light() -> Self {
        Self {
            text: Color::Black,
            button_background: Color::Blue,
            button_text: Color::White,
            accent: Color::Magenta,
            muted: Color::Gray,
            error: Color::Red,
            highlight_bg: Color::LightCyan,
        }
    }

    /// Look a theme up by its config name. Unknown names get `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    /// The action button.
    pub fn button_style(&self) -> Style {
        Style::default()
            .fg(self.button_text)
            .bg(self.button_background)
            .add_modifier(Modifier::BOLD)
    }

    /// The selected list row.
    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
