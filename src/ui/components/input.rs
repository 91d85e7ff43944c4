//! Single-line text input used by the ticket form.
//!
//! The cursor counts characters, not bytes, so names with accents or
//! emoji edit cleanly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::theme::Theme;

/// A text input widget.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    /// Cursor position in characters.
    cursor: usize,
    placeholder: String,
}

impl TextInput {
    /// Create a new empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty input showing `placeholder` until something is typed.
    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the value and move the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn len_chars(&self) -> usize {
        self.value.chars().count()
    }

    /// Handle keyboard input.
    ///
    /// Returns true if the value changed.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            (KeyCode::Backspace, _) => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            (KeyCode::Delete, _) => {
                if self.cursor >= self.len_chars() {
                    return false;
                }
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len_chars());
                false
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                false
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len_chars();
                false
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                if self.value.is_empty() {
                    return false;
                }
                self.clear();
                true
            }
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => self.delete_word(),
            _ => false,
        }
    }

    fn delete_word(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let chars: Vec<char> = self.value.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let from = self.byte_index(start);
        let to = self.byte_index(self.cursor);
        self.value.replace_range(from..to, "");
        self.cursor = start;
        true
    }

    /// Render the input in a bordered box titled `label`.
    pub fn render_with_label(
        &self,
        frame: &mut Frame,
        area: Rect,
        label: &str,
        focused: bool,
        theme: &Theme,
    ) {
        let showing_placeholder = self.value.is_empty() && !self.placeholder.is_empty();
        let display = if showing_placeholder {
            self.placeholder.as_str()
        } else {
            self.value.as_str()
        };

        let style = if showing_placeholder {
            theme.muted_style()
        } else {
            theme.text_style()
        };
        let (border_style, title_style) = if focused {
            (theme.accent_style(), theme.accent_style())
        } else {
            (theme.muted_style(), theme.text_style())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);
        frame.render_widget(Paragraph::new(display).style(style).block(block), area);

        if focused {
            let cursor_x = area.x + 1 + self.cursor as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(Position::new(cursor_x, area.y + 1));
            }
        }
    }
}
