//! Yes/no confirmation before deleting a ticket.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;
use crate::ticket::Ticket;
use crate::ui::theme::Theme;

/// What the user decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Go ahead with ticket `id`.
    Confirm(String),
    Cancel,
}

#[derive(Debug, Clone)]
struct Pending {
    ticket_id: String,
    message: String,
}

/// A modal asking whether to delete a ticket.
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
    pending: Option<Pending>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask about deleting `ticket`.
    pub fn show_delete(&mut self, ticket: &Ticket) {
        self.pending = Some(Pending {
            ticket_id: ticket.id.clone(),
            message: format!("Delete the ticket for {}?", ticket.names),
        });
    }

    pub fn is_visible(&self) -> bool {
        self.pending.is_some()
    }

    pub fn dismiss(&mut self) {
        self.pending = None;
    }

    /// `y` confirms; `n` and Esc cancel. Other keys are swallowed while
    /// the dialog is up.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ConfirmAction> {
        let pending = self.pending.as_ref()?;
        let action = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                ConfirmAction::Confirm(pending.ticket_id.clone())
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ConfirmAction::Cancel,
            _ => return None,
        };
        self.pending = None;
        Some(action)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(pending) = &self.pending else {
            return;
        };

        let dialog = centered_rect(50, 7, area);
        frame.render_widget(Clear, dialog);

        let lines = vec![
            Line::raw(""),
            Line::styled(pending.message.as_str(), theme.text_style()),
            Line::raw(""),
            Line::from(vec![
                Span::styled("[y]", theme.accent_style()),
                Span::styled("es / ", theme.muted_style()),
                Span::styled("[n]", theme.accent_style()),
                Span::styled("o", theme.muted_style()),
            ]),
        ];
        let block = Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(theme.error_style());
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, dialog);
    }
}
