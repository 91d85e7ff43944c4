//! Ticket detail view.

use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::events::is_plain;
use crate::ticket::Ticket;
use crate::ui::theme::Theme;

/// Actions returned from the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailAction {
    /// Delete the ticket with this id.
    Delete(String),
    /// Edit the ticket being shown.
    Edit,
}

/// Shows one ticket. Holds no state of its own.
#[derive(Debug, Default)]
pub struct DetailView;

impl DetailView {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_input(&self, key: KeyEvent, ticket: &Ticket) -> Option<DetailAction> {
        if is_plain(&key, 'd') {
            Some(DetailAction::Delete(ticket.id.clone()))
        } else if is_plain(&key, 'e') {
            Some(DetailAction::Edit)
        } else {
            None
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ticket: &Ticket, theme: &Theme) {
        let field = |label: &'static str, value: &str| {
            Line::from(vec![
                Span::styled(format!("{:<10}", label), theme.muted_style()),
                Span::styled(value.to_string(), theme.text_style()),
            ])
        };

        let lines = vec![
            field("Names", &ticket.names),
            field("Location", &ticket.location),
            field("Issue", &ticket.issue),
            Line::raw(""),
            field("Opened", &ticket.time_open.format("%Y-%m-%d %H:%M UTC").to_string()),
            field("Waiting", &ticket.formatted_wait_time),
            Line::raw(""),
            Line::from(vec![
                Span::styled("e", theme.accent_style()),
                Span::styled(" edit   ", theme.muted_style()),
                Span::styled("d", theme.accent_style()),
                Span::styled(" delete", theme.muted_style()),
            ]),
        ];

        let block = Block::default()
            .title(Line::styled(" Ticket ", theme.accent_style()))
            .borders(Borders::ALL)
            .border_style(theme.muted_style());
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}
