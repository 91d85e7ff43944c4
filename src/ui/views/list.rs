//! Ticket list view.
//!
//! Renders the queue in the order the store delivered it and turns
//! Enter on a row into a selection request. The view only remembers which
//! row the cursor is on; the tickets themselves are passed in every frame.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::events::{is_down, is_plain, is_up};
use crate::ticket::Ticket;
use crate::ui::theme::Theme;

/// Actions returned from the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    /// Open the ticket with this id.
    Select(String),
}

/// The ticket list view.
#[derive(Debug, Default)]
pub struct TicketListView {
    state: TableState,
}

impl TicketListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor row, clamped to `len`.
    pub fn selected_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.state.selected().unwrap_or(0).min(len - 1))
    }

    fn select(&mut self, index: usize) {
        self.state.select(Some(index));
    }

    /// Handle keyboard input against the tickets currently on screen.
    pub fn handle_input(&mut self, key: KeyEvent, tickets: &[Ticket]) -> Option<ListAction> {
        let current = self.selected_index(tickets.len())?;
        let last = tickets.len() - 1;

        if is_down(&key) {
            self.select((current + 1).min(last));
        } else if is_up(&key) {
            self.select(current.saturating_sub(1));
        } else if key.code == KeyCode::Home || is_plain(&key, 'g') {
            self.select(0);
        } else if key.code == KeyCode::End || is_plain(&key, 'G') {
            self.select(last);
        } else if key.code == KeyCode::Enter {
            return Some(ListAction::Select(tickets[current].id.clone()));
        }
        None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, tickets: &[Ticket], theme: &Theme) {
        let block = Block::default()
            .title(Line::styled(
                format!(" Queue ({}) ", tickets.len()),
                theme.accent_style(),
            ))
            .borders(Borders::ALL)
            .border_style(theme.muted_style());

        if tickets.is_empty() {
            let empty = Paragraph::new("The queue is empty.")
                .style(theme.muted_style())
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let selected = self.selected_index(tickets.len());
        self.state.select(selected);

        let header = Row::new(["Names", "Location", "Issue", "Waiting"])
            .style(theme.accent_style());
        let rows = tickets.iter().map(|ticket| {
            Row::new(vec![
                Cell::from(ticket.names.as_str()),
                Cell::from(ticket.location.as_str()),
                Cell::from(ticket.issue.as_str()),
                Cell::from(ticket.formatted_wait_time.as_str()).style(theme.muted_style()),
            ])
            .style(theme.text_style())
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(25),
                Constraint::Percentage(20),
                Constraint::Percentage(35),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(block)
        .highlight_style(theme.highlight_style())
        .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn ticket(id: &str, names: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            names: names.to_string(),
            location: "Lobby".to_string(),
            issue: "Printer".to_string(),
            time_open: Utc::now(),
            formatted_wait_time: "3 minutes".to_string(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn tickets() -> Vec<Ticket> {
        vec![ticket("t1", "Alice"), ticket("t2", "Bob"), ticket("t3", "Cy")]
    }

    #[test]
    fn test_enter_selects_first_row_by_default() {
        let mut view = TicketListView::new();
        assert_eq!(
            view.handle_input(key(KeyCode::Enter), &tickets()),
            Some(ListAction::Select("t1".to_string()))
        );
    }

    #[test]
    fn test_movement_is_clamped() {
        let mut view = TicketListView::new();
        let tickets = tickets();

        view.handle_input(key(KeyCode::Char('k')), &tickets);
        assert_eq!(view.selected_index(3), Some(0));

        for _ in 0..5 {
            view.handle_input(key(KeyCode::Char('j')), &tickets);
        }
        assert_eq!(view.selected_index(3), Some(2));

        view.handle_input(key(KeyCode::Char('g')), &tickets);
        assert_eq!(view.selected_index(3), Some(0));
        view.handle_input(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT), &tickets);
        assert_eq!(
            view.handle_input(key(KeyCode::Enter), &tickets),
            Some(ListAction::Select("t3".to_string()))
        );
    }

    #[test]
    fn test_cursor_follows_shrinking_list() {
        let mut view = TicketListView::new();
        let all = tickets();
        view.handle_input(key(KeyCode::End), &all);

        let shorter = &all[..1];
        assert_eq!(
            view.handle_input(key(KeyCode::Enter), shorter),
            Some(ListAction::Select("t1".to_string()))
        );
    }

    #[test]
    fn test_empty_list_ignores_keys() {
        let mut view = TicketListView::new();
        assert_eq!(view.handle_input(key(KeyCode::Enter), &[]), None);
        assert_eq!(view.selected_index(0), None);
    }

    #[test]
    fn test_render_shows_tickets_and_wait_times() {
        let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
        let mut view = TicketListView::new();
        let tickets = tickets();

        terminal
            .draw(|frame| view.render(frame, frame.area(), &tickets, &Theme::dark()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Queue (3)"));
        assert!(text.contains("Alice"));
        assert!(text.contains("3 minutes"));
    }
}
