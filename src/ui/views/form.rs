//! New-ticket and edit-ticket form.
//!
//! One view serves both screens: it starts blank for a new ticket or
//! pre-filled from the ticket being edited. Tab and Shift+Tab move focus;
//! Enter advances, and on the Submit button validates and submits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ticket::{Ticket, TicketFields};
use crate::ui::components::TextInput;
use crate::ui::theme::Theme;

/// Focusable parts of the form, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Names,
    Location,
    Issue,
    Submit,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Names => FormField::Location,
            FormField::Location => FormField::Issue,
            FormField::Issue => FormField::Submit,
            FormField::Submit => FormField::Names,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Names => FormField::Submit,
            FormField::Location => FormField::Names,
            FormField::Issue => FormField::Location,
            FormField::Submit => FormField::Issue,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FormField::Names => "Names",
            FormField::Location => "Location",
            FormField::Issue => "Issue",
            FormField::Submit => "Submit",
        }
    }
}

/// Actions returned from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// The form is valid; save these (trimmed) fields.
    Submit(TicketFields),
}

/// The ticket form.
#[derive(Debug, Default)]
pub struct TicketFormView {
    /// Id of the ticket being edited, `None` for a new ticket.
    editing: Option<String>,
    names: TextInput,
    location: TextInput,
    issue: TextInput,
    focus: FormField,
    error: Option<String>,
    submitting: bool,
}

impl TicketFormView {
    /// A blank form for a new ticket.
    pub fn new_ticket() -> Self {
        Self {
            names: TextInput::with_placeholder("Who needs help?"),
            location: TextInput::with_placeholder("Where are you?"),
            issue: TextInput::with_placeholder("What's going on?"),
            ..Self::default()
        }
    }

    /// A form pre-filled from `ticket`.
    pub fn edit(ticket: &Ticket) -> Self {
        let mut form = Self::new_ticket();
        form.editing = Some(ticket.id.clone());
        form.names.set_value(ticket.names.as_str());
        form.location.set_value(ticket.location.as_str());
        form.issue.set_value(ticket.issue.as_str());
        form
    }

    /// Id of the ticket this form edits.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current field values, untrimmed.
    pub fn fields(&self) -> TicketFields {
        TicketFields::new(self.names.value(), self.location.value(), self.issue.value())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Re-enable the form after a failed write.
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            FormField::Names => Some(&mut self.names),
            FormField::Location => Some(&mut self.location),
            FormField::Issue => Some(&mut self.issue),
            FormField::Submit => None,
        }
    }

    fn try_submit(&mut self) -> Option<FormAction> {
        let fields = self.fields();
        let missing = fields.missing();
        if !missing.is_empty() {
            self.error = Some(format!("Please fill in: {}", missing.join(", ")));
            return None;
        }
        self.error = None;
        self.submitting = true;
        Some(FormAction::Submit(fields.trimmed()))
    }

    /// Handle keyboard input. Esc is left to the caller.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<FormAction> {
        if self.submitting {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.focus = self.focus.next();
                None
            }
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) => {
                self.focus = self.focus.prev();
                None
            }
            (KeyCode::Enter, _) if self.focus == FormField::Submit => self.try_submit(),
            (KeyCode::Enter, _) => {
                self.focus = self.focus.next();
                None
            }
            _ => {
                if let Some(input) = self.focused_input() {
                    if input.handle_input(key) {
                        self.error = None;
                    }
                }
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let title = if self.editing.is_some() {
            " Edit ticket "
        } else {
            " New ticket "
        };
        let block = Block::default()
            .title(Line::styled(title, theme.accent_style()))
            .borders(Borders::ALL)
            .border_style(theme.muted_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let inputs = [
            (FormField::Names, &self.names),
            (FormField::Location, &self.location),
            (FormField::Issue, &self.issue),
        ];
        for (i, (field, input)) in inputs.into_iter().enumerate() {
            input.render_with_label(frame, chunks[i], field.label(), self.focus == field, theme);
        }

        let submit_label = if self.submitting {
            "Saving..."
        } else {
            FormField::Submit.label()
        };
        let submit_style = if self.focus == FormField::Submit {
            theme.button_style()
        } else {
            theme.text_style()
        };
        frame.render_widget(
            Paragraph::new(format!("[ {} ]", submit_label))
                .style(submit_style)
                .alignment(Alignment::Center),
            chunks[3],
        );

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(error.as_str())
                    .style(theme.error_style())
                    .alignment(Alignment::Center),
                chunks[4],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(form: &mut TicketFormView, s: &str) {
        for c in s.chars() {
            form.handle_input(key(KeyCode::Char(c)));
        }
    }

    fn fill(form: &mut TicketFormView, names: &str, location: &str, issue: &str) {
        type_str(form, names);
        form.handle_input(key(KeyCode::Tab));
        type_str(form, location);
        form.handle_input(key(KeyCode::Tab));
        type_str(form, issue);
        form.handle_input(key(KeyCode::Tab));
    }

    #[test]
    fn test_focus_cycles() {
        let mut form = TicketFormView::new_ticket();
        assert_eq!(form.focus(), FormField::Names);

        form.handle_input(key(KeyCode::Tab));
        assert_eq!(form.focus(), FormField::Location);
        form.handle_input(key(KeyCode::Enter));
        assert_eq!(form.focus(), FormField::Issue);
        form.handle_input(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(form.focus(), FormField::Location);
        form.handle_input(key(KeyCode::BackTab));
        form.handle_input(key(KeyCode::BackTab));
        assert_eq!(form.focus(), FormField::Submit);
    }

    #[test]
    fn test_submit_trims_fields() {
        let mut form = TicketFormView::new_ticket();
        fill(&mut form, " Alice ", "Lobby", "Printer jam ");

        let action = form.handle_input(key(KeyCode::Enter));

        assert_eq!(
            action,
            Some(FormAction::Submit(TicketFields::new("Alice", "Lobby", "Printer jam")))
        );
        assert!(form.is_submitting());
    }

    #[test]
    fn test_blank_fields_block_submit() {
        let mut form = TicketFormView::new_ticket();
        fill(&mut form, "Alice", "   ", "");

        assert_eq!(form.handle_input(key(KeyCode::Enter)), None);
        assert_eq!(form.error(), Some("Please fill in: location, issue"));
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_submitting_form_ignores_input() {
        let mut form = TicketFormView::new_ticket();
        fill(&mut form, "a", "b", "c");
        form.handle_input(key(KeyCode::Enter));

        form.handle_input(key(KeyCode::Tab));
        assert_eq!(form.focus(), FormField::Submit);

        form.set_submitting(false);
        form.handle_input(key(KeyCode::Tab));
        assert_eq!(form.focus(), FormField::Names);
    }

    #[test]
    fn test_edit_prefills() {
        let ticket = Ticket {
            id: "t4".to_string(),
            names: "Dana".to_string(),
            location: "Desk 3".to_string(),
            issue: "Badge".to_string(),
            time_open: Utc::now(),
            formatted_wait_time: "2 minutes".to_string(),
        };
        let mut form = TicketFormView::edit(&ticket);
        assert_eq!(form.editing(), Some("t4"));
        assert_eq!(form.fields(), ticket.fields());

        type_str(&mut form, " Lee");
        assert_eq!(form.fields().names, "Dana Lee");
    }

    #[test]
    fn test_render_titles_and_error() {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        let mut form = TicketFormView::new_ticket();
        form.handle_input(key(KeyCode::BackTab));
        form.handle_input(key(KeyCode::Enter));

        terminal
            .draw(|frame| form.render(frame, frame.area(), &Theme::dark()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("New ticket"));
        assert!(text.contains("Who needs help?"));
        assert!(text.contains("[ Submit ]"));
        assert!(text.contains("Please fill in: names, location, issue"));
    }
}
