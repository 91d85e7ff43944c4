//! Main application state and event handling.
//!
//! This module implements The Elm Architecture (TEA) pattern: [`App::update`]
//! folds terminal events into state, [`App::handle_message`] folds results
//! from background tasks, and [`App::view`] renders the current state. The
//! queue semantics live in [`QueueController`]; `App` maps keys onto it and
//! owns the widgets.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::error::AppError;
use crate::events::{is_force_quit, is_plain, Event};
use crate::queue::{Completion, Feedback, NavigationMode, QueueController, Screen, StoreCommand};
use crate::tasks::{FeedEvent, QueueMessage};
use crate::ui::{
    ConfirmAction, ConfirmDialog, DetailAction, DetailView, FormAction, ListAction,
    Notification, NotificationManager, Theme, TicketFormView, TicketListView,
};

/// Shown instead of everything else while nobody is signed in.
pub const SIGN_IN_PROMPT: &str = "You must be signed in to access the queue.";

/// The main application struct that holds all state.
pub struct App {
    controller: QueueController,
    theme: Theme,
    /// Shown in the header, e.g. the profile name or "demo".
    context_label: String,
    should_quit: bool,
    list_view: TicketListView,
    detail_view: DetailView,
    /// Present exactly while the controller is creating or editing.
    form: Option<TicketFormView>,
    confirm: ConfirmDialog,
    notifications: NotificationManager,
}

impl App {
    /// Create a new application around `controller`.
    pub fn new(controller: QueueController, theme: Theme, context_label: impl Into<String>) -> Self {
        debug!("Creating new application instance");
        Self {
            controller,
            theme,
            context_label: context_label.into(),
            should_quit: false,
            list_view: TicketListView::new(),
            detail_view: DetailView::new(),
            form: None,
            confirm: ConfirmDialog::new(),
            notifications: NotificationManager::new(),
        }
    }

    pub fn controller(&self) -> &QueueController {
        &self.controller
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        info!("Quit requested");
        self.should_quit = true;
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    /// Show a transient error without touching navigation.
    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notifications.error(message);
    }

    pub fn notify_info(&mut self, message: impl Into<String>) {
        self.notifications.info(message);
    }

    /// Surface an error that did not come from a store write.
    ///
    /// Critical errors end the session on the error screen. Anything else
    /// is a toast.
    pub fn handle_error(&mut self, error: &AppError) {
        if error.is_critical() {
            warn!(error = %error, "Critical error occurred");
            self.controller.feed_failed(error.user_message());
            self.confirm.dismiss();
        } else {
            debug!(error = %error, "Recoverable error occurred");
            self.notify_error(error.user_message());
        }
    }

    /// Handle a terminal event.
    ///
    /// Returns the store write the user asked for, if any. The caller runs
    /// it and reports back through [`App::handle_message`].
    pub fn update(&mut self, event: Event) -> Option<StoreCommand> {
        let command = match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
                None
            }
            Event::Tick => {
                self.notifications.tick();
                None
            }
        };
        self.sync_form();
        command
    }

    /// Handle a result from a background task.
    pub fn handle_message(&mut self, message: QueueMessage) {
        match message {
            QueueMessage::Feed(FeedEvent::Snapshot(snapshot)) => {
                self.controller.apply_snapshot(snapshot);
            }
            QueueMessage::Feed(FeedEvent::Failed(message)) => {
                self.controller.feed_failed(message);
                self.confirm.dismiss();
            }
            QueueMessage::Store(completion) => {
                let answers_form = self
                    .form
                    .as_ref()
                    .is_some_and(|form| answers_form(&completion, form));
                let feedback = self.controller.complete(completion);
                if answers_form && matches!(feedback, Feedback::Failure(_)) {
                    if let Some(form) = &mut self.form {
                        form.set_submitting(false);
                    }
                }
                self.notifications.push(Notification::from(feedback));
            }
            QueueMessage::RefreshWaitTimes => self.controller.refresh_wait_times(),
        }
        self.sync_form();
    }

    /// Keep the form widget in step with the controller's navigation.
    fn sync_form(&mut self) {
        let navigation = self.controller.navigation();
        match navigation.mode() {
            NavigationMode::Creating => {
                if self.form.as_ref().map_or(true, |f| f.editing().is_some()) {
                    self.form = Some(TicketFormView::new_ticket());
                }
            }
            NavigationMode::Editing => {
                if let Some(ticket) = navigation.selected() {
                    let stale = self
                        .form
                        .as_ref()
                        .map_or(true, |f| f.editing() != Some(ticket.id.as_str()));
                    if stale {
                        self.form = Some(TicketFormView::edit(ticket));
                    }
                }
            }
            NavigationMode::Listing | NavigationMode::Viewing => self.form = None,
        }
    }

    fn handle_key_event(&mut self, key: crossterm::event::KeyEvent) -> Option<StoreCommand> {
        use crossterm::event::KeyCode;

        if is_force_quit(&key) {
            self.quit();
            return None;
        }

        if self.confirm.is_visible() {
            return match self.confirm.handle_input(key)? {
                ConfirmAction::Confirm(id) => self.controller.delete_ticket(&id),
                ConfirmAction::Cancel => {
                    debug!("Delete cancelled");
                    None
                }
            };
        }

        // Sign-in prompt and the error screen only allow quitting.
        if !self.controller.is_signed_in() || self.controller.last_error().is_some() {
            if is_plain(&key, 'q') {
                self.quit();
            }
            return None;
        }

        match self.controller.navigation().mode() {
            NavigationMode::Listing => {
                if is_plain(&key, 'q') {
                    self.quit();
                } else if is_plain(&key, 'a') {
                    self.controller.press_action_button();
                } else if let Some(ListAction::Select(id)) =
                    self.list_view.handle_input(key, self.controller.tickets())
                {
                    debug!(id = %id, "Opening ticket");
                    self.controller.select_ticket(&id);
                }
                None
            }
            NavigationMode::Viewing => {
                if key.code == KeyCode::Esc {
                    self.controller.press_action_button();
                    return None;
                }
                let ticket = self.controller.selected_ticket()?;
                match self.detail_view.handle_input(key, ticket)? {
                    DetailAction::Delete(_) => self.confirm.show_delete(ticket),
                    DetailAction::Edit => {
                        self.controller.request_edit();
                    }
                }
                None
            }
            NavigationMode::Creating | NavigationMode::Editing => {
                if key.code == KeyCode::Esc {
                    self.controller.press_action_button();
                    return None;
                }
                let form = self.form.as_mut()?;
                let FormAction::Submit(fields) = form.handle_input(key)?;
                let command = if form.editing().is_some() {
                    self.controller.submit_edit(fields)
                } else {
                    self.controller.create_ticket(fields)
                };
                if command.is_none() {
                    form.set_submitting(false);
                }
                command
            }
        }
    }

    /// Render the application UI.
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Footer
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.render_content(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);

        self.notifications.render(frame, area);
        self.confirm.render(frame, area, &self.theme);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled("Help Queue", self.theme.accent_style())];
        if !self.context_label.is_empty() {
            spans.push(Span::styled(
                format!("  [{}]", self.context_label),
                self.theme.muted_style(),
            ));
        }
        if let Some(user) = self.controller.current_user() {
            spans.push(Span::styled(
                format!("  {}", user.label()),
                self.theme.text_style(),
            ));
        }

        let header = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(self.theme.muted_style()),
            );
        frame.render_widget(header, area);
    }

    fn render_content(&mut self, frame: &mut Frame, area: Rect) {
        match self.controller.screen() {
            Screen::SignIn => {
                let prompt = Paragraph::new(SIGN_IN_PROMPT)
                    .style(self.theme.text_style())
                    .alignment(Alignment::Center);
                frame.render_widget(prompt, centered_line(area));
            }
            Screen::Error(message) => {
                let error = Paragraph::new(format!("There was an error: {}", message))
                    .style(self.theme.error_style())
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(error, centered_line(area));
            }
            Screen::List(tickets) => {
                self.list_view.render(frame, area, tickets, &self.theme);
            }
            Screen::Detail(ticket) => self.detail_view.render(frame, area, ticket, &self.theme),
            Screen::NewForm | Screen::EditForm(_) => {
                if let Some(form) = &self.form {
                    form.render(frame, area, &self.theme);
                }
            }
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();

        if let Some(label) = self.controller.action_button() {
            let key = match self.controller.navigation().mode() {
                NavigationMode::Listing => "a",
                _ => "Esc",
            };
            spans.push(Span::styled(format!(" {} ", label), self.theme.button_style()));
            spans.push(Span::styled(format!(" ({})  ", key), self.theme.muted_style()));
        }

        let hints = match self.controller.screen() {
            Screen::SignIn | Screen::Error(_) => "q quit",
            Screen::List(_) => "j/k move  Enter open  q quit",
            Screen::Detail(_) => "e edit  d delete",
            Screen::NewForm | Screen::EditForm(_) => "Tab next field  Enter submit",
        };
        spans.push(Span::styled(hints, self.theme.muted_style()));

        let pending = self.controller.pending_writes();
        if pending > 0 {
            spans.push(Span::styled(
                format!("  saving {}...", pending),
                self.theme.accent_style(),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// A one-line-high strip through the vertical middle of `area`.
fn centered_line(area: Rect) -> Rect {
    crate::ui::centered_rect(area.width, 2, area)
}

/// Whether `completion` is the result of the write `form` submitted.
fn answers_form(completion: &Completion, form: &TicketFormView) -> bool {
    match completion {
        Completion::Created(_) => form.editing().is_none(),
        Completion::Updated { id, .. } => form.editing() == Some(id.as_str()),
        Completion::Deleted { .. } => false,
    }
}
