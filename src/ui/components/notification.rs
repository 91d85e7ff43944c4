//! Transient toast messages.
//!
//! Store write outcomes surface here; they expire on their own and never
//! change what screen is shown.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::queue::Feedback;

/// The type of notification, which determines its appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Info,
    Success,
    Error,
}

impl NotificationType {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::Info => "ℹ",
            NotificationType::Success => "✓",
            NotificationType::Error => "✗",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            NotificationType::Info => Color::Blue,
            NotificationType::Success => Color::Green,
            NotificationType::Error => Color::Red,
        }
    }
}

/// A single notification message.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub notification_type: NotificationType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Notification {
    pub fn new(
        message: impl Into<String>,
        notification_type: NotificationType,
        duration: Duration,
    ) -> Self {
        Self {
            message: message.into(),
            notification_type,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Info toast, shown for 3 seconds.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Info, Duration::from_secs(3))
    }

    /// Success toast, shown for 3 seconds.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Success, Duration::from_secs(3))
    }

    /// Error toast, shown for 5 seconds.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Error, Duration::from_secs(5))
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }
}

impl From<Feedback> for Notification {
    fn from(feedback: Feedback) -> Self {
        match feedback {
            Feedback::Success(message) => Notification::success(message),
            Feedback::Failure(message) => Notification::error(message),
        }
    }
}

/// Keeps the most recent notifications, oldest first.
#[derive(Debug)]
pub struct NotificationManager {
    notifications: VecDeque<Notification>,
    max_visible: usize,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: VecDeque::new(),
            max_visible: 3,
        }
    }

    /// Add a notification, dropping the oldest past the visible limit.
    pub fn push(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
        while self.notifications.len() > self.max_visible {
            self.notifications.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::info(message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::error(message));
    }

    /// Remove expired notifications. Called on every tick.
    pub fn tick(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Render notifications stacked in the bottom-right corner of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let width = 50.min(area.width.saturating_sub(4));
        // Borders take two columns and the icon prefix two more.
        let inner_width = width.saturating_sub(4).max(1) as usize;

        let heights: Vec<u16> = self
            .notifications
            .iter()
            .map(|n| {
                let text_len = n.message.chars().count() + 2;
                text_len.div_ceil(inner_width) as u16 + 2
            })
            .collect();
        let total_height = heights.iter().sum::<u16>().min(area.height.saturating_sub(2));

        let x = area.x + area.width.saturating_sub(width + 2);
        let y = area.y + area.height.saturating_sub(total_height + 1);
        let stack = Rect::new(x, y, width, total_height);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(heights.iter().map(|&h| Constraint::Length(h)))
            .split(stack);

        for (notification, chunk) in self.notifications.iter().zip(chunks.iter()) {
            render_notification(notification, frame, *chunk);
        }
    }
}

fn render_notification(notification: &Notification, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let style = Style::default().fg(notification.notification_type.color());
    let text = Line::from(vec![
        Span::styled(
            format!("{} ", notification.notification_type.icon()),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(notification.message.as_str(), style),
    ]);

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).border_style(style))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
