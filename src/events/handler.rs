//! Event handler implementation.
//!
//! Polls crossterm for terminal events and converts them to [`Event`]s.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};

use super::Event;

/// The tick rate for the event loop in milliseconds.
const TICK_RATE_MS: u64 = 100;

/// Handles application events by polling crossterm for terminal events.
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler with the default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(TICK_RATE_MS),
        }
    }

    /// Poll for the next event.
    ///
    /// Blocks until an event is available or the tick rate elapses.
    /// Returns `Event::Tick` if nothing happened.
    pub fn next(&self) -> std::io::Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }
        Ok(convert(event::read()?))
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn convert(event: CrosstermEvent) -> Event {
    match event {
        // Windows reports releases too; only presses drive the queue.
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
        CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
        _ => Event::Tick,
    }
}
