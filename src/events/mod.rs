//! Terminal events and key helpers.

mod handler;
mod keys;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;
pub use keys::{is_down, is_force_quit, is_plain, is_up};

/// Events the main loop feeds into [`crate::app::App::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// Nothing happened within the tick rate.
    Tick,
}
