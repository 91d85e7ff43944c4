//! Key classification shared by the views.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Ctrl+C, which quits from anywhere.
pub fn is_force_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// `c` pressed with no modifier other than Shift.
pub fn is_plain(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.difference(KeyModifiers::SHIFT).is_empty()
}

/// Up arrow or vim `k`.
pub fn is_up(key: &KeyEvent) -> bool {
    key.code == KeyCode::Up || is_plain(key, 'k')
}

/// Down arrow or vim `j`.
pub fn is_down(key: &KeyEvent) -> bool {
    key.code == KeyCode::Down || is_plain(key, 'j')
}
