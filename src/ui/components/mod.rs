//! Reusable UI components.

mod confirm;
mod input;
mod notification;

use ratatui::layout::Rect;

pub use confirm::{ConfirmAction, ConfirmDialog};
pub use input::TextInput;
pub use notification::{Notification, NotificationManager, NotificationType};

/// A `width` x `height` rectangle centred in `area`, clipped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect(40, 10, area), Rect::new(30, 15, 40, 10));
    }

    #[test]
    fn test_centered_rect_clips() {
        let area = Rect::new(5, 5, 20, 8);
        let rect = centered_rect(40, 10, area);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 8);
        assert_eq!(rect.x, 5);
    }
}
