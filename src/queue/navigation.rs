//! Which screen of the queue is active.

use crate::ticket::Ticket;

/// Label of the action button while browsing the list.
pub const ADD_TICKET_LABEL: &str = "Add Ticket";

/// Label of the action button everywhere else.
pub const RETURN_TO_LIST_LABEL: &str = "Return to ticket list";

/// The queue's single source of truth for which view is active.
///
/// A selection only exists in `Viewing` and `Editing`, so "a ticket is
/// selected while the new-ticket form is open" cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Navigation {
    /// Browsing the ordered ticket list.
    #[default]
    Listing,
    /// Filling in the new-ticket form.
    Creating,
    /// Looking at one ticket.
    Viewing(Ticket),
    /// Editing one ticket.
    Editing(Ticket),
}

/// [`Navigation`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    Listing,
    Creating,
    Viewing,
    Editing,
}

impl Navigation {
    /// The variant without its payload.
    pub fn mode(&self) -> NavigationMode {
        match self {
            Navigation::Listing => NavigationMode::Listing,
            Navigation::Creating => NavigationMode::Creating,
            Navigation::Viewing(_) => NavigationMode::Viewing,
            Navigation::Editing(_) => NavigationMode::Editing,
        }
    }

    /// The selected ticket, if any.
    pub fn selected(&self) -> Option<&Ticket> {
        match self {
            Navigation::Viewing(ticket) | Navigation::Editing(ticket) => Some(ticket),
            Navigation::Listing | Navigation::Creating => None,
        }
    }

    /// Whether `id` is the selected ticket.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected().is_some_and(|t| t.id == id)
    }

    /// Label of the action button in this state.
    pub fn action_label(&self) -> &'static str {
        match self {
            Navigation::Listing => ADD_TICKET_LABEL,
            Navigation::Creating | Navigation::Viewing(_) | Navigation::Editing(_) => {
                RETURN_TO_LIST_LABEL
            }
        }
    }

    /// Where pressing the action button leads.
    pub fn after_action_button(&self) -> Navigation {
        match self {
            Navigation::Listing => Navigation::Creating,
            Navigation::Creating | Navigation::Viewing(_) | Navigation::Editing(_) => {
                Navigation::Listing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ticket(id: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            names: "Alice".to_string(),
            location: "Lobby".to_string(),
            issue: "Printer".to_string(),
            time_open: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            formatted_wait_time: "less than a minute".to_string(),
        }
    }

    #[test]
    fn test_default_is_listing() {
        assert_eq!(Navigation::default(), Navigation::Listing);
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(Navigation::Listing.action_label(), "Add Ticket");
        assert_eq!(Navigation::Creating.action_label(), "Return to ticket list");
        assert_eq!(
            Navigation::Viewing(ticket("t1")).action_label(),
            "Return to ticket list"
        );
        assert_eq!(
            Navigation::Editing(ticket("t1")).action_label(),
            "Return to ticket list"
        );
    }

    #[test]
    fn test_action_button_transitions() {
        assert_eq!(Navigation::Listing.after_action_button(), Navigation::Creating);
        assert_eq!(Navigation::Creating.after_action_button(), Navigation::Listing);
        assert_eq!(
            Navigation::Viewing(ticket("t1")).after_action_button(),
            Navigation::Listing
        );
        assert_eq!(
            Navigation::Editing(ticket("t1")).after_action_button(),
            Navigation::Listing
        );
    }

    #[test]
    fn test_selection_only_in_viewing_and_editing() {
        assert!(Navigation::Listing.selected().is_none());
        assert!(Navigation::Creating.selected().is_none());
        assert!(Navigation::Viewing(ticket("t1")).is_selected("t1"));
        assert!(!Navigation::Editing(ticket("t1")).is_selected("t2"));
    }

    #[test]
    fn test_mode() {
        assert_eq!(Navigation::Editing(ticket("t1")).mode(), NavigationMode::Editing);
        assert_eq!(Navigation::Creating.mode(), NavigationMode::Creating);
    }
}
