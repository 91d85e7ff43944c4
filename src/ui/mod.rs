//! User interface components and views.
//!
//! Views turn key presses into actions for [`crate::app::App`] and render
//! queue state; none of them touch the store.

mod components;
pub mod theme;
mod views;

pub use components::{
    centered_rect, ConfirmAction, ConfirmDialog, Notification, NotificationManager, TextInput,
};
pub use theme::Theme;
pub use views::{
    DetailAction, DetailView, FormAction, FormField, ListAction, TicketFormView, TicketListView,
};
