//! Queue screens.

mod detail;
mod form;
mod list;

pub use detail::{DetailAction, DetailView};
pub use form::{FormAction, FormField, TicketFormView};
pub use list::{ListAction, TicketListView};
