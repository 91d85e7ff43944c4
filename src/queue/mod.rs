//! The queue: navigation state and the controller that drives it.

mod controller;
mod navigation;

pub use controller::{Completion, Feedback, QueueController, Screen, StoreCommand};
pub use navigation::{Navigation, NavigationMode, ADD_TICKET_LABEL, RETURN_TO_LIST_LABEL};
