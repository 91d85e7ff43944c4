//! helpqueue - a terminal client for a live, shared help-desk ticket queue.
//!
//! Tickets live in a remote document store that pushes every change to all
//! connected clients. The [`queue::QueueController`] mirrors that feed, keeps
//! the wait-time column fresh, and drives the list/detail/form navigation.

pub mod app;
pub mod auth;
pub mod config;
pub mod elapsed;
pub mod error;
pub mod events;
pub mod logging;
pub mod queue;
pub mod store;
pub mod tasks;
pub mod ticket;
pub mod ui;
