//! Ticket types shared by the store, the queue controller and the views.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::elapsed::{format_distance_since, Clock};

/// A timestamp assigned by the store at write time.
///
/// Freshly written documents may carry a timestamp that the store has not
/// finalized yet. Readers that want a value anyway use the local estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerTimestamp {
    /// The store has committed the value.
    Final(DateTime<Utc>),
    /// Not yet committed; `estimate` is the best local guess.
    Pending { estimate: DateTime<Utc> },
}

impl ServerTimestamp {
    /// Read the timestamp, falling back to the estimate while pending.
    pub fn estimate(&self) -> DateTime<Utc> {
        match self {
            ServerTimestamp::Final(at) => *at,
            ServerTimestamp::Pending { estimate } => *estimate,
        }
    }

    /// Whether the store has committed this value.
    pub fn is_final(&self) -> bool {
        matches!(self, ServerTimestamp::Final(_))
    }
}

/// The user-editable part of a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFields {
    /// Who is asking for help (one or more names).
    pub names: String,
    /// Where they are.
    pub location: String,
    /// What they need help with.
    pub issue: String,
}

impl TicketFields {
    /// Create a new set of ticket fields.
    pub fn new(
        names: impl Into<String>,
        location: impl Into<String>,
        issue: impl Into<String>,
    ) -> Self {
        Self {
            names: names.into(),
            location: location.into(),
            issue: issue.into(),
        }
    }

    /// Names of the fields that are blank after trimming.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.names.trim().is_empty() {
            missing.push("names");
        }
        if self.location.trim().is_empty() {
            missing.push("location");
        }
        if self.issue.trim().is_empty() {
            missing.push("issue");
        }
        missing
    }

    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self::new(self.names.trim(), self.location.trim(), self.issue.trim())
    }
}

/// One document as delivered by the store's live feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: String,
    /// The stored fields.
    pub fields: TicketFields,
    /// When the ticket was opened.
    pub time_open: ServerTimestamp,
}

/// A ticket as shown in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Store-assigned identifier.
    pub id: String,
    /// Who is asking for help.
    pub names: String,
    /// Where they are.
    pub location: String,
    /// What they need help with.
    pub issue: String,
    /// When the ticket was opened. Never changes after creation.
    pub time_open: DateTime<Utc>,
    /// How long the ticket has been waiting, in words.
    pub formatted_wait_time: String,
}

impl Ticket {
    /// Build a ticket from a feed document, reading its open time with the
    /// best-effort estimate.
    pub fn from_document(document: Document, clock: &dyn Clock) -> Self {
        let time_open = document.time_open.estimate();
        Self {
            id: document.id,
            names: document.fields.names,
            location: document.fields.location,
            issue: document.fields.issue,
            time_open,
            formatted_wait_time: format_distance_since(time_open, clock),
        }
    }

    /// The user-editable fields of this ticket.
    pub fn fields(&self) -> TicketFields {
        TicketFields::new(&self.names, &self.location, &self.issue)
    }

    /// Recompute the wait time from `time_open`.
    pub fn refresh_wait_time(&mut self, clock: &dyn Clock) {
        self.formatted_wait_time = format_distance_since(self.time_open, clock);
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}: {}", self.names, self.location, self.issue)
    }
}
