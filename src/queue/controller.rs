//! The queue controller: live mirror, wait times, navigation and mutations.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::navigation::Navigation;
use crate::auth::{AuthProvider, User};
use crate::elapsed::Clock;
use crate::store::Snapshot;
use crate::ticket::{Ticket, TicketFields};

/// A store write the controller wants performed.
///
/// The controller never talks to the store itself; the host runs the
/// command and reports back with a [`Completion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    /// Add a ticket. The store assigns id and open time.
    Create(TicketFields),
    /// Overwrite the editable fields of ticket `id`.
    Update { id: String, fields: TicketFields },
    /// Remove ticket `id`.
    Delete { id: String },
}

/// Outcome of a [`StoreCommand`]. Errors carry a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Created(Result<(), String>),
    Updated { id: String, result: Result<(), String> },
    Deleted { id: String, result: Result<(), String> },
}

/// Transient feedback for the user after a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Failure(String),
}

/// What the host should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen<'a> {
    /// Nobody is signed in.
    SignIn,
    /// The live feed failed; nothing else is reachable.
    Error(&'a str),
    /// The ordered ticket list.
    List(&'a [Ticket]),
    /// One ticket.
    Detail(&'a Ticket),
    /// The new-ticket form.
    NewForm,
    /// The edit form for one ticket.
    EditForm(&'a Ticket),
}

/// Mirrors the live ticket feed and owns all queue navigation state.
pub struct QueueController {
    tickets: Vec<Ticket>,
    navigation: Navigation,
    last_error: Option<String>,
    pending: usize,
    auth: Arc<dyn AuthProvider>,
    clock: Arc<dyn Clock>,
}

impl QueueController {
    /// Create a controller in `Listing` with an empty mirror.
    pub fn new(auth: Arc<dyn AuthProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tickets: Vec::new(),
            navigation: Navigation::Listing,
            last_error: None,
            pending: 0,
            auth,
            clock,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// The signed-in user. Asked fresh on every call.
    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    /// Whether anyone is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.current_user().is_some()
    }

    /// Mirrored tickets in open-time order.
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// The current navigation state.
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// The selected ticket, if any.
    pub fn selected_ticket(&self) -> Option<&Ticket> {
        self.navigation.selected()
    }

    /// The feed failure message, once the feed has failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of store writes still in flight.
    pub fn pending_writes(&self) -> usize {
        self.pending
    }

    /// The action button label, or `None` when the button is hidden.
    pub fn action_button(&self) -> Option<&'static str> {
        if !self.accepts_input() {
            return None;
        }
        Some(self.navigation.action_label())
    }

    /// Which view to draw right now.
    pub fn screen(&self) -> Screen<'_> {
        if !self.is_signed_in() {
            return Screen::SignIn;
        }
        if let Some(message) = &self.last_error {
            return Screen::Error(message);
        }
        match &self.navigation {
            Navigation::Listing => Screen::List(&self.tickets),
            Navigation::Creating => Screen::NewForm,
            Navigation::Viewing(ticket) => Screen::Detail(ticket),
            Navigation::Editing(ticket) => Screen::EditForm(ticket),
        }
    }

    fn accepts_input(&self) -> bool {
        self.is_signed_in() && self.last_error.is_none()
    }

    fn transition(&mut self, next: Navigation) {
        debug!(from = ?self.navigation.mode(), to = ?next.mode(), "Navigation");
        self.navigation = next;
    }

    // ------------------------------------------------------------------
    // Feed and timer
    // ------------------------------------------------------------------

    /// Replace the mirror with a full snapshot from the feed.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let clock = Arc::clone(&self.clock);
        self.tickets = snapshot
            .documents
            .into_iter()
            .map(|doc| Ticket::from_document(doc, clock.as_ref()))
            .collect();

        let tickets = &self.tickets;
        if let Navigation::Viewing(selected) | Navigation::Editing(selected) = &mut self.navigation {
            if let Some(fresh) = tickets.iter().find(|t| t.id == selected.id) {
                *selected = fresh.clone();
            }
        }

        debug!(count = self.tickets.len(), "Applied snapshot");
    }

    /// Record that the feed failed. The first message sticks.
    pub fn feed_failed(&mut self, message: impl Into<String>) {
        if self.last_error.is_some() {
            return;
        }
        let message = message.into();
        warn!(%message, "Ticket feed failed");
        self.last_error = Some(message);
    }

    /// Recompute every wait time from its open time against the clock.
    pub fn refresh_wait_times(&mut self) {
        let clock = Arc::clone(&self.clock);
        for ticket in &mut self.tickets {
            ticket.refresh_wait_time(clock.as_ref());
        }
        if let Navigation::Viewing(selected) | Navigation::Editing(selected) = &mut self.navigation {
            selected.refresh_wait_time(clock.as_ref());
        }
        debug!(count = self.tickets.len(), "Refreshed wait times");
    }

    // ------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------

    /// Press the action button. Returns whether anything happened.
    pub fn press_action_button(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let next = self.navigation.after_action_button();
        self.transition(next);
        true
    }

    /// Select the first ticket whose id is `id`.
    ///
    /// An id missing from the mirror leaves the selection empty.
    pub fn select_ticket(&mut self, id: &str) -> bool {
        if !self.accepts_input() || self.navigation != Navigation::Listing {
            return false;
        }
        match self.tickets.iter().find(|t| t.id == id) {
            Some(ticket) => {
                let ticket = ticket.clone();
                self.transition(Navigation::Viewing(ticket));
                true
            }
            None => {
                warn!(id, "Selected ticket is not in the queue");
                false
            }
        }
    }

    /// Open the edit form for the ticket being viewed.
    pub fn request_edit(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        match &self.navigation {
            Navigation::Viewing(ticket) => {
                let ticket = ticket.clone();
                self.transition(Navigation::Editing(ticket));
                true
            }
            _ => false,
        }
    }

    /// Ask the store to add a ticket from the new-ticket form.
    pub fn create_ticket(&mut self, fields: TicketFields) -> Option<StoreCommand> {
        if !self.accepts_input() || self.navigation != Navigation::Creating {
            return None;
        }
        self.pending += 1;
        info!("Creating ticket");
        Some(StoreCommand::Create(fields))
    }

    /// Ask the store to remove the ticket being viewed.
    pub fn delete_ticket(&mut self, id: &str) -> Option<StoreCommand> {
        if !self.accepts_input() {
            return None;
        }
        match &self.navigation {
            Navigation::Viewing(ticket) if ticket.id == id => {
                self.pending += 1;
                info!(id, "Deleting ticket");
                Some(StoreCommand::Delete { id: id.to_string() })
            }
            _ => None,
        }
    }

    /// Ask the store to save the edit form for the ticket being edited.
    pub fn submit_edit(&mut self, fields: TicketFields) -> Option<StoreCommand> {
        if !self.accepts_input() {
            return None;
        }
        match &self.navigation {
            Navigation::Editing(ticket) => {
                let id = ticket.id.clone();
                self.pending += 1;
                info!(id = %id, "Updating ticket");
                Some(StoreCommand::Update { id, fields })
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Store completions
    // ------------------------------------------------------------------

    /// Apply the outcome of a store write.
    ///
    /// Success moves navigation on; failure leaves it untouched so the user
    /// can retry.
    pub fn complete(&mut self, completion: Completion) -> Feedback {
        self.pending = self.pending.saturating_sub(1);

        match completion {
            Completion::Created(Ok(())) => {
                if self.navigation == Navigation::Creating {
                    self.transition(Navigation::Listing);
                }
                Feedback::Success("Ticket added".to_string())
            }
            Completion::Deleted { id, result: Ok(()) } => {
                if self.navigation.is_selected(&id) {
                    self.transition(Navigation::Listing);
                }
                Feedback::Success("Ticket deleted".to_string())
            }
            Completion::Updated { id, result: Ok(()) } => {
                if matches!(&self.navigation, Navigation::Editing(t) if t.id == id) {
                    self.transition(Navigation::Listing);
                }
                Feedback::Success("Ticket updated".to_string())
            }
            Completion::Created(Err(message)) => {
                warn!(%message, "Create failed");
                Feedback::Failure(format!("Could not add ticket: {}", message))
            }
            Completion::Deleted {
                id,
                result: Err(message),
            } => {
                warn!(id = %id, %message, "Delete failed");
                Feedback::Failure(format!("Could not delete ticket: {}", message))
            }
            Completion::Updated {
                id,
                result: Err(message),
            } => {
                warn!(id = %id, %message, "Update failed");
                Feedback::Failure(format!("Could not save ticket: {}", message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::elapsed::ManualClock;
    use crate::queue::navigation::{NavigationMode, ADD_TICKET_LABEL, RETURN_TO_LIST_LABEL};
    use crate::ticket::{Document, ServerTimestamp};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn doc(id: &str, names: &str, minutes_after_t0: i64) -> Document {
        Document {
            id: id.to_string(),
            fields: TicketFields::new(names, "Lobby", "Printer"),
            time_open: ServerTimestamp::Final(t0() + Duration::minutes(minutes_after_t0)),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(vec![doc("t1", "Alice", 0), doc("t2", "Bob", 2), doc("t3", "Cy", 5)])
    }

    struct Fixture {
        controller: QueueController,
        clock: ManualClock,
        session: Session,
    }

    fn fixture() -> Fixture {
        let clock = ManualClock::new(t0() + Duration::minutes(10));
        let session = Session::signed_in(User::local("Front Desk"));
        let controller = QueueController::new(Arc::new(session.clone()), Arc::new(clock.clone()));
        Fixture {
            controller,
            clock,
            session,
        }
    }

    fn viewing(id: &str) -> Fixture {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());
        assert!(f.controller.select_ticket(id));
        f
    }

    fn editing(id: &str) -> Fixture {
        let mut f = viewing(id);
        assert!(f.controller.request_edit());
        f
    }

    // --- feed -----------------------------------------------------------

    #[test]
    fn test_snapshot_replaces_list_in_order() {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());

        let tickets = f.controller.tickets();
        assert_eq!(tickets.len(), 3);
        let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
        assert_eq!(tickets[0].formatted_wait_time, "10 minutes");
        assert_eq!(tickets[2].formatted_wait_time, "5 minutes");

        f.controller.apply_snapshot(Snapshot::new(vec![doc("t9", "Zed", 1)]));
        assert_eq!(f.controller.tickets().len(), 1);
        assert_eq!(f.controller.tickets()[0].id, "t9");
    }

    #[test]
    fn test_same_snapshot_twice_is_idempotent() {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());
        let first = f.controller.tickets().to_vec();

        f.controller.apply_snapshot(snapshot());

        assert_eq!(f.controller.tickets(), first.as_slice());
    }

    #[test]
    fn test_pending_timestamp_uses_estimate() {
        let mut f = fixture();
        f.controller.apply_snapshot(Snapshot::new(vec![Document {
            id: "t1".to_string(),
            fields: TicketFields::new("Alice", "Lobby", "Printer"),
            time_open: ServerTimestamp::Pending {
                estimate: t0() + Duration::minutes(7),
            },
        }]));

        assert_eq!(f.controller.tickets()[0].formatted_wait_time, "3 minutes");
    }

    #[test]
    fn test_refresh_only_changes_wait_time() {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());
        let before = f.controller.tickets().to_vec();

        f.clock.advance(Duration::minutes(30));
        f.controller.refresh_wait_times();

        let after = f.controller.tickets();
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(after) {
            assert_eq!(old.id, new.id);
            assert_eq!(old.fields(), new.fields());
            assert_eq!(old.time_open, new.time_open);
        }
        assert_eq!(after[0].formatted_wait_time, "40 minutes");
        assert_ne!(after[0].formatted_wait_time, before[0].formatted_wait_time);
    }

    #[test]
    fn test_snapshot_refreshes_selected_ticket() {
        let mut f = viewing("t2");
        let mut docs = snapshot().documents;
        docs[1].fields.location = "Room 12".to_string();

        f.controller.apply_snapshot(Snapshot::new(docs));

        assert_eq!(f.controller.selected_ticket().unwrap().location, "Room 12");
    }

    #[test]
    fn test_selected_ticket_kept_when_removed_elsewhere() {
        let mut f = viewing("t2");
        f.controller
            .apply_snapshot(Snapshot::new(vec![doc("t1", "Alice", 0)]));

        assert_eq!(f.controller.navigation().mode(), NavigationMode::Viewing);
        assert_eq!(f.controller.selected_ticket().unwrap().id, "t2");
    }

    #[test]
    fn test_end_to_end_wait_time_ticks() {
        let clock = ManualClock::new(t0());
        let session = Session::signed_in(User::local("Front Desk"));
        let mut controller = QueueController::new(Arc::new(session), Arc::new(clock.clone()));
        controller.apply_snapshot(Snapshot::new(vec![Document {
            id: "t1".to_string(),
            fields: TicketFields::new("Alice", "Lobby", "Printer"),
            time_open: ServerTimestamp::Final(t0()),
        }]));
        let at_open = controller.tickets()[0].formatted_wait_time.clone();

        clock.advance(Duration::seconds(60));
        controller.refresh_wait_times();
        clock.advance(Duration::seconds(30));

        let ticket = &controller.tickets()[0];
        assert_eq!(at_open, "less than a minute");
        assert_eq!(ticket.formatted_wait_time, "1 minute");
        assert_ne!(ticket.formatted_wait_time, at_open);
    }

    // --- navigation -----------------------------------------------------

    #[test]
    fn test_initial_state() {
        let f = fixture();
        assert_eq!(f.controller.navigation(), &Navigation::Listing);
        assert_eq!(f.controller.action_button(), Some(ADD_TICKET_LABEL));
        assert!(matches!(f.controller.screen(), Screen::List(t) if t.is_empty()));
    }

    #[test]
    fn test_action_button_toggles_new_form() {
        let mut f = fixture();

        assert!(f.controller.press_action_button());
        assert_eq!(f.controller.navigation(), &Navigation::Creating);
        assert_eq!(f.controller.action_button(), Some(RETURN_TO_LIST_LABEL));
        assert_eq!(f.controller.screen(), Screen::NewForm);

        assert!(f.controller.press_action_button());
        assert_eq!(f.controller.navigation(), &Navigation::Listing);
        assert_eq!(f.controller.action_button(), Some(ADD_TICKET_LABEL));
    }

    #[test]
    fn test_select_present_id_views_exact_ticket() {
        let f = viewing("t2");
        let selected = f.controller.selected_ticket().unwrap();

        assert_eq!(selected, &f.controller.tickets()[1]);
        assert_eq!(f.controller.action_button(), Some(RETURN_TO_LIST_LABEL));
        assert!(matches!(f.controller.screen(), Screen::Detail(t) if t.id == "t2"));
    }

    #[test]
    fn test_select_absent_id_leaves_selection_empty() {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());

        assert!(!f.controller.select_ticket("gone"));

        assert!(f.controller.selected_ticket().is_none());
        assert_eq!(f.controller.navigation(), &Navigation::Listing);
    }

    #[test]
    fn test_select_ignored_outside_listing() {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());
        f.controller.press_action_button();

        assert!(!f.controller.select_ticket("t1"));
        assert_eq!(f.controller.navigation(), &Navigation::Creating);
    }

    #[test]
    fn test_action_button_from_viewing_returns_to_list() {
        let mut f = viewing("t1");
        assert!(f.controller.press_action_button());
        assert_eq!(f.controller.navigation(), &Navigation::Listing);
        assert!(f.controller.selected_ticket().is_none());
    }

    #[test]
    fn test_request_edit() {
        let f = editing("t3");
        assert_eq!(f.controller.navigation().mode(), NavigationMode::Editing);
        assert!(matches!(f.controller.screen(), Screen::EditForm(t) if t.id == "t3"));
        assert_eq!(f.controller.action_button(), Some(RETURN_TO_LIST_LABEL));
    }

    #[test]
    fn test_request_edit_needs_a_viewed_ticket() {
        let mut f = fixture();
        assert!(!f.controller.request_edit());
        assert_eq!(f.controller.navigation(), &Navigation::Listing);
    }

    #[test]
    fn test_action_button_from_editing_clears_everything() {
        let mut f = editing("t1");
        f.controller.press_action_button();
        assert_eq!(f.controller.navigation(), &Navigation::Listing);
    }

    // --- mutations ------------------------------------------------------

    #[test]
    fn test_create_hides_form_only_after_completion() {
        let mut f = fixture();
        f.controller.press_action_button();
        let fields = TicketFields::new("Dana", "Desk 3", "Badge");

        let command = f.controller.create_ticket(fields.clone());

        assert_eq!(command, Some(StoreCommand::Create(fields)));
        assert_eq!(f.controller.navigation(), &Navigation::Creating);
        assert_eq!(f.controller.pending_writes(), 1);

        let feedback = f.controller.complete(Completion::Created(Ok(())));

        assert_eq!(feedback, Feedback::Success("Ticket added".to_string()));
        assert_eq!(f.controller.navigation(), &Navigation::Listing);
        assert_eq!(f.controller.pending_writes(), 0);
    }

    #[test]
    fn test_create_requires_new_form() {
        let mut f = fixture();
        assert!(f
            .controller
            .create_ticket(TicketFields::new("a", "b", "c"))
            .is_none());
        assert_eq!(f.controller.pending_writes(), 0);
    }

    #[test]
    fn test_create_completion_after_cancel_keeps_current_view() {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());
        f.controller.press_action_button();
        f.controller.create_ticket(TicketFields::new("a", "b", "c"));
        f.controller.press_action_button();
        f.controller.select_ticket("t1");

        f.controller.complete(Completion::Created(Ok(())));

        assert_eq!(f.controller.navigation().mode(), NavigationMode::Viewing);
    }

    #[test]
    fn test_create_failure_keeps_form_open() {
        let mut f = fixture();
        f.controller.press_action_button();
        f.controller.create_ticket(TicketFields::new("a", "b", "c"));

        let feedback = f
            .controller
            .complete(Completion::Created(Err("server down".to_string())));

        assert_eq!(
            feedback,
            Feedback::Failure("Could not add ticket: server down".to_string())
        );
        assert_eq!(f.controller.navigation(), &Navigation::Creating);
        assert!(f.controller.last_error().is_none());
    }

    #[test]
    fn test_delete_clears_selection_after_completion() {
        let mut f = viewing("t2");

        let command = f.controller.delete_ticket("t2");

        assert_eq!(
            command,
            Some(StoreCommand::Delete {
                id: "t2".to_string()
            })
        );
        assert_eq!(f.controller.action_button(), Some(RETURN_TO_LIST_LABEL));
        assert_eq!(f.controller.navigation().mode(), NavigationMode::Viewing);

        f.controller.complete(Completion::Deleted {
            id: "t2".to_string(),
            result: Ok(()),
        });

        assert_eq!(f.controller.navigation(), &Navigation::Listing);
        assert!(f.controller.selected_ticket().is_none());
        assert_eq!(f.controller.action_button(), Some(ADD_TICKET_LABEL));
    }

    #[test]
    fn test_delete_only_for_viewed_ticket() {
        let mut f = viewing("t2");
        assert!(f.controller.delete_ticket("t1").is_none());
        assert_eq!(f.controller.pending_writes(), 0);
    }

    #[test]
    fn test_delete_failure_keeps_viewing() {
        let mut f = viewing("t2");
        f.controller.delete_ticket("t2");

        let feedback = f.controller.complete(Completion::Deleted {
            id: "t2".to_string(),
            result: Err("permission denied".to_string()),
        });

        assert!(matches!(feedback, Feedback::Failure(m) if m.contains("permission denied")));
        assert_eq!(f.controller.selected_ticket().unwrap().id, "t2");
    }

    #[test]
    fn test_submit_edit_updates_selected_id() {
        let mut f = editing("t3");
        let fields = TicketFields::new("Cy", "Room 7", "Monitor flicker");

        let command = f.controller.submit_edit(fields.clone());

        assert_eq!(
            command,
            Some(StoreCommand::Update {
                id: "t3".to_string(),
                fields
            })
        );
        assert_eq!(f.controller.navigation().mode(), NavigationMode::Editing);

        f.controller.complete(Completion::Updated {
            id: "t3".to_string(),
            result: Ok(()),
        });

        assert_eq!(f.controller.navigation(), &Navigation::Listing);
    }

    #[test]
    fn test_submit_edit_requires_editing() {
        let mut f = viewing("t3");
        assert!(f
            .controller
            .submit_edit(TicketFields::new("a", "b", "c"))
            .is_none());
    }

    #[test]
    fn test_edit_failure_keeps_form() {
        let mut f = editing("t3");
        f.controller.submit_edit(TicketFields::new("a", "b", "c"));

        f.controller.complete(Completion::Updated {
            id: "t3".to_string(),
            result: Err("conflict".to_string()),
        });

        assert_eq!(f.controller.navigation().mode(), NavigationMode::Editing);
    }

    // --- terminal error -------------------------------------------------

    #[test]
    fn test_feed_failure_overrides_editing() {
        let mut f = editing("t1");

        f.controller.feed_failed("network lost");

        assert_eq!(f.controller.action_button(), None);
        assert_eq!(f.controller.screen(), Screen::Error("network lost"));
    }

    #[test]
    fn test_feed_failure_blocks_all_transitions() {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());
        f.controller.feed_failed("network lost");

        assert!(!f.controller.press_action_button());
        assert!(!f.controller.select_ticket("t1"));
        assert!(!f.controller.request_edit());
        assert_eq!(f.controller.navigation(), &Navigation::Listing);
        assert_eq!(f.controller.screen(), Screen::Error("network lost"));
    }

    #[test]
    fn test_first_feed_failure_sticks() {
        let mut f = fixture();
        f.controller.feed_failed("network lost");
        f.controller.feed_failed("something else");
        assert_eq!(f.controller.last_error(), Some("network lost"));
    }

    // --- access gate ----------------------------------------------------

    #[test]
    fn test_signed_out_shows_sign_in_only() {
        let mut f = fixture();
        f.controller.apply_snapshot(snapshot());
        f.session.sign_out();

        assert_eq!(f.controller.screen(), Screen::SignIn);
        assert_eq!(f.controller.action_button(), None);
        assert!(!f.controller.press_action_button());
        assert!(!f.controller.select_ticket("t1"));
    }

    #[test]
    fn test_signed_out_produces_no_commands() {
        let mut f = editing("t1");
        f.session.sign_out();

        assert!(f
            .controller
            .submit_edit(TicketFields::new("a", "b", "c"))
            .is_none());
        assert!(f.controller.delete_ticket("t1").is_none());
    }

    #[test]
    fn test_sign_in_takes_precedence_over_error() {
        let mut f = fixture();
        f.controller.feed_failed("network lost");
        f.session.sign_out();
        assert_eq!(f.controller.screen(), Screen::SignIn);
    }

    #[test]
    fn test_gate_is_reevaluated() {
        let mut f = fixture();
        f.session.sign_out();
        assert!(!f.controller.press_action_button());

        f.session.set_user(User::local("Back Office"));
        assert!(f.controller.press_action_button());
        assert_eq!(f.controller.current_user().unwrap().label(), "Back Office");
    }
}
