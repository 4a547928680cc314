// Ticket Repository Port (Interface)
//
// Every mutation is a conditional update: the store applies it only if the
// row still matches the expected prior state, and reports whether a row was
// actually touched. The store is the single arbiter of ordering; callers
// never cache a ticket's rank across calls.

use crate::domain::{Ticket, TicketId};
use crate::error::Result;
use async_trait::async_trait;

/// Fields for a ticket about to enter the waiting line.
/// The per-queue sequence number is assigned by the store at insert time.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub id: TicketId,
    pub queue_id: String,
    pub holder_id: String,
    pub created_at: i64,
}

/// Repository interface for Ticket persistence
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Guarded atomic insert of a waiting ticket.
    ///
    /// The one-active-ticket-per-holder and capacity checks are evaluated in
    /// the same atomic statement as the insert, so two racing joins cannot
    /// both slip past a nearly-full queue. Returns `None` when a guard
    /// rejected the admission (caller re-reads state to classify why).
    async fn try_insert_waiting(
        &self,
        new: &NewTicket,
        max_capacity: Option<i64>,
    ) -> Result<Option<Ticket>>;

    /// Find ticket by ID
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// Find the holder's active (waiting or serving) ticket in a queue
    async fn find_active_for_holder(
        &self,
        queue_id: &str,
        holder_id: &str,
    ) -> Result<Option<Ticket>>;

    /// Count active (waiting + serving) tickets in a queue
    async fn count_active(&self, queue_id: &str) -> Result<i64>;

    /// Count serving tickets, optionally excluding one ticket (the observer)
    async fn count_serving(&self, queue_id: &str, exclude: Option<&TicketId>) -> Result<i64>;

    /// Count waiting tickets in a queue
    async fn count_waiting(&self, queue_id: &str) -> Result<i64>;

    /// Count waiting tickets ranked strictly before the given ticket
    /// under the ordering policy
    async fn count_waiting_ahead(&self, ticket: &Ticket) -> Result<i64>;

    /// Active tickets in display order: serving first, then queue order
    async fn list_active(&self, queue_id: &str) -> Result<Vec<Ticket>>;

    /// Atomically claim the front of the waiting line into the serving slot.
    ///
    /// Selection and transition are one statement, conditioned on the queue
    /// having no serving ticket; two concurrent claims can never seat two
    /// tickets. Returns `None` when nothing was claimed (queue empty or
    /// slot occupied).
    async fn claim_next(&self, queue_id: &str) -> Result<Option<Ticket>>;

    /// CAS: Serving -> Completed, stamping `completed_at`.
    /// Returns false if the ticket was no longer serving.
    async fn complete(&self, id: &TicketId, queue_id: &str, now_millis: i64) -> Result<bool>;

    /// CAS: any active status -> Cancelled (customer leave).
    /// Returns false if the ticket was missing or already terminal.
    async fn cancel_active(&self, id: &TicketId) -> Result<bool>;

    /// CAS: Serving -> Cancelled (staff skip without rollback)
    async fn cancel_serving(&self, id: &TicketId, queue_id: &str) -> Result<bool>;

    /// CAS: Serving -> Waiting with refreshed `created_at` (rollback skip)
    async fn requeue(&self, id: &TicketId, queue_id: &str, now_millis: i64) -> Result<bool>;

    /// CAS: flip `is_priority`; valid only while Waiting
    async fn set_priority(&self, id: &TicketId, value: bool) -> Result<bool>;

    /// Terminal tickets for a holder, newest first (history is never deleted)
    async fn history_for_holder(&self, holder_id: &str) -> Result<Vec<Ticket>>;
}
