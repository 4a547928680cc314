// Ticket Domain Model

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::error::{DomainError, Result};

/// Ticket ID (UUID v4)
pub type TicketId = String;

/// Customer that owns a ticket
pub type HolderId = String;

/// Human-facing sequence number, unique and monotonic per queue
pub type TicketNumber = i64;

/// Ticket lifecycle state
///
/// `Completed` and `Cancelled` are terminal. The only sanctioned way back
/// out of `Serving` into `Waiting` is an explicit rollback (staff skip with
/// auto-rollback enabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Waiting,
    Serving,
    Completed,
    Cancelled,
}

impl TicketStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Completed | TicketStatus::Cancelled)
    }

    /// Active = occupying the queue pipeline (counts toward capacity)
    pub fn is_active(&self) -> bool {
        matches!(self, TicketStatus::Waiting | TicketStatus::Serving)
    }

    pub fn parse(s: &str) -> Option<TicketStatus> {
        match s {
            "WAITING" => Some(TicketStatus::Waiting),
            "SERVING" => Some(TicketStatus::Serving),
            "COMPLETED" => Some(TicketStatus::Completed),
            "CANCELLED" => Some(TicketStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Waiting => write!(f, "WAITING"),
            TicketStatus::Serving => write!(f, "SERVING"),
            TicketStatus::Completed => write!(f, "COMPLETED"),
            TicketStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Ticket Entity - a customer's claim to a position in a queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub queue_id: super::QueueId,
    pub holder_id: HolderId,
    pub number: TicketNumber,
    pub status: TicketStatus,
    pub is_priority: bool,
    /// Arrival timestamp (epoch ms); reset when a rolled-back ticket
    /// re-enters the waiting line, sending it to the back of its tier
    pub created_at: i64,
    /// Stamped only on transition into Completed
    pub completed_at: Option<i64>,
}

impl Ticket {
    /// Create a new waiting ticket
    ///
    /// # Arguments
    ///
    /// * `id` - Unique ticket ID (injected, not generated)
    /// * `created_at` - Arrival timestamp in epoch ms (injected, not system time)
    /// * `number` - Per-queue sequence number
    pub fn new(
        id: impl Into<String>,
        queue_id: impl Into<String>,
        holder_id: impl Into<String>,
        number: TicketNumber,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            holder_id: holder_id.into(),
            number,
            status: TicketStatus::Waiting,
            is_priority: false,
            created_at,
            completed_at: None,
        }
    }

    /// Transition into the serving slot
    pub fn serve(&mut self) -> Result<()> {
        if self.status != TicketStatus::Waiting {
            return Err(self.bad_transition(TicketStatus::Serving));
        }
        self.status = TicketStatus::Serving;
        Ok(())
    }

    /// Transition to Completed, stamping `completed_at`
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        if self.status != TicketStatus::Serving {
            return Err(self.bad_transition(TicketStatus::Completed));
        }
        self.status = TicketStatus::Completed;
        self.completed_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Cancelled (customer leave or staff skip without rollback)
    pub fn cancel(&mut self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(self.bad_transition(TicketStatus::Cancelled));
        }
        self.status = TicketStatus::Cancelled;
        Ok(())
    }

    /// Rollback: Serving -> Waiting with a refreshed arrival timestamp.
    /// The ticket keeps its priority tier but loses its place within it.
    pub fn requeue(&mut self, now_millis: i64) -> Result<()> {
        if self.status != TicketStatus::Serving {
            return Err(self.bad_transition(TicketStatus::Waiting));
        }
        self.status = TicketStatus::Waiting;
        self.created_at = now_millis;
        Ok(())
    }

    /// Flip the priority flag; allowed only while waiting
    pub fn set_priority(&mut self, value: bool) -> Result<()> {
        if self.status != TicketStatus::Waiting {
            return Err(DomainError::NotWaiting {
                status: self.status.to_string(),
            });
        }
        self.is_priority = value;
        Ok(())
    }

    fn bad_transition(&self, to: TicketStatus) -> DomainError {
        DomainError::InvalidStateTransition {
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }
}

/// Ordering policy: total order over waiting tickets.
///
/// Priority tickets precede non-priority; within a tier, earlier arrival
/// precedes later; ties on arrival break by sequence number (stable).
/// Repository queries mirror this exactly
/// (`ORDER BY is_priority DESC, created_at ASC, number ASC`).
pub fn queue_order(a: &Ticket, b: &Ticket) -> Ordering {
    b.is_priority
        .cmp(&a.is_priority)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.number.cmp(&b.number))
}
