// Advancement Engine - the state machine around the single serving slot
//
// Every transition re-reads current state immediately before mutating, and
// the mutation is conditioned on the observed state (optimistic concurrency).
// The per-queue serving slot is the critical shared resource; different
// queues are fully independent.

use crate::domain::Ticket;
use crate::error::{AppError, Result};
use crate::port::{QueueConfigStore, TicketRepository, TimeProvider};
use tracing::{debug, info};

/// Result of a call-next attempt
#[derive(Debug, Clone)]
pub enum CallNextOutcome {
    /// The front of the waiting line was seated
    Advanced(Ticket),
    /// The serving slot is occupied and nothing forced it open.
    /// A legitimate rest state awaiting explicit completion, not an error.
    SlotBusy,
    /// No waiting ticket exists
    Empty,
}

/// Seat the next waiting ticket, honoring the occupied-slot guard.
///
/// With a ticket already serving, advancing requires either the queue's
/// `auto_advance` flag or the caller's `force` (a staff skip that already
/// vacated the slot). The claim itself is atomic at the store and refuses
/// to seat a second ticket, so a racing call reports `SlotBusy` instead of
/// double-seating.
pub async fn call_next(
    repo: &dyn TicketRepository,
    config_store: &dyn QueueConfigStore,
    queue_id: &str,
    force: bool,
) -> Result<CallNextOutcome> {
    let config = config_store.get_config(queue_id).await?;

    if !force && !config.auto_advance && repo.count_serving(queue_id, None).await? > 0 {
        debug!(queue_id = %queue_id, "serving slot occupied, not advancing");
        return Ok(CallNextOutcome::SlotBusy);
    }

    match repo.claim_next(queue_id).await? {
        Some(ticket) => {
            info!(
                ticket_id = %ticket.id,
                number = ticket.number,
                queue_id = %queue_id,
                "seated next ticket"
            );
            Ok(CallNextOutcome::Advanced(ticket))
        }
        None => {
            if repo.count_waiting(queue_id).await? == 0 {
                Ok(CallNextOutcome::Empty)
            } else {
                // Lost the seat to a concurrent claim
                Ok(CallNextOutcome::SlotBusy)
            }
        }
    }
}

/// Complete the serving ticket, stamping `completed_at`.
///
/// With `auto_advance` on, the follow-up call-next runs before this function
/// returns: complete-then-advance is one logical operation, never left
/// half-done as a rest state.
pub async fn complete_service(
    repo: &dyn TicketRepository,
    config_store: &dyn QueueConfigStore,
    time_provider: &dyn TimeProvider,
    ticket_id: &str,
    queue_id: &str,
) -> Result<()> {
    let now = time_provider.now_millis();
    if !repo.complete(&ticket_id.to_string(), queue_id, now).await? {
        return Err(AppError::StaleTicket {
            ticket_id: ticket_id.to_string(),
        });
    }
    info!(ticket_id = %ticket_id, queue_id = %queue_id, "service completed");

    let config = config_store.get_config(queue_id).await?;
    if config.auto_advance {
        call_next(repo, config_store, queue_id, false).await?;
    }
    Ok(())
}

/// Staff skip of the serving ticket.
///
/// With `auto_rollback` the ticket re-enters the waiting line at the back of
/// its priority tier (refreshed arrival timestamp); otherwise it is
/// cancelled. Either way the queue is advanced with force: a human already
/// decided to vacate the slot, regardless of `auto_advance`.
pub async fn skip(
    repo: &dyn TicketRepository,
    config_store: &dyn QueueConfigStore,
    time_provider: &dyn TimeProvider,
    ticket_id: &str,
    queue_id: &str,
) -> Result<()> {
    let config = config_store.get_config(queue_id).await?;
    let id = ticket_id.to_string();

    let vacated = if config.auto_rollback {
        repo.requeue(&id, queue_id, time_provider.now_millis())
            .await?
    } else {
        repo.cancel_serving(&id, queue_id).await?
    };
    if !vacated {
        return Err(AppError::StaleTicket {
            ticket_id: ticket_id.to_string(),
        });
    }
    info!(
        ticket_id = %ticket_id,
        queue_id = %queue_id,
        rollback = config.auto_rollback,
        "ticket skipped"
    );

    call_next(repo, config_store, queue_id, true).await?;
    Ok(())
}

/// Flip a waiting ticket's priority flag, moving it to the front of (or back
/// from) the priority tier without touching its arrival timestamp.
pub async fn set_priority(
    repo: &dyn TicketRepository,
    ticket_id: &str,
    value: bool,
) -> Result<()> {
    let id = ticket_id.to_string();
    if repo.set_priority(&id, value).await? {
        info!(ticket_id = %ticket_id, priority = value, "ticket priority changed");
        return Ok(());
    }
    match repo.find_by_id(&id).await? {
        None => Err(AppError::NotFound(format!("ticket {} not found", ticket_id))),
        Some(_) => Err(AppError::NotWaiting {
            ticket_id: ticket_id.to_string(),
        }),
    }
}
