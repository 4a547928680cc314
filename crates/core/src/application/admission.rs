// Queue Admission - joining and voluntary leaving

use crate::domain::Ticket;
use crate::error::{AppError, Result};
use crate::port::{IdProvider, NewTicket, QueueConfigStore, TicketRepository, TimeProvider};
use tracing::info;

/// Join a queue: create a waiting ticket for the holder.
///
/// The holder-already-active and capacity guards run inside the store's
/// guarded insert, atomically with the insert itself; on rejection the
/// current state is re-read only to classify the reason.
pub async fn join(
    repo: &dyn TicketRepository,
    config_store: &dyn QueueConfigStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    holder_id: &str,
    queue_id: &str,
) -> Result<Ticket> {
    let config = match config_store.get_config(queue_id).await {
        Ok(config) => config,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::Validation(format!(
                "queue {} is not configured",
                queue_id
            )))
        }
        Err(e) => return Err(e),
    };

    if config.maintenance_mode {
        return Err(AppError::Validation(format!(
            "queue {} is under maintenance",
            queue_id
        )));
    }

    let new = NewTicket {
        id: id_provider.ticket_id(),
        queue_id: queue_id.to_string(),
        holder_id: holder_id.to_string(),
        created_at: time_provider.now_millis(),
    };

    match repo.try_insert_waiting(&new, config.max_capacity).await? {
        Some(ticket) => {
            info!(
                ticket_id = %ticket.id,
                number = ticket.number,
                queue_id = %queue_id,
                "ticket joined queue"
            );
            Ok(ticket)
        }
        None => {
            if repo
                .find_active_for_holder(queue_id, holder_id)
                .await?
                .is_some()
            {
                return Err(AppError::AlreadyActive {
                    queue_id: queue_id.to_string(),
                });
            }
            match config.max_capacity {
                Some(max) if repo.count_active(queue_id).await? >= max => {
                    Err(AppError::CapacityExceeded { max })
                }
                _ => Err(AppError::Internal(format!(
                    "admission guard rejected join for holder {} without a visible cause",
                    holder_id
                ))),
            }
        }
    }
}

/// Leave a queue: cancel the holder's ticket from any active state.
///
/// Never advances the queue, even when the leaver occupied the serving slot;
/// callers wanting the slot refilled invoke the advancement engine
/// explicitly. Leaving is a customer action, skip is a staff action.
pub async fn leave(repo: &dyn TicketRepository, ticket_id: &str) -> Result<()> {
    if repo.cancel_active(&ticket_id.to_string()).await? {
        info!(ticket_id = %ticket_id, "ticket left queue");
        Ok(())
    } else {
        // Missing or already terminal: nothing left to cancel either way
        Err(AppError::NotFound(format!(
            "ticket {} is not active",
            ticket_id
        )))
    }
}
