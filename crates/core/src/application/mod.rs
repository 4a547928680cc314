// Application Layer - Use cases on top of the domain and ports

pub mod admission;
pub mod advancement;
pub mod estimator;

#[cfg(test)]
pub(crate) mod test_support;

pub use advancement::CallNextOutcome;
pub use estimator::QueueMetrics;

use crate::domain::{QueueConfig, Ticket};
use crate::error::Result;
use crate::port::{IdProvider, QueueConfigStore, TicketRepository, TimeProvider};
use std::sync::Arc;

/// Queue Service - the operation set exposed to the request-handling layer.
///
/// Holds its collaborators as explicit dependencies; there is no ambient
/// store client. All operations are short synchronous request/response
/// calls against the shared store.
pub struct QueueService {
    tickets: Arc<dyn TicketRepository>,
    configs: Arc<dyn QueueConfigStore>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
}

impl QueueService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        configs: Arc<dyn QueueConfigStore>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            tickets,
            configs,
            time_provider,
            id_provider,
        }
    }

    /// Obtain a ticket for a holder
    pub async fn join_queue(&self, holder_id: &str, queue_id: &str) -> Result<Ticket> {
        admission::join(
            self.tickets.as_ref(),
            self.configs.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            holder_id,
            queue_id,
        )
        .await
    }

    /// Voluntarily leave a queue (never auto-advances)
    pub async fn leave_queue(&self, ticket_id: &str) -> Result<()> {
        admission::leave(self.tickets.as_ref(), ticket_id).await
    }

    /// Live position/ETA metrics for a ticket
    pub async fn estimate(&self, ticket: &Ticket) -> Result<QueueMetrics> {
        let config = self.configs.get_config(&ticket.queue_id).await?;
        estimator::estimate(
            self.tickets.as_ref(),
            &config,
            ticket,
            self.time_provider.now_millis(),
        )
        .await
    }

    /// Waiting + serving tickets in display order (serving first)
    pub async fn list_active_queue(&self, queue_id: &str) -> Result<Vec<Ticket>> {
        self.tickets.list_active(queue_id).await
    }

    /// Seat the next waiting ticket
    pub async fn call_next(&self, queue_id: &str, force: bool) -> Result<CallNextOutcome> {
        advancement::call_next(self.tickets.as_ref(), self.configs.as_ref(), queue_id, force)
            .await
    }

    /// Complete the serving ticket (advances automatically when configured)
    pub async fn complete_service(&self, ticket_id: &str, queue_id: &str) -> Result<()> {
        advancement::complete_service(
            self.tickets.as_ref(),
            self.configs.as_ref(),
            self.time_provider.as_ref(),
            ticket_id,
            queue_id,
        )
        .await
    }

    /// Staff skip of the serving ticket (always advances)
    pub async fn skip(&self, ticket_id: &str, queue_id: &str) -> Result<()> {
        advancement::skip(
            self.tickets.as_ref(),
            self.configs.as_ref(),
            self.time_provider.as_ref(),
            ticket_id,
            queue_id,
        )
        .await
    }

    /// Flip a waiting ticket's priority flag
    pub async fn set_priority(&self, ticket_id: &str, value: bool) -> Result<()> {
        advancement::set_priority(self.tickets.as_ref(), ticket_id, value).await
    }

    /// A holder's completed/cancelled tickets, newest first
    pub async fn ticket_history(&self, holder_id: &str) -> Result<Vec<Ticket>> {
        self.tickets.history_for_holder(holder_id).await
    }

    /// Current configuration of a queue
    pub async fn queue_config(&self, queue_id: &str) -> Result<QueueConfig> {
        self.configs.get_config(queue_id).await
    }
}
