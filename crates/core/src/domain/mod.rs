// Domain Layer - Pure business logic and entities

pub mod error;
pub mod queue;
pub mod ticket;

// Re-exports
pub use error::DomainError;
pub use queue::{QueueConfig, QueueId, DEFAULT_AVG_SERVICE_TIME_MINUTES};
pub use ticket::{queue_order, HolderId, Ticket, TicketId, TicketNumber, TicketStatus};
