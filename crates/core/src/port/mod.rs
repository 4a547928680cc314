// Port Layer - Interfaces for external dependencies

pub mod config_store;
pub mod id_provider; // For deterministic testing
pub mod ticket_repository;
pub mod time_provider;

// Re-exports
pub use config_store::QueueConfigStore;
pub use id_provider::IdProvider;
pub use ticket_repository::{NewTicket, TicketRepository};
pub use time_provider::TimeProvider;
