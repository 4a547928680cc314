// Waitline Infrastructure - SQLite Adapter
// Implements: TicketRepository, QueueConfigStore

mod config_store;
mod connection;
mod migration;
mod ticket_repository;

pub use config_store::SqliteQueueConfigStore;
pub use connection::create_pool;
pub use migration::run_migrations;
pub use ticket_repository::SqliteTicketRepository;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
