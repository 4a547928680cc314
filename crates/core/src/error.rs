// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Business-rule rejections (`AlreadyActive`, `CapacityExceeded`,
/// `StaleTicket`, `NotWaiting`) are surfaced to the caller synchronously and
/// never retried by the core; retrying a non-idempotent transition blindly
/// could double-apply it.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Holder already has an active ticket in queue {queue_id}")]
    AlreadyActive { queue_id: String },

    #[error("Queue is full (max capacity: {max})")]
    CapacityExceeded { max: i64 },

    #[error("Ticket {ticket_id} was already processed by another actor")]
    StaleTicket { ticket_id: String },

    #[error("Ticket {ticket_id} is not waiting")]
    NotWaiting { ticket_id: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// From implementation for infra crates (to avoid circular dependency)
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Database(err)
    }
}

// Note: sqlx::Error conversion is handled in infra-sqlite
// by converting to AppError::Database(String)
