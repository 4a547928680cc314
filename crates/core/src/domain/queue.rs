// Queue Domain Model

use serde::{Deserialize, Serialize};

/// Queue identifier
pub type QueueId = String;

/// Fallback when a queue row carries no usable service time
pub const DEFAULT_AVG_SERVICE_TIME_MINUTES: i64 = 5;

/// Per-queue settings, read fresh on every admission/advancement decision.
///
/// A stale flag read mid-operation (an admin toggling `auto_advance` while a
/// completion is in flight) is an accepted race: configuration changes are
/// rare administrative actions, not part of the concurrency contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub id: QueueId,
    pub name: String,
    /// None = unlimited
    pub max_capacity: Option<i64>,
    pub avg_service_time_minutes: i64,
    pub maintenance_mode: bool,
    /// Completing a service immediately pulls in the next ticket
    pub auto_advance: bool,
    /// A skipped serving ticket re-enters the waiting line instead of being cancelled
    pub auto_rollback: bool,
}

impl QueueConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_capacity: None,
            avg_service_time_minutes: DEFAULT_AVG_SERVICE_TIME_MINUTES,
            maintenance_mode: false,
            auto_advance: false,
            auto_rollback: false,
        }
    }
}
