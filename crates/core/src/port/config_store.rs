// Queue Configuration Port

use crate::domain::QueueConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Access to per-queue settings.
///
/// Configuration is read fresh on every admission/advancement decision;
/// the engine never caches it across calls.
#[async_trait]
pub trait QueueConfigStore: Send + Sync {
    /// Fetch the configuration for a queue; `NotFound` if unconfigured
    async fn get_config(&self, queue_id: &str) -> Result<QueueConfig>;

    /// Create or replace a queue's configuration (administrative path)
    async fn save_config(&self, config: &QueueConfig) -> Result<()>;
}
