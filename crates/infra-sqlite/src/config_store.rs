// SQLite QueueConfigStore Implementation

use crate::ticket_repository::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use waitline_core::domain::{QueueConfig, DEFAULT_AVG_SERVICE_TIME_MINUTES};
use waitline_core::error::{AppError, Result};
use waitline_core::port::QueueConfigStore;

pub struct SqliteQueueConfigStore {
    pool: SqlitePool,
}

impl SqliteQueueConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueConfigStore for SqliteQueueConfigStore {
    async fn get_config(&self, queue_id: &str) -> Result<QueueConfig> {
        let row = sqlx::query_as::<_, QueueRow>("SELECT * FROM queues WHERE id = ?")
            .bind(queue_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(r) => Ok(r.into_config()),
            None => Err(AppError::NotFound(format!("queue {} not found", queue_id))),
        }
    }

    async fn save_config(&self, config: &QueueConfig) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queues (
                id, name, max_capacity, avg_service_time_minutes,
                maintenance_mode, auto_advance, auto_rollback
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                max_capacity = excluded.max_capacity,
                avg_service_time_minutes = excluded.avg_service_time_minutes,
                maintenance_mode = excluded.maintenance_mode,
                auto_advance = excluded.auto_advance,
                auto_rollback = excluded.auto_rollback
            "#,
        )
        .bind(&config.id)
        .bind(&config.name)
        .bind(config.max_capacity)
        .bind(config.avg_service_time_minutes)
        .bind(config.maintenance_mode)
        .bind(config.auto_advance)
        .bind(config.auto_rollback)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct QueueRow {
    id: String,
    name: String,
    max_capacity: Option<i64>,
    avg_service_time_minutes: Option<i64>,
    maintenance_mode: i32,
    auto_advance: i32,
    auto_rollback: i32,
}

impl QueueRow {
    fn into_config(self) -> QueueConfig {
        // Rows without a usable service time fall back to the default
        let avg = match self.avg_service_time_minutes {
            Some(v) if v > 0 => v,
            _ => DEFAULT_AVG_SERVICE_TIME_MINUTES,
        };

        QueueConfig {
            id: self.id,
            name: self.name,
            max_capacity: self.max_capacity,
            avg_service_time_minutes: avg,
            maintenance_mode: self.maintenance_mode != 0,
            auto_advance: self.auto_advance != 0,
            auto_rollback: self.auto_rollback != 0,
        }
    }
}
