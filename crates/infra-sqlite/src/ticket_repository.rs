// SQLite TicketRepository Implementation
//
// Every state transition is a single conditional statement: the WHERE clause
// restates the expected prior state and rows_affected tells the caller
// whether the transition actually happened. The serving-slot claim and the
// admission guards ride inside one statement each, so SQLite's single-writer
// model makes them atomic.

use async_trait::async_trait;
use sqlx::SqlitePool;
use waitline_core::domain::{Ticket, TicketId, TicketStatus};
use waitline_core::error::{AppError, Result};
use waitline_core::port::{NewTicket, TicketRepository};

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "787" | "3850" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => AppError::Database(err.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|c| c.as_ref() == "2067" || c.as_ref() == "1555")
            .unwrap_or(false),
        _ => false,
    }
}

pub struct SqliteTicketRepository {
    pool: SqlitePool,
}

impl SqliteTicketRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for SqliteTicketRepository {
    async fn try_insert_waiting(
        &self,
        new: &NewTicket,
        max_capacity: Option<i64>,
    ) -> Result<Option<Ticket>> {
        // Admission guards (holder not already active, capacity) and the
        // sequence-number assignment run in the same statement as the
        // insert, so racing joins cannot overshoot a nearly-full queue.
        let result = sqlx::query_as::<_, TicketRow>(
            r#"
            INSERT INTO tickets (
                id, queue_id, holder_id, number,
                status, is_priority, created_at, completed_at
            )
            SELECT ?1, ?2, ?3,
                   COALESCE((SELECT MAX(number) FROM tickets WHERE queue_id = ?2), 0) + 1,
                   'WAITING', 0, ?4, NULL
            WHERE NOT EXISTS (
                    SELECT 1 FROM tickets
                    WHERE queue_id = ?2 AND holder_id = ?3
                      AND status IN ('WAITING', 'SERVING')
                  )
              AND (?5 IS NULL OR (
                    SELECT COUNT(*) FROM tickets
                    WHERE queue_id = ?2 AND status IN ('WAITING', 'SERVING')
                  ) < ?5)
            RETURNING *
            "#,
        )
        .bind(&new.id)
        .bind(&new.queue_id)
        .bind(&new.holder_id)
        .bind(new.created_at)
        .bind(max_capacity)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.map(|r| r.into_ticket())),
            // The partial unique index caught a holder race the NOT EXISTS
            // guard could not see: treat it as a guard rejection.
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(map_sqlx_error(e)),
        }
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_ticket()))
    }

    async fn find_active_for_holder(
        &self,
        queue_id: &str,
        holder_id: &str,
    ) -> Result<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT * FROM tickets
            WHERE queue_id = ? AND holder_id = ?
              AND status IN ('WAITING', 'SERVING')
            "#,
        )
        .bind(queue_id)
        .bind(holder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_ticket()))
    }

    async fn count_active(&self, queue_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE queue_id = ? AND status IN ('WAITING', 'SERVING')",
        )
        .bind(queue_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn count_serving(&self, queue_id: &str, exclude: Option<&TicketId>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tickets
            WHERE queue_id = ?1 AND status = 'SERVING'
              AND (?2 IS NULL OR id != ?2)
            "#,
        )
        .bind(queue_id)
        .bind(exclude.cloned())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn count_waiting(&self, queue_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE queue_id = ? AND status = 'WAITING'",
        )
        .bind(queue_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn count_waiting_ahead(&self, ticket: &Ticket) -> Result<i64> {
        // Rank under the ordering policy: priority tier first, then arrival,
        // then sequence number as the stable tie-break.
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tickets
            WHERE queue_id = ?1 AND status = 'WAITING' AND id != ?2
              AND (is_priority > ?3
                   OR (is_priority = ?3 AND created_at < ?4)
                   OR (is_priority = ?3 AND created_at = ?4 AND number < ?5))
            "#,
        )
        .bind(&ticket.queue_id)
        .bind(&ticket.id)
        .bind(ticket.is_priority)
        .bind(ticket.created_at)
        .bind(ticket.number)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn list_active(&self, queue_id: &str) -> Result<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            r#"
            SELECT * FROM tickets
            WHERE queue_id = ? AND status IN ('WAITING', 'SERVING')
            ORDER BY CASE status WHEN 'SERVING' THEN 0 ELSE 1 END,
                     is_priority DESC, created_at ASC, number ASC
            "#,
        )
        .bind(queue_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_ticket()).collect())
    }

    async fn claim_next(&self, queue_id: &str) -> Result<Option<Ticket>> {
        // Selection and transition in one statement, conditioned on an empty
        // serving slot: concurrent claims can never seat two tickets.
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            UPDATE tickets
            SET status = 'SERVING'
            WHERE id = (
                SELECT id FROM tickets
                WHERE queue_id = ?1 AND status = 'WAITING'
                ORDER BY is_priority DESC, created_at ASC, number ASC
                LIMIT 1
            )
            AND NOT EXISTS (
                SELECT 1 FROM tickets WHERE queue_id = ?1 AND status = 'SERVING'
            )
            RETURNING *
            "#,
        )
        .bind(queue_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_ticket()))
    }

    async fn complete(&self, id: &TicketId, queue_id: &str, now_millis: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'COMPLETED', completed_at = ?3
            WHERE id = ?1 AND queue_id = ?2 AND status = 'SERVING'
            "#,
        )
        .bind(id)
        .bind(queue_id)
        .bind(now_millis)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn cancel_active(&self, id: &TicketId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'CANCELLED'
            WHERE id = ? AND status IN ('WAITING', 'SERVING')
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn cancel_serving(&self, id: &TicketId, queue_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'CANCELLED'
            WHERE id = ?1 AND queue_id = ?2 AND status = 'SERVING'
            "#,
        )
        .bind(id)
        .bind(queue_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn requeue(&self, id: &TicketId, queue_id: &str, now_millis: i64) -> Result<bool> {
        // Refreshed arrival timestamp pushes the ticket to the back of its
        // priority tier; the tier itself is kept.
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'WAITING', created_at = ?3
            WHERE id = ?1 AND queue_id = ?2 AND status = 'SERVING'
            "#,
        )
        .bind(id)
        .bind(queue_id)
        .bind(now_millis)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_priority(&self, id: &TicketId, value: bool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE tickets SET is_priority = ?2 WHERE id = ?1 AND status = 'WAITING'",
        )
        .bind(id)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn history_for_holder(&self, holder_id: &str) -> Result<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            r#"
            SELECT * FROM tickets
            WHERE holder_id = ? AND status IN ('COMPLETED', 'CANCELLED')
            ORDER BY created_at DESC
            "#,
        )
        .bind(holder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_ticket()).collect())
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: String,
    queue_id: String,
    holder_id: String,
    number: i64,
    status: String,
    is_priority: i32, // SQLite boolean as integer
    created_at: i64,
    completed_at: Option<i64>,
}

impl TicketRow {
    fn into_ticket(self) -> Ticket {
        // Unknown status strings should not exist; fall back to Cancelled
        let status = TicketStatus::parse(&self.status).unwrap_or(TicketStatus::Cancelled);

        Ticket {
            id: self.id,
            queue_id: self.queue_id,
            holder_id: self.holder_id,
            number: self.number,
            status,
            is_priority: self.is_priority != 0,
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}
