// Position/ETA Estimator
//
// A pure read over store state: computes a ticket's live rank and expected
// service time from the current snapshot and queue configuration. Never
// mutates anything and is safe to call repeatedly after every store change.

use crate::domain::{QueueConfig, Ticket, TicketStatus};
use crate::error::Result;
use crate::port::TicketRepository;
use chrono::{Local, TimeZone};

/// Live queue metrics for one ticket, as displayed to its holder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMetrics {
    /// 1-based rank; the ticket counts itself
    pub position: i64,
    /// Total occupants of the active pipeline (serving + waiting),
    /// regardless of whose perspective is asked
    pub total_in_line: i64,
    /// "Next!" when no one is ahead, otherwise a minutes label
    pub estimated_wait: String,
    /// Local time-of-day at which service is expected to start
    pub service_around: String,
}

/// Estimate position and wait for a ticket from current store state.
pub async fn estimate(
    repo: &dyn TicketRepository,
    config: &QueueConfig,
    ticket: &Ticket,
    now_millis: i64,
) -> Result<QueueMetrics> {
    let people_ahead = if ticket.status == TicketStatus::Serving {
        0
    } else {
        // The one being served (if not the observer) plus every waiting
        // ticket ranked strictly before this one.
        let serving = repo.count_serving(&ticket.queue_id, Some(&ticket.id)).await?;
        let waiting_ahead = repo.count_waiting_ahead(ticket).await?;
        serving + waiting_ahead
    };

    let serving_total = repo.count_serving(&ticket.queue_id, None).await?;
    let waiting_total = repo.count_waiting(&ticket.queue_id).await?;

    let wait_minutes = people_ahead * config.avg_service_time_minutes;

    Ok(QueueMetrics {
        position: people_ahead + 1,
        total_in_line: serving_total + waiting_total,
        estimated_wait: if people_ahead == 0 {
            "Next!".to_string()
        } else {
            format!("~{} mins", wait_minutes)
        },
        service_around: format_local_time(now_millis + wait_minutes * 60_000),
    })
}

/// Render an epoch-ms instant as a local time-of-day string (e.g. "2:45 PM")
fn format_local_time(at_millis: i64) -> String {
    match Local.timestamp_millis_opt(at_millis).single() {
        Some(t) => t.format("%-I:%M %p").to_string(),
        None => "--:--".to_string(),
    }
}
