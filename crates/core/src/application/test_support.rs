// Hand-written in-memory port implementations for core unit tests.
// Mutations go through the domain state machine, so these mocks reject the
// same transitions the real store's conditional updates would.

use crate::domain::{queue_order, QueueConfig, Ticket, TicketId, TicketStatus};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, NewTicket, QueueConfigStore, TicketRepository, TimeProvider,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

pub struct InMemoryTicketRepository {
    tickets: Mutex<Vec<Ticket>>,
    seed_seq: AtomicU64,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self {
            tickets: Mutex::new(Vec::new()),
            seed_seq: AtomicU64::new(1),
        }
    }

    /// Insert a waiting ticket directly, bypassing admission guards
    pub async fn seed_waiting(&self, queue_id: &str, holder_id: &str, created_at: i64) -> Ticket {
        let n = self.seed_seq.fetch_add(1, Ordering::SeqCst);
        let mut tickets = self.tickets.lock().unwrap();
        let number = tickets
            .iter()
            .filter(|t| t.queue_id == queue_id)
            .map(|t| t.number)
            .max()
            .unwrap_or(0)
            + 1;
        let ticket = Ticket::new(format!("seed-{}", n), queue_id, holder_id, number, created_at);
        tickets.push(ticket.clone());
        ticket
    }

    /// Move a ticket into the serving slot, bypassing the claim guard
    pub async fn force_serve(&self, id: &str) {
        let mut tickets = self.tickets.lock().unwrap();
        let t = tickets.iter_mut().find(|t| t.id == id).unwrap();
        t.serve().unwrap();
    }

    pub async fn force_priority(&self, id: &str) {
        let mut tickets = self.tickets.lock().unwrap();
        let t = tickets.iter_mut().find(|t| t.id == id).unwrap();
        t.set_priority(true).unwrap();
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn try_insert_waiting(
        &self,
        new: &NewTicket,
        max_capacity: Option<i64>,
    ) -> Result<Option<Ticket>> {
        let mut tickets = self.tickets.lock().unwrap();
        let holder_active = tickets.iter().any(|t| {
            t.queue_id == new.queue_id && t.holder_id == new.holder_id && t.status.is_active()
        });
        if holder_active {
            return Ok(None);
        }
        let active = tickets
            .iter()
            .filter(|t| t.queue_id == new.queue_id && t.status.is_active())
            .count() as i64;
        if let Some(max) = max_capacity {
            if active >= max {
                return Ok(None);
            }
        }
        let number = tickets
            .iter()
            .filter(|t| t.queue_id == new.queue_id)
            .map(|t| t.number)
            .max()
            .unwrap_or(0)
            + 1;
        let ticket = Ticket::new(
            new.id.clone(),
            new.queue_id.clone(),
            new.holder_id.clone(),
            number,
            new.created_at,
        );
        tickets.push(ticket.clone());
        Ok(Some(ticket))
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>> {
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets.iter().find(|t| &t.id == id).cloned())
    }

    async fn find_active_for_holder(
        &self,
        queue_id: &str,
        holder_id: &str,
    ) -> Result<Option<Ticket>> {
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets
            .iter()
            .find(|t| t.queue_id == queue_id && t.holder_id == holder_id && t.status.is_active())
            .cloned())
    }

    async fn count_active(&self, queue_id: &str) -> Result<i64> {
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets
            .iter()
            .filter(|t| t.queue_id == queue_id && t.status.is_active())
            .count() as i64)
    }

    async fn count_serving(&self, queue_id: &str, exclude: Option<&TicketId>) -> Result<i64> {
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets
            .iter()
            .filter(|t| {
                t.queue_id == queue_id
                    && t.status == TicketStatus::Serving
                    && exclude.map_or(true, |ex| &t.id != ex)
            })
            .count() as i64)
    }

    async fn count_waiting(&self, queue_id: &str) -> Result<i64> {
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets
            .iter()
            .filter(|t| t.queue_id == queue_id && t.status == TicketStatus::Waiting)
            .count() as i64)
    }

    async fn count_waiting_ahead(&self, ticket: &Ticket) -> Result<i64> {
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets
            .iter()
            .filter(|t| {
                t.queue_id == ticket.queue_id
                    && t.status == TicketStatus::Waiting
                    && t.id != ticket.id
                    && queue_order(t, ticket) == std::cmp::Ordering::Less
            })
            .count() as i64)
    }

    async fn list_active(&self, queue_id: &str) -> Result<Vec<Ticket>> {
        let tickets = self.tickets.lock().unwrap();
        let mut active: Vec<Ticket> = tickets
            .iter()
            .filter(|t| t.queue_id == queue_id && t.status.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            let slot = |t: &Ticket| (t.status != TicketStatus::Serving) as u8;
            slot(a).cmp(&slot(b)).then(queue_order(a, b))
        });
        Ok(active)
    }

    async fn claim_next(&self, queue_id: &str) -> Result<Option<Ticket>> {
        let mut tickets = self.tickets.lock().unwrap();
        let slot_taken = tickets
            .iter()
            .any(|t| t.queue_id == queue_id && t.status == TicketStatus::Serving);
        if slot_taken {
            return Ok(None);
        }
        let front = tickets
            .iter()
            .filter(|t| t.queue_id == queue_id && t.status == TicketStatus::Waiting)
            .min_by(|a, b| queue_order(a, b))
            .map(|t| t.id.clone());
        match front {
            Some(id) => {
                let t = tickets.iter_mut().find(|t| t.id == id).unwrap();
                t.serve().map_err(AppError::Domain)?;
                Ok(Some(t.clone()))
            }
            None => Ok(None),
        }
    }

    async fn complete(&self, id: &TicketId, queue_id: &str, now_millis: i64) -> Result<bool> {
        let mut tickets = self.tickets.lock().unwrap();
        match tickets.iter_mut().find(|t| {
            &t.id == id && t.queue_id == queue_id && t.status == TicketStatus::Serving
        }) {
            Some(t) => {
                t.complete(now_millis).map_err(AppError::Domain)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn cancel_active(&self, id: &TicketId) -> Result<bool> {
        let mut tickets = self.tickets.lock().unwrap();
        match tickets
            .iter_mut()
            .find(|t| &t.id == id && t.status.is_active())
        {
            Some(t) => {
                t.cancel().map_err(AppError::Domain)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn cancel_serving(&self, id: &TicketId, queue_id: &str) -> Result<bool> {
        let mut tickets = self.tickets.lock().unwrap();
        match tickets.iter_mut().find(|t| {
            &t.id == id && t.queue_id == queue_id && t.status == TicketStatus::Serving
        }) {
            Some(t) => {
                t.cancel().map_err(AppError::Domain)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn requeue(&self, id: &TicketId, queue_id: &str, now_millis: i64) -> Result<bool> {
        let mut tickets = self.tickets.lock().unwrap();
        match tickets.iter_mut().find(|t| {
            &t.id == id && t.queue_id == queue_id && t.status == TicketStatus::Serving
        }) {
            Some(t) => {
                t.requeue(now_millis).map_err(AppError::Domain)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_priority(&self, id: &TicketId, value: bool) -> Result<bool> {
        let mut tickets = self.tickets.lock().unwrap();
        match tickets
            .iter_mut()
            .find(|t| &t.id == id && t.status == TicketStatus::Waiting)
        {
            Some(t) => {
                t.set_priority(value).map_err(AppError::Domain)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn history_for_holder(&self, holder_id: &str) -> Result<Vec<Ticket>> {
        let tickets = self.tickets.lock().unwrap();
        let mut history: Vec<Ticket> = tickets
            .iter()
            .filter(|t| t.holder_id == holder_id && t.status.is_terminal())
            .cloned()
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(history)
    }
}

pub struct StaticConfigStore {
    configs: Mutex<HashMap<String, QueueConfig>>,
}

impl StaticConfigStore {
    pub fn new() -> Self {
        Self {
            configs: Mutex::new(HashMap::new()),
        }
    }

    pub async fn put(&self, config: QueueConfig) {
        self.configs
            .lock()
            .unwrap()
            .insert(config.id.clone(), config);
    }
}

#[async_trait]
impl QueueConfigStore for StaticConfigStore {
    async fn get_config(&self, queue_id: &str) -> Result<QueueConfig> {
        self.configs
            .lock()
            .unwrap()
            .get(queue_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("queue {} not found", queue_id)))
    }

    async fn save_config(&self, config: &QueueConfig) -> Result<()> {
        self.put(config.clone()).await;
        Ok(())
    }
}

pub struct FixedTimeProvider {
    now: AtomicI64,
}

impl FixedTimeProvider {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

pub struct SeqIdProvider {
    next: AtomicU64,
}

impl SeqIdProvider {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl IdProvider for SeqIdProvider {
    fn ticket_id(&self) -> String {
        format!("ticket-{}", self.next.fetch_add(1, Ordering::SeqCst))
    }
}
