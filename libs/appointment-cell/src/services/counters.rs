use tokio::sync::watch;
use tracing::debug;

use crate::models::{AttentionRecord, Consultation, CounterSnapshot};
use crate::services::recorder::service_from_description;
use crate::services::scheduler::parse_slot;

/// Running clinic totals published over a watch channel so dashboards
/// can follow them without polling the store.
pub struct AttentionCounters {
    tx: watch::Sender<CounterSnapshot>,
}

impl Default for AttentionCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl AttentionCounters {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CounterSnapshot::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<CounterSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.tx.borrow().clone()
    }

    /// Initial totals loaded from the store at startup.
    pub fn seed(&self, total_pets: u64, total_consultations: u64) {
        self.tx.send_modify(|s| {
            s.total_pets = total_pets;
            s.total_consultations = total_consultations;
        });
    }

    /// Seeds the totals from the stored calendar. The last service type comes
    /// from the consultation with the latest slot.
    pub fn seed_from_calendar(&self, total_pets: u64, consultations: &[Consultation]) {
        let last_service = consultations
            .iter()
            .filter_map(|c| parse_slot(&c.date_time).ok().map(|at| (at, c)))
            .max_by_key(|(at, _)| *at)
            .and_then(|(_, c)| service_from_description(&c.description));

        self.tx.send_modify(|s| {
            s.total_pets = total_pets;
            s.total_consultations = consultations.len() as u64;
            s.last_service_type = last_service.map(|service| service.label().to_string());
        });
    }

    pub fn record(&self, record: &AttentionRecord) {
        let summary = record.summary_line();
        self.tx.send_modify(|s| {
            s.total_pets += record.pet_count as u64;
            s.total_consultations += 1;
            s.last_owner = record.owner_name.clone();
            s.last_service_type = Some(record.service_type.label().to_string());
            s.pet_summaries.push(summary);
        });
        debug!("Counters updated after attention for {}", record.owner_name);
    }

    /// Drops a summary line; both totals shrink (never below zero) only
    /// when the line was actually present.
    pub fn forget_pet(&self, summary: &str) -> bool {
        self.tx.send_if_modified(|s| {
            let before = s.pet_summaries.len();
            s.pet_summaries.retain(|line| line != summary);
            if s.pet_summaries.len() == before {
                return false;
            }
            s.total_consultations = s.total_consultations.saturating_sub(1);
            s.total_pets = s.total_pets.saturating_sub(1);
            true
        })
    }

    pub fn rename_pet(&self, original: &str, replacement: &str) -> bool {
        self.tx.send_if_modified(|s| {
            let mut changed = false;
            for line in s.pet_summaries.iter_mut().filter(|line| *line == original) {
                *line = replacement.to_string();
                changed = true;
            }
            changed
        })
    }
}
