use std::sync::Arc;

use tokio::sync::Mutex;

use shared_config::AppConfig;

use crate::services::counters::AttentionCounters;
use crate::services::scheduler::{Clock, SystemClock};

/// Shared by every appointment handler. `allocation` is the single-writer
/// lock held across find-then-insert.
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub counters: Arc<AttentionCounters>,
    pub allocation: Mutex<()>,
    pub clock: Arc<dyn Clock>,
}

impl AppointmentState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            counters: Arc::new(AttentionCounters::new()),
            allocation: Mutex::new(()),
            clock,
        }
    }
}
