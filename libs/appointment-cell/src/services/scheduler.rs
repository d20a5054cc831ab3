use chrono::{Datelike, Duration, Local, NaiveDateTime, NaiveTime, Timelike, Weekday};
use tracing::{debug, warn};

use crate::models::{AppointmentError, Consultation, SlotAssignment, Veterinarian, ROSTER};

/// Canonical display format; also the conflict comparison key.
pub const SLOT_FORMAT: &str = "%d/%m/%Y %H:%M";

pub const OPENING_HOUR: u32 = 9;
pub const CLOSING_HOUR: u32 = 18;
pub const SLOT_STEP_MINUTES: i64 = 30;
pub const LEAD_TIME_HOURS: i64 = 1;

/// Source of "now" as local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn format_slot(date_time: NaiveDateTime) -> String {
    date_time.format(SLOT_FORMAT).to_string()
}

pub fn parse_slot(formatted: &str) -> Result<NaiveDateTime, AppointmentError> {
    NaiveDateTime::parse_from_str(formatted, SLOT_FORMAT)
        .map_err(|e| AppointmentError::ValidationError(format!("Invalid slot '{}': {}", formatted, e)))
}

pub fn is_weekend(date_time: NaiveDateTime) -> bool {
    matches!(date_time.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday to Friday, 09:00 inclusive to 18:00 exclusive.
pub fn is_business_hours(date_time: NaiveDateTime) -> bool {
    !is_weekend(date_time) && (OPENING_HOUR..CLOSING_HOUR).contains(&date_time.hour())
}

fn at_hour(date_time: NaiveDateTime, hour: u32) -> NaiveDateTime {
    date_time.date().and_time(NaiveTime::MIN) + Duration::hours(hour as i64)
}

fn top_of_hour(date_time: NaiveDateTime) -> NaiveDateTime {
    at_hour(date_time, date_time.hour())
}

/// Next instant worth evaluating when `date_time` is outside business hours.
fn next_business_candidate(date_time: NaiveDateTime) -> NaiveDateTime {
    let hour = date_time.hour();
    if hour >= CLOSING_HOUR {
        at_hour(date_time + Duration::days(1), OPENING_HOUR)
    } else if hour < OPENING_HOUR {
        at_hour(date_time, OPENING_HOUR)
    } else {
        top_of_hour(date_time) + Duration::hours(1)
    }
}

pub struct SlotFinder {
    roster: &'static [Veterinarian],
    horizon_days: u32,
}

impl Default for SlotFinder {
    fn default() -> Self {
        Self::new(&ROSTER, 30)
    }
}

impl SlotFinder {
    pub fn new(roster: &'static [Veterinarian], horizon_days: u32) -> Self {
        Self { roster, horizon_days }
    }

    /// First bookable (veterinarian, time) pair at least one hour ahead.
    ///
    /// Candidates start at the top of the hour after `now + 1h`, skip
    /// anything outside business hours, and advance in 30-minute steps
    /// while every veterinarian is already booked. Veterinarians are tried
    /// in roster order. Gives up once the candidate walks past the search
    /// horizon.
    pub fn find_next_available(
        &self,
        existing: &[Consultation],
        clock: &dyn Clock,
    ) -> Result<SlotAssignment, AppointmentError> {
        let mut candidate = top_of_hour(clock.now() + Duration::hours(LEAD_TIME_HOURS));
        let deadline = candidate + Duration::days(self.horizon_days as i64);

        debug!("Searching next slot from {} across {} booked consultations",
               candidate, existing.len());

        while candidate <= deadline {
            if !is_business_hours(candidate) {
                candidate = next_business_candidate(candidate);
                continue;
            }

            let formatted = format_slot(candidate);
            let free = self.roster.iter().find(|vet| {
                !existing.iter().any(|c| c.occupies(&formatted, vet.name))
            });

            if let Some(vet) = free {
                debug!("Slot {} assigned to {}", formatted, vet.name);
                return Ok(SlotAssignment {
                    veterinarian: *vet,
                    date_time: candidate,
                    formatted,
                });
            }

            candidate += Duration::minutes(SLOT_STEP_MINUTES);
        }

        warn!("No free slot within {} days", self.horizon_days);
        Err(AppointmentError::NoSlotAvailable { days: self.horizon_days })
    }
}
