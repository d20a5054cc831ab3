// libs/appointment-cell/src/models.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use pharmacy_cell::models::{CartLine, Order};
use shared_models::error::AppError;

// ==============================================================================
// ROSTER
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Veterinarian {
    pub name: &'static str,
    pub specialty: &'static str,
}

/// Fixed, ordered roster. Slot assignment prefers earlier entries.
pub static ROSTER: [Veterinarian; 3] = [
    Veterinarian { name: "Dr. Pérez", specialty: "General" },
    Veterinarian { name: "Dra. González", specialty: "Surgery" },
    Veterinarian { name: "Dr. Soto", specialty: "Dermatology" },
];

pub fn roster() -> &'static [Veterinarian] {
    &ROSTER
}

pub fn find_veterinarian(name: &str) -> Option<&'static Veterinarian> {
    ROSTER.iter().find(|vet| vet.name == name)
}

// ==============================================================================
// CONSULTATION RECORDS
// ==============================================================================

/// A booked consultation row. `date_time` holds the canonical
/// `dd/MM/yyyy HH:mm` string and is the conflict key together with
/// `veterinarian`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consultation {
    pub id: String,
    pub pet_name: String,
    pub owner_name: String,
    pub description: String,
    pub date_time: String,
    pub veterinarian: String,
    pub cost: f64,
    pub status: ConsultationStatus,
}

impl Consultation {
    pub fn occupies(&self, date_time: &str, veterinarian: &str) -> bool {
        self.date_time == date_time && self.veterinarian == veterinarian
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsultationStatus::Pending => write!(f, "pending"),
            ConsultationStatus::Confirmed => write!(f, "confirmed"),
            ConsultationStatus::Completed => write!(f, "completed"),
            ConsultationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[default]
    #[serde(alias = "control", alias = "wellness")]
    Checkup,
    #[serde(alias = "vaccine")]
    Vaccination,
    #[serde(alias = "urgent", alias = "urgencia")]
    Emergency,
    #[serde(alias = "cirugia")]
    Surgery,
}

impl ServiceType {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Checkup => "Wellness Checkup",
            ServiceType::Vaccination => "Vaccination",
            ServiceType::Emergency => "Emergency",
            ServiceType::Surgery => "Surgery",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [ServiceType::Checkup, ServiceType::Vaccination, ServiceType::Emergency, ServiceType::Surgery]
            .into_iter()
            .find(|service| service.label() == label)
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ServiceType::Emergency => 2.5,
            ServiceType::Surgery => 3.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ==============================================================================
// SCHEDULING
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotAssignment {
    pub veterinarian: Veterinarian,
    pub date_time: NaiveDateTime,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostQuote {
    pub service_type: ServiceType,
    pub duration_minutes: u32,
    pub base: f64,
    pub discounted: f64,
    pub discount_applied: bool,
    pub total: f64,
}

/// Finalized tuple handed to the recorder once a slot is secured.
#[derive(Debug, Clone)]
pub struct AttentionRecord {
    pub owner_name: String,
    pub pet_name: String,
    pub species: String,
    pub age_years: u32,
    pub weight_kg: f64,
    pub service_type: ServiceType,
    pub pet_count: u32,
    pub veterinarian: String,
    pub date_time: String,
    pub cost: f64,
}

impl AttentionRecord {
    pub fn summary_line(&self) -> String {
        format!("Pet: {} ({}) - Owner: {}", self.pet_name, self.species, self.owner_name)
    }
}

/// Observable running totals for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSnapshot {
    pub total_pets: u64,
    pub total_consultations: u64,
    pub last_owner: String,
    pub last_service_type: Option<String>,
    pub pet_summaries: Vec<String>,
}

impl Default for CounterSnapshot {
    fn default() -> Self {
        Self {
            total_pets: 0,
            total_consultations: 0,
            last_owner: "N/A".to_string(),
            last_service_type: None,
            pet_summaries: Vec::new(),
        }
    }
}

// ==============================================================================
// REGISTRATION FLOW
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerDetails {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetDetails {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub age_years: u32,
    #[serde(default)]
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub owner: OwnerDetails,
    pub pet: Option<PetDetails>,
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub cart: Vec<CartLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub consultation: Option<Consultation>,
    pub order: Option<Order>,
    pub grand_total: f64,
}

// ==============================================================================
// QUERY MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteQuery {
    pub service_type: ServiceType,
    pub duration_minutes: Option<u32>,
    pub pet_count: Option<u32>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Consultation not found: {0}")]
    NotFound(String),

    #[error("No slot available within {days} days")]
    NoSlotAvailable { days: u32 },

    #[error("Slot {date_time} with {veterinarian} was taken by another booking")]
    SlotTaken { date_time: String, veterinarian: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Pet registry error: {0}")]
    PetRegistry(String),

    #[error("Pharmacy error: {0}")]
    Pharmacy(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(id) => AppError::NotFound(format!("Consultation not found: {}", id)),
            AppointmentError::NoSlotAvailable { .. } | AppointmentError::SlotTaken { .. } => {
                AppError::Conflict(err.to_string())
            }
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
            AppointmentError::PetRegistry(msg) | AppointmentError::Pharmacy(msg) => {
                AppError::ExternalService(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_order_is_fixed() {
        let names: Vec<&str> = roster().iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Dr. Pérez", "Dra. González", "Dr. Soto"]);
        assert_eq!(find_veterinarian("Dr. Soto").map(|v| v.specialty), Some("Dermatology"));
        assert!(find_veterinarian("Dr. House").is_none());
    }

    #[test]
    fn test_service_type_aliases() {
        let parsed: ServiceType = serde_json::from_str("\"urgencia\"").unwrap();
        assert_eq!(parsed, ServiceType::Emergency);
        assert_eq!(ServiceType::default().label(), "Wellness Checkup");
    }

    #[test]
    fn test_exhausted_calendar_maps_to_conflict() {
        let err: AppError = AppointmentError::NoSlotAvailable { days: 30 }.into();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);

        let err: AppError = AppointmentError::ValidationError("bad".to_string()).into();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_consultation_status_defaults_to_pending() {
        assert_eq!(ConsultationStatus::default().to_string(), "pending");
    }
}
