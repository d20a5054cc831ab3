use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Species filter value meaning "no filter".
pub const ALL_SPECIES: &str = "All";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub age_years: u32,
    pub weight_kg: f64,
    pub last_vaccination: NaiveDate,
    pub owner_name: String,
}

impl Pet {
    pub fn summary_line(&self) -> String {
        format!("Pet: {} ({}) - Owner: {}", self.name, self.species, self.owner_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePetRequest {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub age_years: u32,
    #[serde(default)]
    pub weight_kg: f64,
    pub last_vaccination: Option<NaiveDate>,
    pub owner_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub age_years: Option<u32>,
    pub weight_kg: Option<f64>,
    pub last_vaccination: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    None,
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetListQuery {
    /// Matches pet or owner name, case-insensitive.
    pub q: Option<String>,
    pub species: Option<String>,
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VaccinationSchedule {
    pub pet_id: i64,
    pub pet_name: String,
    pub last_vaccination: NaiveDate,
    pub next_vaccination: NaiveDate,
    pub frequency: &'static str,
}

#[derive(Error, Debug)]
pub enum PetError {
    #[error("Pet not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<PetError> for AppError {
    fn from(err: PetError) -> Self {
        match err {
            PetError::NotFound(id) => AppError::NotFound(format!("Pet not found: {}", id)),
            PetError::ValidationError(msg) => AppError::ValidationError(msg),
            PetError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
