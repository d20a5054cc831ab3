use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_database::{DbError, SupabaseClient};
use shared_models::auth::User;

use crate::models::{AppointmentError, Consultation, ConsultationStatus};

const TABLE_PATH: &str = "/rest/v1/consultations";

pub struct ConsultationService {
    supabase: Arc<SupabaseClient>,
}

impl ConsultationService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn list_all(&self, auth_token: &str) -> Result<Vec<Consultation>, AppointmentError> {
        let path = format!("{}?order=id.asc", TABLE_PATH);
        self.fetch(&path, auth_token).await
    }

    pub async fn list_by_owner(
        &self,
        owner_name: &str,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, AppointmentError> {
        debug!("Fetching consultations for owner {}", owner_name);
        let path = format!(
            "{}?owner_name=ilike.{}&order=id.asc",
            TABLE_PATH,
            urlencoding::encode(owner_name)
        );
        self.fetch(&path, auth_token).await
    }

    pub async fn get(&self, id: &str, auth_token: &str) -> Result<Consultation, AppointmentError> {
        let path = format!("{}?id=eq.{}", TABLE_PATH, urlencoding::encode(id));
        self.fetch(&path, auth_token)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::NotFound(id.to_string()))
    }

    /// Appends a row. A unique violation on (date_time, veterinarian)
    /// comes back as `SlotTaken`.
    pub async fn insert(
        &self,
        consultation: &Consultation,
        auth_token: &str,
    ) -> Result<Consultation, AppointmentError> {
        let body = serde_json::to_value(consultation)
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let result: Result<Vec<Value>, DbError> = self.supabase.request_with_headers(
            Method::POST,
            TABLE_PATH,
            Some(auth_token),
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await;

        let rows = match result {
            Ok(rows) => rows,
            Err(DbError::Conflict(msg)) => {
                warn!("Slot {} / {} already stored: {}",
                      consultation.date_time, consultation.veterinarian, msg);
                return Err(AppointmentError::SlotTaken {
                    date_time: consultation.date_time.clone(),
                    veterinarian: consultation.veterinarian.clone(),
                });
            }
            Err(e) => return Err(AppointmentError::DatabaseError(e.to_string())),
        };

        match rows.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse consultation: {}", e))),
            None => Ok(consultation.clone()),
        }
    }

    pub async fn delete(&self, id: &str, auth_token: &str) -> Result<Consultation, AppointmentError> {
        let path = format!("{}?id=eq.{}", TABLE_PATH, urlencoding::encode(id));

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next()
            .ok_or_else(|| AppointmentError::NotFound(id.to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse consultation: {}", e)))
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: ConsultationStatus,
        auth_token: &str,
    ) -> Result<Consultation, AppointmentError> {
        debug!("Setting consultation {} to {}", id, status);
        let path = format!("{}?id=eq.{}", TABLE_PATH, urlencoding::encode(id));

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "status": status })),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next()
            .ok_or_else(|| AppointmentError::NotFound(id.to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse consultation: {}", e)))
    }

    /// Staff see every consultation; everyone else only rows under their name.
    pub fn visible_count(user: &User, consultations: &[Consultation]) -> usize {
        if user.is_staff() {
            return consultations.len();
        }
        let name = user.display_name();
        consultations.iter()
            .filter(|c| c.owner_name.eq_ignore_ascii_case(&name))
            .count()
    }

    async fn fetch(&self, path: &str, auth_token: &str) -> Result<Vec<Consultation>, AppointmentError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Consultation>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse consultations: {}", e)))
    }
}
