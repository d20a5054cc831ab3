use chrono::Local;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::{DbError, SupabaseClient};

use crate::models::{CreatePetRequest, Pet, PetError, UpdatePetRequest};

const TABLE_PATH: &str = "/rest/v1/pets";

pub struct PetService {
    supabase: SupabaseClient,
}

impl PetService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_pet(
        &self,
        request: CreatePetRequest,
        auth_token: &str,
    ) -> Result<Pet, PetError> {
        let name = request.name.trim();
        let species = request.species.trim();
        let owner_name = request.owner_name.trim();

        if name.is_empty() {
            return Err(PetError::ValidationError("Pet name is required".to_string()));
        }
        if species.is_empty() {
            return Err(PetError::ValidationError("Species is required".to_string()));
        }
        if owner_name.is_empty() {
            return Err(PetError::ValidationError("Owner name is required".to_string()));
        }
        if request.weight_kg < 0.0 {
            return Err(PetError::ValidationError("Weight cannot be negative".to_string()));
        }

        debug!("Registering pet {} for owner {}", name, owner_name);

        let last_vaccination = request.last_vaccination
            .unwrap_or_else(|| Local::now().date_naive());

        let pet_data = json!({
            "name": name,
            "species": species,
            "age_years": request.age_years,
            "weight_kg": request.weight_kg,
            "last_vaccination": last_vaccination.format("%Y-%m-%d").to_string(),
            "owner_name": owner_name,
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            TABLE_PATH,
            Some(auth_token),
            Some(pet_data),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(db_error)?;

        let row = result.into_iter().next()
            .ok_or_else(|| PetError::DatabaseError("Failed to register pet".to_string()))?;
        let pet = parse_pet(row)?;

        info!("Pet {} registered with id {}", pet.name, pet.id);
        Ok(pet)
    }

    pub async fn list_pets(&self, auth_token: &str) -> Result<Vec<Pet>, PetError> {
        let path = format!("{}?order=id.asc", TABLE_PATH);
        self.fetch(&path, auth_token).await
    }

    pub async fn get_pet(&self, pet_id: i64, auth_token: &str) -> Result<Pet, PetError> {
        debug!("Fetching pet {}", pet_id);
        let path = format!("{}?id=eq.{}", TABLE_PATH, pet_id);
        self.fetch(&path, auth_token)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PetError::NotFound(pet_id.to_string()))
    }

    pub async fn update_pet(
        &self,
        pet_id: i64,
        request: UpdatePetRequest,
        auth_token: &str,
    ) -> Result<Pet, PetError> {
        debug!("Updating pet {}", pet_id);

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name.filter(|n| !n.trim().is_empty()) {
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(species) = request.species.filter(|s| !s.trim().is_empty()) {
            update_data.insert("species".to_string(), json!(species.trim()));
        }
        if let Some(age_years) = request.age_years {
            update_data.insert("age_years".to_string(), json!(age_years));
        }
        if let Some(weight_kg) = request.weight_kg {
            if weight_kg < 0.0 {
                return Err(PetError::ValidationError("Weight cannot be negative".to_string()));
            }
            update_data.insert("weight_kg".to_string(), json!(weight_kg));
        }
        if let Some(last_vaccination) = request.last_vaccination {
            update_data.insert(
                "last_vaccination".to_string(),
                json!(last_vaccination.format("%Y-%m-%d").to_string()),
            );
        }

        if update_data.is_empty() {
            return self.get_pet(pet_id, auth_token).await;
        }

        let path = format!("{}?id=eq.{}", TABLE_PATH, pet_id);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(update_data)),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(db_error)?;

        let row = result.into_iter().next()
            .ok_or_else(|| PetError::NotFound(pet_id.to_string()))?;
        parse_pet(row)
    }

    pub async fn delete_pet(&self, pet_id: i64, auth_token: &str) -> Result<Pet, PetError> {
        let path = format!("{}?id=eq.{}", TABLE_PATH, pet_id);
        self.delete_where(&path, auth_token)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PetError::NotFound(pet_id.to_string()))
    }

    /// Removes every pet with this exact name under this owner and returns
    /// what was removed. Missing matches are not an error.
    pub async fn delete_by_name_and_owner(
        &self,
        name: &str,
        owner_name: &str,
        auth_token: &str,
    ) -> Result<Vec<Pet>, PetError> {
        let path = format!(
            "{}?name=eq.{}&owner_name=eq.{}",
            TABLE_PATH,
            urlencoding::encode(name),
            urlencoding::encode(owner_name)
        );
        let removed = self.delete_where(&path, auth_token).await?;
        debug!("Removed {} pets named {} for {}", removed.len(), name, owner_name);
        Ok(removed)
    }

    pub async fn count(&self, auth_token: &str) -> Result<u64, PetError> {
        let path = format!("{}?select=id", TABLE_PATH);
        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(db_error)?;
        Ok(rows.len() as u64)
    }

    async fn delete_where(&self, path: &str, auth_token: &str) -> Result<Vec<Pet>, PetError> {
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            path,
            Some(auth_token),
            None,
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(db_error)?;

        result.into_iter().map(parse_pet).collect()
    }

    async fn fetch(&self, path: &str, auth_token: &str) -> Result<Vec<Pet>, PetError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await.map_err(db_error)?;

        result.into_iter().map(parse_pet).collect()
    }
}

fn parse_pet(row: Value) -> Result<Pet, PetError> {
    serde_json::from_value(row)
        .map_err(|e| PetError::DatabaseError(format!("Failed to parse pet: {}", e)))
}

fn db_error(e: DbError) -> PetError {
    match e {
        DbError::NotFound(msg) => PetError::NotFound(msg),
        other => PetError::DatabaseError(other.to_string()),
    }
}
