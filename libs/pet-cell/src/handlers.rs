use std::sync::Arc;
use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{Local, NaiveDate};
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreatePetRequest, PetListQuery, UpdatePetRequest};
use crate::services::listing::{available_species, filter_pets};
use crate::services::vaccination::{age_from_birth_date, schedule_for};
use crate::services::PetService;

#[derive(Debug, Deserialize)]
pub struct RemoveByOwnerQuery {
    pub name: String,
    pub owner_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AgeQuery {
    pub birth_date: NaiveDate,
}

#[axum::debug_handler]
pub async fn create_pet(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePetRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&config);

    let pet = service.create_pet(request, auth.token()).await?;
    info!("{} registered pet {}", user.display_name(), pet.id);

    Ok(Json(json!(pet)))
}

#[axum::debug_handler]
pub async fn list_pets(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<PetListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&config);

    let pets = service.list_pets(auth.token()).await?;
    let species = available_species(&pets);
    let filtered = filter_pets(pets, &query);

    Ok(Json(json!({
        "pets": filtered,
        "total": filtered.len(),
        "species": species
    })))
}

#[axum::debug_handler]
pub async fn get_pet(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(pet_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&config);
    let pet = service.get_pet(pet_id, auth.token()).await?;
    Ok(Json(json!(pet)))
}

#[axum::debug_handler]
pub async fn update_pet(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(pet_id): Path<i64>,
    Json(request): Json<UpdatePetRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&config);
    let pet = service.update_pet(pet_id, request, auth.token()).await?;
    Ok(Json(json!(pet)))
}

#[axum::debug_handler]
pub async fn delete_pet(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(pet_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&config);

    let pet = service.delete_pet(pet_id, auth.token()).await?;
    info!("{} removed pet {}", user.display_name(), pet_id);

    Ok(Json(json!({
        "success": true,
        "removed": pet
    })))
}

#[axum::debug_handler]
pub async fn delete_by_owner(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<RemoveByOwnerQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&config);

    let removed = service
        .delete_by_name_and_owner(&query.name, &query.owner_name, auth.token())
        .await?;

    Ok(Json(json!({
        "success": !removed.is_empty(),
        "removed": removed.len()
    })))
}

#[axum::debug_handler]
pub async fn get_vaccination_schedule(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(pet_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&config);
    let pet = service.get_pet(pet_id, auth.token()).await?;
    Ok(Json(json!(schedule_for(&pet)?)))
}

/// Whole-year age for a birth date, as of today.
#[axum::debug_handler]
pub async fn calculate_age(
    Query(query): Query<AgeQuery>,
) -> Result<Json<Value>, AppError> {
    let today = Local::now().date_naive();
    if query.birth_date > today {
        return Err(AppError::ValidationError("Birth date is in the future".to_string()));
    }
    Ok(Json(json!({
        "birth_date": query.birth_date,
        "age_years": age_from_birth_date(query.birth_date, today)
    })))
}
