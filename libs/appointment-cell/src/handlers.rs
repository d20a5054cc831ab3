// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{roster, ConsultationStatus, QuoteQuery, RegistrationRequest, ROSTER};
use crate::services::{ConsultationService, PricingService, RegistrationService, SlotFinder};
use crate::state::AppointmentState;

// ==============================================================================
// REQUEST BODIES
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ConsultationStatus,
}

#[derive(Debug, Deserialize)]
pub struct ForgetPetRequest {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct RenamePetRequest {
    pub original: String,
    pub replacement: String,
}

fn consultation_service(state: &AppointmentState) -> ConsultationService {
    ConsultationService::new(Arc::new(SupabaseClient::new(&state.config)))
}

// ==============================================================================
// REGISTRATION & SCHEDULING
// ==============================================================================

#[axum::debug_handler]
pub async fn register_attention(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<RegistrationRequest>,
) -> Result<Json<Value>, AppError> {
    info!("Registration submitted by {}", user.display_name());

    let outcome = RegistrationService::new(&state)
        .register(request, auth.token())
        .await?;

    Ok(Json(json!(outcome)))
}

/// Next bookable slot as of now. Nothing is reserved.
#[axum::debug_handler]
pub async fn preview_next_slot(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let existing = consultation_service(&state).list_all(auth.token()).await?;
    let finder = SlotFinder::new(&ROSTER, state.config.slot_search_horizon_days);
    let slot = finder.find_next_available(&existing, state.clock.as_ref())?;

    Ok(Json(json!(slot)))
}

#[axum::debug_handler]
pub async fn list_veterinarians() -> Result<Json<Value>, AppError> {
    Ok(Json(json!({
        "veterinarians": roster(),
        "total": roster().len()
    })))
}

#[axum::debug_handler]
pub async fn get_quote(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Value>, AppError> {
    let pricing = PricingService::new(state.config.base_rate_per_minute);
    let quote = pricing.quote(
        query.service_type,
        query.duration_minutes.unwrap_or(state.config.default_consultation_minutes),
        query.pet_count.unwrap_or(1),
    )?;

    Ok(Json(json!(quote)))
}

// ==============================================================================
// CONSULTATION LISTINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_consultations(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let consultations = consultation_service(&state).list_all(auth.token()).await?;
    let visible = ConsultationService::visible_count(&user, &consultations);

    Ok(Json(json!({
        "consultations": consultations,
        "total": consultations.len(),
        "visible_to_user": visible
    })))
}

#[axum::debug_handler]
pub async fn list_owner_consultations(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(owner_name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let consultations = consultation_service(&state)
        .list_by_owner(&owner_name, auth.token())
        .await?;

    Ok(Json(json!({
        "owner_name": owner_name,
        "consultations": consultations,
        "total": consultations.len()
    })))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(consultation_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let consultation = consultation_service(&state)
        .get(&consultation_id, auth.token())
        .await?;
    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn update_consultation_status(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(consultation_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let consultation = consultation_service(&state)
        .update_status(&consultation_id, request.status, auth.token())
        .await?;
    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn delete_consultation(
    State(state): State<Arc<AppointmentState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let removed = consultation_service(&state)
        .delete(&consultation_id, auth.token())
        .await?;
    info!("{} deleted consultation {}", user.display_name(), removed.id);

    Ok(Json(json!({
        "success": true,
        "removed": removed
    })))
}

// ==============================================================================
// COUNTERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_stats(
    State(state): State<Arc<AppointmentState>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.counters.snapshot())))
}

#[axum::debug_handler]
pub async fn forget_pet_summary(
    State(state): State<Arc<AppointmentState>>,
    Json(request): Json<ForgetPetRequest>,
) -> Result<Json<Value>, AppError> {
    if !state.counters.forget_pet(&request.summary) {
        return Err(AppError::NotFound(format!("No summary line '{}'", request.summary)));
    }
    Ok(Json(json!(state.counters.snapshot())))
}

#[axum::debug_handler]
pub async fn rename_pet_summary(
    State(state): State<Arc<AppointmentState>>,
    Json(request): Json<RenamePetRequest>,
) -> Result<Json<Value>, AppError> {
    if request.replacement.trim().is_empty() {
        return Err(AppError::ValidationError("Replacement summary is empty".to_string()));
    }
    if !state.counters.rename_pet(&request.original, request.replacement.trim()) {
        return Err(AppError::NotFound(format!("No summary line '{}'", request.original)));
    }
    Ok(Json(json!(state.counters.snapshot())))
}
