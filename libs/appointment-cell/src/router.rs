// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AppointmentState;

pub fn appointment_routes(state: Arc<AppointmentState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_consultations))
        .route("/registrations", post(handlers::register_attention))
        .route("/next-slot", get(handlers::preview_next_slot))
        .route("/veterinarians", get(handlers::list_veterinarians))
        .route("/pricing/quote", get(handlers::get_quote))
        .route("/stats", get(handlers::get_stats))
        .route(
            "/stats/pets",
            axum::routing::delete(handlers::forget_pet_summary).put(handlers::rename_pet_summary),
        )
        .route("/owners/{owner_name}", get(handlers::list_owner_consultations))
        .route(
            "/{consultation_id}",
            get(handlers::get_consultation).delete(handlers::delete_consultation),
        )
        .route("/{consultation_id}/status", patch(handlers::update_consultation_status))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
