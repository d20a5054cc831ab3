use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::{appointment_routes, AppointmentState};
use auth_cell::router::auth_routes;
use pet_cell::router::pet_routes;
use pharmacy_cell::router::pharmacy_routes;
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>, appointments: Arc<AppointmentState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Veterinary Clinic API is running!" }))
        .nest("/auth", auth_routes(config.clone()))
        .nest("/pets", pet_routes(config.clone()))
        .nest("/pharmacy", pharmacy_routes(config))
        .nest("/appointments", appointment_routes(appointments))
}
