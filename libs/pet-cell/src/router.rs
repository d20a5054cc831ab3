use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn pet_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_pet).get(list_pets))
        .route("/by-owner", axum::routing::delete(delete_by_owner))
        .route("/age", get(calculate_age))
        .route("/{id}", get(get_pet).put(update_pet).delete(delete_pet))
        .route("/{id}/vaccination", get(get_vaccination_schedule))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
