use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn pharmacy_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/medications", get(list_catalog))
        .route("/cart/preview", post(preview_cart))
        .route("/orders", post(checkout).get(list_orders))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
