use std::sync::Arc;
use axum::{
    extract::{Query, State, Extension},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CheckoutRequest, OrderQuery};
use crate::services::catalog::catalog;
use crate::services::{Cart, OrderService};

#[axum::debug_handler]
pub async fn list_catalog() -> Result<Json<Value>, AppError> {
    let medications: Vec<Value> = catalog().iter()
        .map(|m| json!({
            "name": m.name,
            "dose_mg": m.dose_mg,
            "price": m.price,
            "promo_discount": m.promo_discount,
            "effective_price": m.effective_price(),
        }))
        .collect();

    Ok(Json(json!({
        "medications": medications,
        "total": medications.len()
    })))
}

/// Prices a cart without storing anything.
#[axum::debug_handler]
pub async fn preview_cart(
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Value>, AppError> {
    let cart = Cart::from_lines(&request.items)?;
    Ok(Json(json!({
        "items": cart.items_text(),
        "lines": cart.items(),
        "total": cart.total()
    })))
}

#[axum::debug_handler]
pub async fn checkout(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Value>, AppError> {
    let cart = Cart::from_lines(&request.items)?;
    let service = OrderService::new(&config);

    let order = service.place_order(&request.customer_name, &cart, true, auth.token()).await?;
    info!("{} checked out order {}", user.display_name(), order.id);

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn list_orders(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Value>, AppError> {
    let service = OrderService::new(&config);

    let orders = match query.customer_name.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(customer) => service.list_by_customer(customer, auth.token()).await?,
        None => service.list_orders(auth.token()).await?,
    };

    Ok(Json(json!({
        "orders": orders,
        "total": orders.len()
    })))
}
