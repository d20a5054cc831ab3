use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::HeaderMap,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;
use shared_utils::jwt;

use crate::models::{LoginRequest, RecoveryRequest, RegisterRequest};
use crate::services::AccountService;

pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let session = AccountService::new(&config).register(request).await?;
    Ok(Json(json!(session)))
}

pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let session = AccountService::new(&config)
        .login(&request.login, &request.password)
        .await?;
    Ok(Json(json!(session)))
}

pub async fn recover_password(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RecoveryRequest>,
) -> Result<Json<Value>, AppError> {
    let exists = AccountService::new(&config).recovery_check(&request.email).await?;
    Ok(Json(json!({
        "email": request.email.trim(),
        "account_exists": exists
    })))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;
    let user = jwt::validate_token(&token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;
    let valid = jwt::validate_token(&token, &config.supabase_jwt_secret).is_ok();

    Ok(Json(json!({ "valid": valid })))
}

pub async fn get_profile(
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Getting profile for user: {}", user.id);

    Ok(Json(json!({
        "user_id": user.id,
        "username": user.display_name(),
        "email": user.email,
        "role": user.role,
        "is_staff": user.is_staff()
    })))
}
