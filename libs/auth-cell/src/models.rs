use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

pub const DEFAULT_ROLE: &str = "staff";

/// Row of the `users` table. The hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(alias = "username", alias = "email")]
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: Account,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Username or email already registered")]
    AlreadyExists,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingFields | AuthError::InvalidEmail => {
                AppError::ValidationError(err.to_string())
            }
            AuthError::AlreadyExists => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::Hashing(msg) | AuthError::Token(msg) => AppError::Internal(msg),
            AuthError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
