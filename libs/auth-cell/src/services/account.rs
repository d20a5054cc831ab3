use std::sync::LazyLock;

use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::jwt::{issue_token, TokenSubject};

use crate::models::{Account, AuthError, AuthSession, RegisterRequest, DEFAULT_ROLE};
use crate::services::password::{hash_password, verify_password};

const TABLE_PATH: &str = "/rest/v1/users";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

pub struct AccountService {
    supabase: SupabaseClient,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            jwt_secret: config.supabase_jwt_secret.clone(),
            token_ttl_hours: config.token_ttl_hours,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AuthError> {
        let username = request.username.trim();
        let email = request.email.trim();

        if username.is_empty() || email.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        if self.find_by_login_pair(username, email).await?.is_some() {
            warn!("Registration rejected, {} / {} already taken", username, email);
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let account_data = json!({
            "username": username,
            "email": email,
            "password_hash": password_hash,
            "role": DEFAULT_ROLE,
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            TABLE_PATH,
            None,
            Some(account_data),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next()
            .ok_or_else(|| AuthError::DatabaseError("Failed to create account".to_string()))?;
        let account = parse_account(row)?;

        info!("Account {} registered", account.username);
        self.open_session(account)
    }

    /// `login` may be either the username or the email.
    pub async fn login(&self, login: &str, password: &str) -> Result<AuthSession, AuthError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let account = self.find_by_login_pair(login, login).await?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = verify_password(password, &account.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        if !matches {
            debug!("Wrong password for {}", account.username);
            return Err(AuthError::InvalidCredentials);
        }

        info!("Account {} logged in", account.username);
        self.open_session(account)
    }

    /// Reports whether an account exists for a well-formed email.
    pub async fn recovery_check(&self, email: &str) -> Result<bool, AuthError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let path = format!("{}?email=eq.{}&select=id", TABLE_PATH, urlencoding::encode(email));
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None, None)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn find_by_login_pair(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, AuthError> {
        let path = format!(
            "{}?or=(username.eq.{},email.eq.{})&limit=1",
            TABLE_PATH,
            urlencoding::encode(username),
            urlencoding::encode(email)
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None, None)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        rows.into_iter().next().map(parse_account).transpose()
    }

    fn open_session(&self, account: Account) -> Result<AuthSession, AuthError> {
        let user_id = account.id.to_string();
        let subject = TokenSubject {
            user_id: &user_id,
            username: &account.username,
            email: &account.email,
            role: &account.role,
        };
        let access_token = issue_token(&subject, &self.jwt_secret, self.token_ttl_hours)
            .map_err(AuthError::Token)?;

        Ok(AuthSession {
            access_token,
            token_type: "Bearer",
            expires_in: self.token_ttl_hours * 3600,
            user: account,
        })
    }
}

fn parse_account(row: Value) -> Result<Account, AuthError> {
    serde_json::from_value(row)
        .map_err(|e| AuthError::DatabaseError(format!("Failed to parse account: {}", e)))
}
