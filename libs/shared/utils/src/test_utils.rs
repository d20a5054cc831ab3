use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing the store at a mock server.
    pub fn with_backend(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("tester", "staff")
    }
}

impl TestUser {
    pub fn new(username: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            role: role.to_string(),
        }
    }

    pub fn vet(username: &str) -> Self {
        Self::new(username, "vet")
    }

    pub fn staff(username: &str) -> Self {
        Self::new(username, "staff")
    }

    pub fn admin(username: &str) -> Self {
        Self::new(username, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: Some(json!({ "username": self.username })),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "user_metadata": { "username": user.username },
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// PostgREST rows as the clinic tables return them.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn consultation_row(id: &str, date_time: &str, veterinarian: &str) -> serde_json::Value {
        json!({
            "id": id,
            "pet_name": "Bobby",
            "owner_name": "Juan Perez",
            "description": "Attention for Wellness Checkup",
            "date_time": date_time,
            "veterinarian": veterinarian,
            "cost": 30000.0,
            "status": "pending"
        })
    }

    pub fn pet_row(id: i64, name: &str, species: &str, owner_name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "species": species,
            "age_years": 5,
            "weight_kg": 10.0,
            "last_vaccination": "2025-03-10",
            "owner_name": owner_name
        })
    }

    pub fn order_row(id: i64, customer_name: &str, total: f64) -> serde_json::Value {
        json!({
            "id": id,
            "customer_name": customer_name,
            "items": "Generic Antibiotic x1",
            "total": total,
            "date": "20/10 10:15",
            "is_direct_purchase": true
        })
    }

    pub fn account_row(id: i64, username: &str, email: &str, password_hash: &str) -> serde_json::Value {
        json!({
            "id": id,
            "username": username,
            "email": email,
            "password_hash": password_hash,
            "role": "staff"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
