use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roles that see clinic-wide figures instead of their own rows.
pub const STAFF_ROLES: [&str; 2] = ["admin", "vet"];

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name used to match the user against owner names on records.
    pub fn display_name(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("username"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn is_staff(&self) -> bool {
        self.role
            .as_deref()
            .map(|r| STAFF_ROLES.iter().any(|s| s.eq_ignore_ascii_case(r)))
            .unwrap_or(false)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(role: &str, metadata: Option<serde_json::Value>) -> User {
        User {
            id: "42".to_string(),
            email: Some("liliana@gmail.com".to_string()),
            role: Some(role.to_string()),
            metadata,
            created_at: None,
        }
    }

    #[test]
    fn test_display_name_prefers_username() {
        let u = user("staff", Some(json!({"username": "liliana"})));
        assert_eq!(u.display_name(), "liliana");

        let u = user("staff", None);
        assert_eq!(u.display_name(), "liliana@gmail.com");
    }

    #[test]
    fn test_staff_roles() {
        assert!(user("admin", None).is_staff());
        assert!(user("VET", None).is_staff());
        assert!(!user("staff", None).is_staff());
    }
}
