use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub server_port: u16,
    /// Price of one consultation minute before the service multiplier.
    pub base_rate_per_minute: f64,
    pub default_consultation_minutes: u32,
    /// How far past the first candidate the slot search may walk.
    pub slot_search_horizon_days: u32,
    pub booking_max_retries: u32,
    pub token_ttl_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            server_port: 3000,
            base_rate_per_minute: 1000.0,
            default_consultation_minutes: 30,
            slot_search_horizon_days: 30,
            booking_max_retries: 3,
            token_ttl_hours: 24,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            server_port: parse_or_default("SERVER_PORT", defaults.server_port),
            base_rate_per_minute: parse_or_default("BASE_RATE_PER_MINUTE", defaults.base_rate_per_minute),
            default_consultation_minutes: parse_or_default(
                "DEFAULT_CONSULTATION_MINUTES",
                defaults.default_consultation_minutes,
            ),
            slot_search_horizon_days: parse_or_default(
                "SLOT_SEARCH_HORIZON_DAYS",
                defaults.slot_search_horizon_days,
            ),
            booking_max_retries: parse_or_default("BOOKING_MAX_RETRIES", defaults.booking_max_retries),
            token_ttl_hours: parse_or_default("TOKEN_TTL_HOURS", defaults.token_ttl_hours),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
