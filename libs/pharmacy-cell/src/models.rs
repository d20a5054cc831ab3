use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Order timestamp format, day/month and wall-clock time.
pub const ORDER_DATE_FORMAT: &str = "%d/%m %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Medication {
    pub name: &'static str,
    pub dose_mg: u32,
    pub price: f64,
    /// Fraction taken off the list price, e.g. `0.2` for 20%.
    pub promo_discount: Option<f64>,
}

impl Medication {
    pub fn effective_price(&self) -> f64 {
        match self.promo_discount {
            Some(discount) => self.price * (1.0 - discount),
            None => self.price,
        }
    }

    pub fn has_promotion(&self) -> bool {
        self.promo_discount.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub medication: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    /// Human-readable line list, `"Name xN, Name xN"`.
    pub items: String,
    pub total: f64,
    pub date: String,
    pub is_direct_purchase: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub items: Vec<CartLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    pub customer_name: Option<String>,
}

#[derive(Error, Debug)]
pub enum PharmacyError {
    #[error("Unknown medication: {0}")]
    UnknownMedication(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<PharmacyError> for AppError {
    fn from(err: PharmacyError) -> Self {
        match err {
            PharmacyError::UnknownMedication(name) => {
                AppError::NotFound(format!("Unknown medication: {}", name))
            }
            PharmacyError::EmptyCart => AppError::BadRequest("Cart is empty".to_string()),
            PharmacyError::ValidationError(msg) => AppError::ValidationError(msg),
            PharmacyError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
