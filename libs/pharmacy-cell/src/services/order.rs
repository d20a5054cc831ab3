use chrono::{Local, NaiveDateTime};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Order, PharmacyError, ORDER_DATE_FORMAT};
use crate::services::cart::Cart;

const TABLE_PATH: &str = "/rest/v1/orders";

pub fn format_order_date(at: NaiveDateTime) -> String {
    at.format(ORDER_DATE_FORMAT).to_string()
}

pub struct OrderService {
    supabase: SupabaseClient,
}

impl OrderService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Persists the cart as one order row stamped with the current local time.
    pub async fn place_order(
        &self,
        customer_name: &str,
        cart: &Cart,
        is_direct_purchase: bool,
        auth_token: &str,
    ) -> Result<Order, PharmacyError> {
        self.place_order_at(customer_name, cart, is_direct_purchase, Local::now().naive_local(), auth_token)
            .await
    }

    pub async fn place_order_at(
        &self,
        customer_name: &str,
        cart: &Cart,
        is_direct_purchase: bool,
        at: NaiveDateTime,
        auth_token: &str,
    ) -> Result<Order, PharmacyError> {
        if cart.is_empty() {
            return Err(PharmacyError::EmptyCart);
        }
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(PharmacyError::ValidationError("Customer name is required".to_string()));
        }

        let order_data = json!({
            "customer_name": customer_name,
            "items": cart.items_text(),
            "total": cart.total(),
            "date": format_order_date(at),
            "is_direct_purchase": is_direct_purchase,
        });

        debug!("Placing order for {}: {}", customer_name, cart.items_text());

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            TABLE_PATH,
            Some(auth_token),
            Some(order_data),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| PharmacyError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next()
            .ok_or_else(|| PharmacyError::DatabaseError("Failed to store order".to_string()))?;
        let order = parse_order(row)?;

        info!("Order {} stored for {} ({:.0})", order.id, order.customer_name, order.total);
        Ok(order)
    }

    pub async fn list_orders(&self, auth_token: &str) -> Result<Vec<Order>, PharmacyError> {
        let path = format!("{}?order=id.asc", TABLE_PATH);
        self.fetch(&path, auth_token).await
    }

    pub async fn list_by_customer(
        &self,
        customer_name: &str,
        auth_token: &str,
    ) -> Result<Vec<Order>, PharmacyError> {
        let path = format!(
            "{}?customer_name=ilike.{}&order=id.asc",
            TABLE_PATH,
            urlencoding::encode(customer_name.trim())
        );
        self.fetch(&path, auth_token).await
    }

    async fn fetch(&self, path: &str, auth_token: &str) -> Result<Vec<Order>, PharmacyError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await.map_err(|e| PharmacyError::DatabaseError(e.to_string()))?;

        result.into_iter().map(parse_order).collect()
    }
}

fn parse_order(row: Value) -> Result<Order, PharmacyError> {
    serde_json::from_value(row)
        .map_err(|e| PharmacyError::DatabaseError(format!("Failed to parse order: {}", e)))
}
