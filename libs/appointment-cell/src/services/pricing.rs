use tracing::{debug, info};

use crate::models::{AppointmentError, CostQuote, ServiceType};

/// Factor applied when one registration brings more than one pet (10% off).
pub const MULTI_PET_DISCOUNT_FACTOR: f64 = 0.9;

pub struct PricingService {
    base_rate_per_minute: f64,
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl PricingService {
    pub fn new(base_rate_per_minute: f64) -> Self {
        Self { base_rate_per_minute }
    }

    /// `minutes × base rate × service multiplier`.
    pub fn calculate_base_cost(&self, service_type: ServiceType, duration_minutes: u32) -> f64 {
        let cost = duration_minutes as f64 * self.base_rate_per_minute * service_type.multiplier();
        debug!("Base cost for {:?} ({} minutes): {:.2}", service_type, duration_minutes, cost);
        cost
    }

    /// Returns the possibly discounted cost and whether the discount applied.
    pub fn apply_discount(&self, cost: f64, pet_count: u32) -> (f64, bool) {
        if pet_count > 1 {
            (cost * MULTI_PET_DISCOUNT_FACTOR, true)
        } else {
            (cost, false)
        }
    }

    pub fn round_currency(&self, value: f64) -> f64 {
        value.round()
    }

    pub fn quote(
        &self,
        service_type: ServiceType,
        duration_minutes: u32,
        pet_count: u32,
    ) -> Result<CostQuote, AppointmentError> {
        if duration_minutes == 0 {
            return Err(AppointmentError::ValidationError(
                "Duration must be at least one minute".to_string(),
            ));
        }
        if pet_count == 0 {
            return Err(AppointmentError::ValidationError(
                "At least one pet is required".to_string(),
            ));
        }

        let base = self.calculate_base_cost(service_type, duration_minutes);
        let (discounted, discount_applied) = self.apply_discount(base, pet_count);
        let total = self.round_currency(discounted);

        info!("Quoted {} for {} ({} minutes, {} pets)", total, service_type, duration_minutes, pet_count);

        Ok(CostQuote {
            service_type,
            duration_minutes,
            base,
            discounted,
            discount_applied,
            total,
        })
    }
}
