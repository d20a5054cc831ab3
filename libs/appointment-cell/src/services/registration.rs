use tracing::{debug, info, instrument, warn};

use pharmacy_cell::models::Order;
use pharmacy_cell::services::{Cart, OrderService};

use crate::models::{
    AppointmentError, AttentionRecord, PetDetails, RegistrationOutcome, RegistrationRequest,
};
use crate::services::pricing::PricingService;
use crate::services::recorder::AttentionRecorder;
use crate::state::AppointmentState;

/// Customer name used when the counter sale has no owner attached.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

pub fn resolve_owner_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        WALK_IN_CUSTOMER.to_string()
    } else {
        name.to_string()
    }
}

/// A pet with a blank name means the visit is pharmacy-only.
fn attending_pet(pet: Option<PetDetails>) -> Option<PetDetails> {
    pet.filter(|p| !p.name.trim().is_empty())
}

pub struct RegistrationService<'a> {
    state: &'a AppointmentState,
}

impl<'a> RegistrationService<'a> {
    pub fn new(state: &'a AppointmentState) -> Self {
        Self { state }
    }

    /// Stores the pharmacy order (if any) and then books the consultation
    /// (if a pet came along). Either half may be absent, not both. A booking
    /// whose pet row fails to store is deleted again.
    #[instrument(skip(self, request, auth_token))]
    pub async fn register(
        &self,
        request: RegistrationRequest,
        auth_token: &str,
    ) -> Result<RegistrationOutcome, AppointmentError> {
        let owner_name = resolve_owner_name(&request.owner.name);
        let pet = attending_pet(request.pet);

        if pet.is_none() && request.cart.is_empty() {
            return Err(AppointmentError::ValidationError(
                "Registration needs a pet or at least one medication".to_string(),
            ));
        }

        let cart = Cart::from_lines(&request.cart)
            .map_err(|e| AppointmentError::Pharmacy(e.to_string()))?;

        let order = self.place_order(&owner_name, &cart, pet.is_none(), auth_token).await?;

        let consultation = match pet {
            Some(pet) => {
                let service_type = request.service_type.unwrap_or_default();
                let pricing = PricingService::new(self.state.config.base_rate_per_minute);
                let cost = pricing.calculate_base_cost(
                    service_type,
                    self.state.config.default_consultation_minutes,
                );

                let recorder = AttentionRecorder::new(self.state);
                let pet_name = pet.name.trim().to_string();
                let booked = recorder
                    .book_next_slot(&owner_name, &pet_name, service_type, cost, auth_token)
                    .await?;

                let record = AttentionRecord {
                    owner_name: owner_name.clone(),
                    pet_name,
                    species: pet.species.trim().to_string(),
                    age_years: pet.age_years,
                    weight_kg: pet.weight_kg,
                    service_type,
                    pet_count: 1,
                    veterinarian: booked.veterinarian.clone(),
                    date_time: booked.date_time.clone(),
                    cost: booked.cost,
                };
                if let Err(err) = recorder.record_attention(&record, auth_token).await {
                    if let Err(undo) = recorder.release_booking(&booked.id, auth_token).await {
                        warn!("Consultation {} left without a pet record: {}", booked.id, undo);
                    }
                    return Err(err);
                }

                Some(booked)
            }
            None => {
                debug!("Pharmacy-only visit for {}", owner_name);
                None
            }
        };

        let grand_total = consultation.as_ref().map_or(0.0, |c| c.cost)
            + order.as_ref().map_or(0.0, |o| o.total);

        info!("Registration for {} completed, total {:.0}", owner_name, grand_total);

        Ok(RegistrationOutcome {
            consultation,
            order,
            grand_total,
        })
    }

    async fn place_order(
        &self,
        owner_name: &str,
        cart: &Cart,
        pharmacy_only: bool,
        auth_token: &str,
    ) -> Result<Option<Order>, AppointmentError> {
        if cart.is_empty() {
            return Ok(None);
        }
        let service = OrderService::new(&self.state.config);
        let order = service
            .place_order(owner_name, cart, pharmacy_only, auth_token)
            .await
            .map_err(|e| AppointmentError::Pharmacy(e.to_string()))?;
        Ok(Some(order))
    }
}
