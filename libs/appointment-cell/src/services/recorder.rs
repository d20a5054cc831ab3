use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use pet_cell::models::{CreatePetRequest, Pet, PetError};
use pet_cell::services::PetService;
use shared_database::SupabaseClient;

use crate::models::{
    AppointmentError, AttentionRecord, Consultation, ConsultationStatus, ServiceType, ROSTER,
};
use crate::services::consultation::ConsultationService;
use crate::services::scheduler::SlotFinder;
use crate::state::AppointmentState;

pub fn generate_consultation_id() -> String {
    format!("AGENDA-{}", rand::thread_rng().gen_range(1000..=9999))
}

const DESCRIPTION_PREFIX: &str = "Attention for ";

pub fn describe_service(service_type: ServiceType) -> String {
    format!("{}{}", DESCRIPTION_PREFIX, service_type.label())
}

/// Reads the service back out of a stored consultation description.
pub fn service_from_description(description: &str) -> Option<ServiceType> {
    description.strip_prefix(DESCRIPTION_PREFIX).and_then(ServiceType::from_label)
}

/// Slot booking plus the bookkeeping that follows it.
pub struct AttentionRecorder<'a> {
    state: &'a AppointmentState,
    consultations: ConsultationService,
    pets: PetService,
    finder: SlotFinder,
}

impl<'a> AttentionRecorder<'a> {
    pub fn new(state: &'a AppointmentState) -> Self {
        let supabase = Arc::new(SupabaseClient::new(&state.config));
        Self {
            state,
            consultations: ConsultationService::new(supabase),
            pets: PetService::new(&state.config),
            finder: SlotFinder::new(&ROSTER, state.config.slot_search_horizon_days),
        }
    }

    /// Finds the next free slot and stores a pending consultation in it.
    ///
    /// Runs under the allocation lock so two bookings in this process never
    /// race on the same slot. A storage conflict (another process, or an id
    /// collision) re-reads the calendar and tries again, up to the
    /// configured retry count.
    #[instrument(skip(self, auth_token))]
    pub async fn book_next_slot(
        &self,
        owner_name: &str,
        pet_name: &str,
        service_type: ServiceType,
        cost: f64,
        auth_token: &str,
    ) -> Result<Consultation, AppointmentError> {
        let _guard = self.state.allocation.lock().await;
        let max_retries = self.state.config.booking_max_retries;
        let mut attempt = 0;

        loop {
            let existing = self.consultations.list_all(auth_token).await?;
            let slot = self.finder.find_next_available(&existing, self.state.clock.as_ref())?;

            let consultation = Consultation {
                id: generate_consultation_id(),
                pet_name: pet_name.to_string(),
                owner_name: owner_name.to_string(),
                description: describe_service(service_type),
                date_time: slot.formatted,
                veterinarian: slot.veterinarian.name.to_string(),
                cost,
                status: ConsultationStatus::Pending,
            };

            match self.consultations.insert(&consultation, auth_token).await {
                Ok(stored) => {
                    info!("Booked {} with {} at {}", stored.id, stored.veterinarian, stored.date_time);
                    return Ok(stored);
                }
                Err(err @ AppointmentError::SlotTaken { .. }) => {
                    if attempt >= max_retries {
                        warn!("Giving up after {} retries: {}", attempt, err);
                        return Err(err);
                    }
                    attempt += 1;
                    debug!("Retrying booking (attempt {}/{})", attempt, max_retries);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Stores the pet row for a booked attention and bumps the counters.
    #[instrument(skip(self, record, auth_token), fields(owner = %record.owner_name))]
    pub async fn record_attention(
        &self,
        record: &AttentionRecord,
        auth_token: &str,
    ) -> Result<Pet, AppointmentError> {
        let request = CreatePetRequest {
            name: record.pet_name.clone(),
            species: record.species.clone(),
            age_years: record.age_years,
            weight_kg: record.weight_kg,
            last_vaccination: None,
            owner_name: record.owner_name.clone(),
        };

        let pet = self.pets.create_pet(request, auth_token).await.map_err(|e| match e {
            PetError::ValidationError(msg) => AppointmentError::ValidationError(msg),
            other => AppointmentError::PetRegistry(other.to_string()),
        })?;

        self.state.counters.record(record);
        Ok(pet)
    }

    /// Removes a consultation stored by `book_next_slot` whose attention
    /// could not be recorded.
    pub async fn release_booking(&self, consultation_id: &str, auth_token: &str) -> Result<(), AppointmentError> {
        let released = self.consultations.delete(consultation_id, auth_token).await?;
        info!("Released slot {} with {}", released.date_time, released.veterinarian);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consultation_id_shape() {
        for _ in 0..50 {
            let id = generate_consultation_id();
            let n: u32 = id.strip_prefix("AGENDA-").unwrap().parse().unwrap();
            assert!((1000..=9999).contains(&n));
        }
    }

    #[test]
    fn test_description_uses_label() {
        assert_eq!(describe_service(ServiceType::Checkup), "Attention for Wellness Checkup");
        assert_eq!(describe_service(ServiceType::Surgery), "Attention for Surgery");
    }

    #[test]
    fn test_service_read_back_from_description() {
        assert_eq!(service_from_description("Attention for Wellness Checkup"), Some(ServiceType::Checkup));
        assert_eq!(service_from_description("Attention for Emergency"), Some(ServiceType::Emergency));
        assert_eq!(service_from_description("Attention for Grooming"), None);
        assert_eq!(service_from_description("Surgery"), None);
    }
}
