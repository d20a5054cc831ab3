use chrono::{Months, NaiveDate};

use crate::models::{Pet, PetError, VaccinationSchedule};

/// Pets under a year are vaccinated monthly, adults yearly.
pub fn next_vaccination(pet: &Pet) -> Result<NaiveDate, PetError> {
    let step = if pet.age_years < 1 { Months::new(1) } else { Months::new(12) };
    pet.last_vaccination
        .checked_add_months(step)
        .ok_or_else(|| PetError::ValidationError(format!(
            "Vaccination date out of range for {}", pet.name
        )))
}

pub fn frequency_description(pet: &Pet) -> &'static str {
    if pet.age_years < 1 { "Monthly (Puppy)" } else { "Yearly (Adult)" }
}

/// Whole years elapsed between `birth_date` and `today`.
pub fn age_from_birth_date(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(birth_date).unwrap_or(0)
}

pub fn schedule_for(pet: &Pet) -> Result<VaccinationSchedule, PetError> {
    Ok(VaccinationSchedule {
        pet_id: pet.id,
        pet_name: pet.name.clone(),
        last_vaccination: pet.last_vaccination,
        next_vaccination: next_vaccination(pet)?,
        frequency: frequency_description(pet),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet(age_years: u32, last: NaiveDate) -> Pet {
        Pet {
            id: 9,
            name: "Coco".to_string(),
            species: "Dog".to_string(),
            age_years,
            weight_kg: 3.2,
            last_vaccination: last,
            owner_name: "Wilda".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_puppy_is_monthly() {
        let p = pet(0, date(2025, 1, 31));
        assert_eq!(next_vaccination(&p).unwrap(), date(2025, 2, 28));
        assert_eq!(frequency_description(&p), "Monthly (Puppy)");
    }

    #[test]
    fn test_adult_is_yearly() {
        let p = pet(4, date(2024, 2, 29));
        assert_eq!(next_vaccination(&p).unwrap(), date(2025, 2, 28));
        assert_eq!(frequency_description(&p), "Yearly (Adult)");
    }

    #[test]
    fn test_age_in_whole_years() {
        assert_eq!(age_from_birth_date(date(2020, 6, 15), date(2025, 6, 14)), 4);
        assert_eq!(age_from_birth_date(date(2020, 6, 15), date(2025, 6, 15)), 5);
        assert_eq!(age_from_birth_date(date(2026, 1, 1), date(2025, 1, 1)), 0);
    }

    #[test]
    fn test_schedule_for() {
        let schedule = schedule_for(&pet(2, date(2025, 3, 10))).unwrap();
        assert_eq!(schedule.next_vaccination, date(2026, 3, 10));
        assert_eq!(schedule.pet_name, "Coco");
    }
}
