use crate::models::{Medication, PharmacyError};

pub static CATALOG: [Medication; 4] = [
    Medication { name: "Generic Antibiotic", dose_mg: 500, price: 15000.0, promo_discount: None },
    Medication { name: "Basic Analgesic", dose_mg: 200, price: 8000.0, promo_discount: None },
    Medication { name: "Premium Anti-inflammatory", dose_mg: 200, price: 25000.0, promo_discount: Some(0.2) },
    Medication { name: "Canine Vitamins", dose_mg: 100, price: 12000.0, promo_discount: Some(0.1) },
];

pub fn catalog() -> &'static [Medication] {
    &CATALOG
}

/// Case-insensitive lookup by medication name.
pub fn find_medication(name: &str) -> Result<&'static Medication, PharmacyError> {
    let needle = name.trim();
    CATALOG.iter()
        .find(|m| m.name.eq_ignore_ascii_case(needle))
        .ok_or_else(|| PharmacyError::UnknownMedication(needle.to_string()))
}
