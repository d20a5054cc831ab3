use serde::Serialize;

use crate::models::{CartLine, Medication, PharmacyError};
use crate::services::catalog::find_medication;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub medication: Medication,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.medication.effective_price() * self.quantity as f64
    }
}

pub const MAX_LINE_QUANTITY: u32 = 100;

/// Lines keep insertion order; one line per medication.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from request lines, merging repeated medications.
    pub fn from_lines(lines: &[CartLine]) -> Result<Self, PharmacyError> {
        let mut cart = Self::new();
        for line in lines {
            let medication = find_medication(&line.medication)?;
            cart.add_quantity(medication, line.quantity)?;
        }
        Ok(cart)
    }

    pub fn add(&mut self, medication: &Medication) {
        match self.items.iter_mut().find(|i| i.medication.name == medication.name) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem { medication: *medication, quantity: 1 }),
        }
    }

    /// Adds `quantity` units in one step. A line may hold at most
    /// `MAX_LINE_QUANTITY` units.
    pub fn add_quantity(&mut self, medication: &Medication, quantity: u32) -> Result<(), PharmacyError> {
        if quantity == 0 {
            return Err(PharmacyError::ValidationError(format!(
                "Quantity for {} must be positive", medication.name
            )));
        }

        let current = self.items.iter()
            .find(|i| i.medication.name == medication.name)
            .map_or(0, |i| i.quantity);
        let total = current.checked_add(quantity)
            .filter(|total| *total <= MAX_LINE_QUANTITY)
            .ok_or_else(|| PharmacyError::ValidationError(format!(
                "At most {} units of {} per order", MAX_LINE_QUANTITY, medication.name
            )))?;

        match self.items.iter_mut().find(|i| i.medication.name == medication.name) {
            Some(item) => item.quantity = total,
            None => self.items.push(CartItem { medication: *medication, quantity: total }),
        }
        Ok(())
    }

    /// Takes one unit off; the line disappears at zero. Returns false when
    /// the medication was not in the cart.
    pub fn remove(&mut self, medication_name: &str) -> bool {
        let Some(pos) = self.items.iter().position(|i| i.medication.name == medication_name) else {
            return false;
        };
        self.items[pos].quantity -= 1;
        if self.items[pos].quantity == 0 {
            self.items.remove(pos);
        }
        true
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items_text(&self) -> String {
        self.items.iter()
            .map(|i| format!("{} x{}", i.medication.name, i.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::CATALOG;
    use assert_matches::assert_matches;

    #[test]
    fn test_add_increments_existing_line() {
        let mut cart = Cart::new();
        cart.add(&CATALOG[0]);
        cart.add(&CATALOG[2]);
        cart.add(&CATALOG[0]);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total(), 50000.0);
        assert_eq!(cart.items_text(), "Generic Antibiotic x2, Premium Anti-inflammatory x1");
    }

    #[test]
    fn test_remove_decrements_then_drops() {
        let mut cart = Cart::new();
        cart.add(&CATALOG[3]);
        cart.add(&CATALOG[3]);

        assert!(cart.remove("Canine Vitamins"));
        assert_eq!(cart.items()[0].quantity, 1);
        assert!(cart.remove("Canine Vitamins"));
        assert!(cart.is_empty());
        assert!(!cart.remove("Canine Vitamins"));
        assert_eq!(cart.total(), 0.0);
    }

    #[test]
    fn test_from_lines_merges_and_validates() {
        let lines = vec![
            CartLine { medication: "basic analgesic".to_string(), quantity: 2 },
            CartLine { medication: "Basic Analgesic".to_string(), quantity: 1 },
        ];
        let cart = Cart::from_lines(&lines).unwrap();
        assert_eq!(cart.items_text(), "Basic Analgesic x3");
        assert_eq!(cart.total(), 24000.0);

        let bad = vec![CartLine { medication: "Basic Analgesic".to_string(), quantity: 0 }];
        assert_matches!(Cart::from_lines(&bad), Err(PharmacyError::ValidationError(_)));
    }

    #[test]
    fn test_huge_quantity_is_rejected_without_looping() {
        let lines = vec![CartLine { medication: "Basic Analgesic".to_string(), quantity: u32::MAX }];
        assert_matches!(Cart::from_lines(&lines), Err(PharmacyError::ValidationError(_)));
    }

    #[test]
    fn test_merged_lines_respect_cap() {
        let at_cap = vec![
            CartLine { medication: "Canine Vitamins".to_string(), quantity: 60 },
            CartLine { medication: "Canine Vitamins".to_string(), quantity: 40 },
        ];
        let cart = Cart::from_lines(&at_cap).unwrap();
        assert_eq!(cart.items()[0].quantity, MAX_LINE_QUANTITY);

        let over_cap = vec![
            CartLine { medication: "Canine Vitamins".to_string(), quantity: 60 },
            CartLine { medication: "Canine Vitamins".to_string(), quantity: 41 },
        ];
        assert_matches!(Cart::from_lines(&over_cap), Err(PharmacyError::ValidationError(_)));
    }
}
