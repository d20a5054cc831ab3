use crate::models::{Pet, PetListQuery, SortOrder, ALL_SPECIES};

/// Applies the text query, species filter and name ordering in that order.
pub fn filter_pets(pets: Vec<Pet>, query: &PetListQuery) -> Vec<Pet> {
    let needle = query.q.as_deref().map(str::trim).unwrap_or("").to_lowercase();
    let species = query.species.as_deref()
        .filter(|s| !s.is_empty() && *s != ALL_SPECIES);

    let mut filtered: Vec<Pet> = pets.into_iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.owner_name.to_lowercase().contains(&needle)
        })
        .filter(|p| species.map_or(true, |s| p.species == s))
        .collect();

    match query.sort.unwrap_or_default() {
        SortOrder::Asc => filtered.sort_by(|a, b| a.name.cmp(&b.name)),
        SortOrder::Desc => filtered.sort_by(|a, b| b.name.cmp(&a.name)),
        SortOrder::None => {}
    }

    filtered
}

/// `"All"` followed by each distinct species in first-seen order.
pub fn available_species(pets: &[Pet]) -> Vec<String> {
    let mut species = vec![ALL_SPECIES.to_string()];
    for pet in pets {
        if !species[1..].contains(&pet.species) {
            species.push(pet.species.clone());
        }
    }
    species
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pet(id: i64, name: &str, species: &str, owner: &str) -> Pet {
        Pet {
            id,
            name: name.to_string(),
            species: species.to_string(),
            age_years: 2,
            weight_kg: 4.0,
            last_vaccination: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            owner_name: owner.to_string(),
        }
    }

    fn sample() -> Vec<Pet> {
        vec![
            pet(1, "Luna", "Cat", "Ana"),
            pet(2, "Bobby", "Dog", "Juan"),
            pet(3, "Coco", "Dog", "Liliana"),
            pet(4, "Kiwi", "Bird", "Juana"),
        ]
    }

    #[test]
    fn test_query_matches_pet_or_owner() {
        let query = PetListQuery { q: Some("juan".to_string()), ..Default::default() };
        let names: Vec<String> = filter_pets(sample(), &query).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bobby", "Kiwi"]);
    }

    #[test]
    fn test_species_filter_and_sort() {
        let query = PetListQuery {
            q: None,
            species: Some("Dog".to_string()),
            sort: Some(SortOrder::Desc),
        };
        let names: Vec<String> = filter_pets(sample(), &query).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Coco", "Bobby"]);
    }

    #[test]
    fn test_all_species_is_no_filter() {
        let query = PetListQuery {
            species: Some(ALL_SPECIES.to_string()),
            sort: Some(SortOrder::Asc),
            ..Default::default()
        };
        let names: Vec<String> = filter_pets(sample(), &query).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bobby", "Coco", "Kiwi", "Luna"]);
    }

    #[test]
    fn test_available_species_distinct() {
        assert_eq!(available_species(&sample()), vec!["All", "Cat", "Dog", "Bird"]);
        assert_eq!(available_species(&[]), vec!["All"]);
    }
}
