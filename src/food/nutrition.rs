use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "N/A";

/// Approximate macros, kept as display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionalInfo {
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
}

impl NutritionalInfo {
    pub fn new(calories: &str, protein: &str, carbs: &str, fat: &str) -> Self {
        Self {
            calories: calories.to_string(),
            protein: protein.to_string(),
            carbs: carbs.to_string(),
            fat: fat.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN)
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }
}

struct NutritionRow {
    key: &'static str,
    calories: &'static str,
    protein: &'static str,
    carbs: &'static str,
    fat: &'static str,
}

const fn row(
    key: &'static str,
    calories: &'static str,
    protein: &'static str,
    carbs: &'static str,
    fat: &'static str,
) -> NutritionRow {
    NutritionRow {
        key,
        calories,
        protein,
        carbs,
        fat,
    }
}

// Declaration order decides ambiguous matches.
const NUTRITION_TABLE: &[NutritionRow] = &[
    row("apple", "52 per 100g", "0.3g", "14g", "0.2g"),
    row("banana", "89 per 100g", "1.1g", "23g", "0.3g"),
    row("orange", "47 per 100g", "0.9g", "12g", "0.1g"),
    row("bread", "265 per 100g", "9g", "49g", "3.2g"),
    row("rice", "130 per 100g", "2.7g", "28g", "0.3g"),
    row("chicken", "239 per 100g", "27g", "0g", "14g"),
    row("beef", "250 per 100g", "26g", "0g", "15g"),
    row("fish", "206 per 100g", "22g", "0g", "12g"),
    row("pasta", "131 per 100g", "5g", "25g", "1.1g"),
    row("pizza", "266 per 100g", "11g", "33g", "10g"),
    row("salad", "20 per 100g", "1.4g", "4g", "0.2g"),
    row("egg", "155 per 100g", "13g", "1.1g", "11g"),
    row("cheese", "402 per 100g", "25g", "1.3g", "33g"),
];

pub fn lookup(food_name: &str) -> NutritionalInfo {
    let name = food_name.to_lowercase();
    NUTRITION_TABLE
        .iter()
        .find(|r| name.contains(r.key))
        .map(|r| NutritionalInfo::new(r.calories, r.protein, r.carbs, r.fat))
        .unwrap_or_else(NutritionalInfo::unknown)
}

#[cfg(test)]
mod nutrition_tests {
    use super::*;

    #[test]
    fn substring_match() {
        let info = lookup("granny smith apple");
        assert_eq!(info.calories, "52 per 100g");
        assert_eq!(info.carbs, "14g");
    }

    #[test]
    fn unknown_food_is_all_na() {
        let info = lookup("unknown-food");
        assert!(info.is_unknown());
        assert_eq!(info.fat, "N/A");
    }

    #[test]
    fn first_declared_entry_wins() {
        // both "chicken" and "cheese" match; chicken is declared first.
        assert_eq!(lookup("Cheese chicken bake").calories, "239 per 100g");
        // "rice" precedes "egg".
        assert_eq!(lookup("Egg fried rice").calories, "130 per 100g");
    }
}
