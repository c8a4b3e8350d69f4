use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FoodCategory {
    Fruit,
    Vegetable,
    Protein,
    Grain,
    Dessert,
    Beverage,
    #[default]
    Food,
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fruit => "Fruit",
            Self::Vegetable => "Vegetable",
            Self::Protein => "Protein",
            Self::Grain => "Grain",
            Self::Dessert => "Dessert",
            Self::Beverage => "Beverage",
            Self::Food => "Food",
        };
        f.write_str(s)
    }
}

// Checked in order; the first rule with a matching keyword wins.
const CATEGORY_RULES: &[(FoodCategory, &[&str])] = &[
    (FoodCategory::Fruit, &["apple", "banana", "orange", "grape", "berry", "fruit"]),
    (
        FoodCategory::Vegetable,
        &["vegetable", "carrot", "broccoli", "lettuce", "tomato", "salad"],
    ),
    (FoodCategory::Protein, &["meat", "chicken", "beef", "pork", "fish", "seafood"]),
    (FoodCategory::Grain, &["bread", "pasta", "rice", "grain", "cereal"]),
    (FoodCategory::Dessert, &["cake", "cookie", "dessert", "pastry", "sweet"]),
    (FoodCategory::Beverage, &["drink", "beverage", "juice", "coffee", "tea"]),
];

pub fn categorize(food_name: &str) -> FoodCategory {
    let name = food_name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}
