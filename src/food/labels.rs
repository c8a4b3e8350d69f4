use serde::{Deserialize, Serialize};

/// Minimum score a keyword-matching label needs for an image to count as food.
pub const RELEVANCE_THRESHOLD: f64 = 0.5;

pub const FOOD_KEYWORDS: &[&str] = &[
    "food", "dish", "meal", "cuisine", "ingredient", "vegetable", "fruit", "meat", "bread",
    "pasta", "rice", "chicken", "beef", "fish", "seafood", "pizza", "burger", "sandwich",
    "salad", "soup", "dessert", "cake", "cookie", "pastry", "breakfast", "lunch", "dinner",
    "snack", "beverage", "drink", "coffee", "tea", "juice", "dairy", "cheese", "egg", "nut",
    "seed", "grain", "cereal", "sauce", "spice", "herb", "oil", "butter",
    // specific foods the categorizer and nutrition table know by name
    "apple", "banana", "orange", "grape", "berry", "carrot", "broccoli", "lettuce", "tomato",
    "pork",
];

/// One weighted label reported by the label-detection source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub description: String,
    pub score: f64,
}

impl Label {
    pub fn new(description: impl Into<String>, score: f64) -> Self {
        Self {
            description: description.into(),
            score,
        }
    }

    pub fn mentions_food(&self) -> bool {
        let description = self.description.to_lowercase();
        FOOD_KEYWORDS.iter().any(|k| description.contains(k))
    }
}

/// True when at least one label names food with a score above the threshold.
pub fn is_food_related(labels: &[Label]) -> bool {
    labels
        .iter()
        .any(|l| l.mentions_food() && l.score > RELEVANCE_THRESHOLD)
}

/// Highest scoring food label regardless of threshold; the earliest wins ties.
pub fn best_food_label(labels: &[Label]) -> Option<&Label> {
    labels
        .iter()
        .filter(|l| l.mentions_food())
        .fold(None, |best: Option<&Label>, current| match best {
            Some(b) if current.score <= b.score => Some(b),
            _ => Some(current),
        })
}
