use serde::{Deserialize, Serialize};
use tracing::error;

use crate::storage::{Store, RECIPES_KEY};

pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub date_added: i64,
}

#[derive(Clone)]
pub struct RecipeRepo {
    store: Store,
}

impl RecipeRepo {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn save(&self, recipe: Recipe) -> anyhow::Result<()> {
        self.store
            .update_json::<Vec<Recipe>, _, _>(RECIPES_KEY, |slot| {
                slot.get_or_insert_with(Vec::new).insert(0, recipe);
            })
            .await
    }

    /// All recipes, newest first.
    pub async fn list(&self) -> Vec<Recipe> {
        let mut recipes = self
            .store
            .read_json::<Vec<Recipe>>(RECIPES_KEY)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, key = RECIPES_KEY, "error getting recipes");
                None
            })
            .unwrap_or_default();
        recipes.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        recipes
    }

    pub async fn get(&self, id: &str) -> Option<Recipe> {
        self.list().await.into_iter().find(|r| r.id == id)
    }

    pub async fn by_min_rating(&self, min_rating: u8) -> Vec<Recipe> {
        let mut recipes = self.list().await;
        recipes.retain(|r| r.rating >= min_rating);
        recipes
    }

    /// Replaces the recipe with the same id. Returns false when none matched.
    pub async fn update(&self, updated: Recipe) -> anyhow::Result<bool> {
        self.store
            .update_json::<Vec<Recipe>, _, _>(RECIPES_KEY, |slot| {
                let Some(list) = slot.as_mut() else {
                    return false;
                };
                match list.iter_mut().find(|r| r.id == updated.id) {
                    Some(existing) => {
                        *existing = updated;
                        true
                    }
                    None => false,
                }
            })
            .await
    }

    /// Returns false when no recipe had that id.
    pub async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        self.store
            .update_json::<Vec<Recipe>, _, _>(RECIPES_KEY, |slot| {
                let Some(list) = slot.as_mut() else {
                    return false;
                };
                let before = list.len();
                list.retain(|r| r.id != id);
                list.len() != before
            })
            .await
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(RECIPES_KEY).await
    }
}
