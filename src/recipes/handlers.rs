use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo::{Recipe, RATING_RANGE};
use crate::{clock::now_ms, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes",
            get(list_recipes).post(create_recipe).delete(clear_recipes),
        )
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub name: String,
    pub rating: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    pub min_rating: Option<i64>,
}

fn rating(raw: i64) -> Result<u8, AppError> {
    u8::try_from(raw)
        .ok()
        .filter(|r| RATING_RANGE.contains(r))
        .ok_or_else(|| {
            AppError::bad_request(format!(
                "rating must be between {} and {}",
                RATING_RANGE.start(),
                RATING_RANGE.end()
            ))
        })
}

fn name(raw: String) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    Ok(trimmed.to_string())
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(q): Query<RecipeQuery>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let recipes = match q.min_rating {
        Some(min) => state.recipes.by_min_rating(rating(min)?).await,
        None => state.recipes.list().await,
    };
    Ok(Json(recipes))
}

#[instrument(skip(state, body))]
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(body): Json<RecipeInput>,
) -> Result<(StatusCode, Json<Recipe>), AppError> {
    let recipe = Recipe {
        id: Uuid::new_v4().to_string(),
        name: name(body.name)?,
        rating: rating(body.rating)?,
        image_url: body.image_url,
        date_added: now_ms(),
    };
    state.recipes.save(recipe.clone()).await?;
    info!(id = %recipe.id, rating = recipe.rating, "recipe saved");
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, AppError> {
    state
        .recipes
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Recipe not found"))
}

#[instrument(skip(state, body))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RecipeInput>,
) -> Result<Json<Recipe>, AppError> {
    let existing = state
        .recipes
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found("Recipe not found"))?;
    let updated = Recipe {
        name: name(body.name)?,
        rating: rating(body.rating)?,
        image_url: body.image_url,
        ..existing
    };
    if !state.recipes.update(updated.clone()).await? {
        return Err(AppError::not_found("Recipe not found"));
    }
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.recipes.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Recipe not found"))
    }
}

#[instrument(skip(state))]
pub async fn clear_recipes(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.recipes.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
