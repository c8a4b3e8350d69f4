use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{ProfileSummary, UserProfile};
use super::services::save_profile;
use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(get_profile).put(put_profile).delete(delete_profile),
        )
        .route("/profile/summary", get(get_summary))
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    state
        .profiles
        .load()
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Profile not found"))
}

#[instrument(skip(state, body))]
pub async fn put_profile(
    State(state): State<AppState>,
    Json(body): Json<UserProfile>,
) -> Result<Json<UserProfile>, AppError> {
    let saved = save_profile(&state.profiles, &state.tips, body).await?;
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn delete_profile(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.profiles.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<ProfileSummary>, AppError> {
    let profile = state
        .profiles
        .load()
        .await
        .ok_or_else(|| AppError::not_found("Profile not found"))?;
    Ok(Json(ProfileSummary::from_profile(&profile)))
}
