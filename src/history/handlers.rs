use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;

use crate::{error::AppError, food::services::FoodIdentification, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history).delete(clear_history))
        .route("/history/:timestamp", delete(remove_entry))
}

#[instrument(skip(state))]
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<FoodIdentification>> {
    Json(state.history.list().await)
}

#[instrument(skip(state))]
pub async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.history.clear().await;
    StatusCode::NO_CONTENT
}

#[instrument(skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    Path(timestamp): Path<i64>,
) -> Result<StatusCode, AppError> {
    match state.history.remove(timestamp).await {
        0 => Err(AppError::not_found("History entry not found")),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
