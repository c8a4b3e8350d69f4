use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{NutritionTip, TipCategory, TipFilter, TipPriority};
use crate::{error::AppError, profile::dto::UserProfile, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tips", get(list_tips).delete(clear_tips))
        .route("/tips/current", get(current_tip))
        .route("/tips/next", post(next_tip))
        .route("/tips/refresh", post(refresh_tips))
}

/// Missing profiles behave like incomplete ones.
async fn current_profile(state: &AppState) -> UserProfile {
    state.profiles.load().await.unwrap_or_default()
}

#[instrument(skip(state))]
pub async fn list_tips(
    State(state): State<AppState>,
    Query(filter): Query<TipFilter>,
) -> Result<Json<Vec<NutritionTip>>, AppError> {
    let profile = current_profile(&state).await;
    let tips = match (filter.category.as_deref(), filter.priority.as_deref()) {
        (Some(_), Some(_)) => {
            return Err(AppError::bad_request(
                "filter by either category or priority, not both",
            ))
        }
        (Some(raw), None) => {
            let category: TipCategory = raw
                .parse()
                .map_err(|bad| AppError::bad_request(format!("unknown tip category: {bad}")))?;
            state.tips.tips_by_category(&profile, category).await
        }
        (None, Some(raw)) => {
            let priority: TipPriority = raw
                .parse()
                .map_err(|bad| AppError::bad_request(format!("unknown tip priority: {bad}")))?;
            state.tips.tips_by_priority(&profile, priority).await
        }
        (None, None) => state.tips.tips(&profile).await,
    };
    Ok(Json(tips))
}

#[instrument(skip(state))]
pub async fn current_tip(State(state): State<AppState>) -> Json<Option<NutritionTip>> {
    let profile = current_profile(&state).await;
    Json(state.tips.current_tip(&profile).await)
}

#[instrument(skip(state))]
pub async fn next_tip(State(state): State<AppState>) -> Json<Option<NutritionTip>> {
    if let Some(tip) = state.tips.advance_tip().await {
        return Json(Some(tip));
    }
    // nothing cached yet: generate a batch and start at its first tip
    let profile = current_profile(&state).await;
    Json(state.tips.current_tip(&profile).await)
}

#[instrument(skip(state))]
pub async fn refresh_tips(State(state): State<AppState>) -> Json<Vec<NutritionTip>> {
    let profile = current_profile(&state).await;
    Json(state.tips.force_refresh(&profile).await)
}

#[instrument(skip(state))]
pub async fn clear_tips(State(state): State<AppState>) -> StatusCode {
    state.tips.clear().await;
    StatusCode::NO_CONTENT
}
