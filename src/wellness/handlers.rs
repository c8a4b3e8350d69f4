use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::repo::{WellnessEntry, SCORE_RANGE};
use crate::{clock::to_ms, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/wellness",
            get(latest_entry).post(record_entry).delete(clear_entries),
        )
        .route("/wellness/today", get(todays_entry))
        .route("/wellness/due", get(check_due))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWellness {
    pub mood_score: i64,
    pub energy_level: i64,
    pub support_option: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedWellness {
    #[serde(flatten)]
    pub entry: WellnessEntry,
    pub needs_support: bool,
}

#[derive(Debug, Serialize)]
pub struct WellnessDue {
    pub due: bool,
}

fn score(raw: i64) -> Result<u8, AppError> {
    u8::try_from(raw)
        .ok()
        .filter(|s| SCORE_RANGE.contains(s))
        .ok_or_else(|| {
            AppError::bad_request(format!(
                "scores must be between {} and {}",
                SCORE_RANGE.start(),
                SCORE_RANGE.end()
            ))
        })
}

#[instrument(skip(state))]
pub async fn record_entry(
    State(state): State<AppState>,
    Json(body): Json<RecordWellness>,
) -> Result<(StatusCode, Json<RecordedWellness>), AppError> {
    let now = OffsetDateTime::now_utc();
    let entry = WellnessEntry {
        mood_score: score(body.mood_score)?,
        energy_level: score(body.energy_level)?,
        timestamp: to_ms(now),
        support_option: body.support_option,
    };
    state.wellness.save(&entry, now).await?;
    info!(mood = entry.mood_score, energy = entry.energy_level, "wellness check recorded");
    let needs_support = entry.needs_support();
    Ok((
        StatusCode::CREATED,
        Json(RecordedWellness {
            entry,
            needs_support,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn latest_entry(State(state): State<AppState>) -> Json<Option<WellnessEntry>> {
    Json(state.wellness.latest().await)
}

#[instrument(skip(state))]
pub async fn todays_entry(State(state): State<AppState>) -> Json<Option<WellnessEntry>> {
    Json(state.wellness.todays(OffsetDateTime::now_utc()).await)
}

#[instrument(skip(state))]
pub async fn check_due(State(state): State<AppState>) -> Json<WellnessDue> {
    let due = state
        .wellness
        .should_show_check(OffsetDateTime::now_utc())
        .await;
    Json(WellnessDue { due })
}

#[instrument(skip(state))]
pub async fn clear_entries(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.wellness.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
