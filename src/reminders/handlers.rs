use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::instrument;

use super::catalog::{self, ReminderType, AVAILABLE_REMINDERS};
use super::repo::{is_valid_time, ActiveNotification, ReminderSettings, UserReminder};
use crate::{clock::now_ms, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reminders/catalog", get(list_catalog))
        .route("/reminders", get(get_settings).put(put_settings))
        .route("/reminders/toggle", post(toggle_all))
        .route("/reminders/items", post(add_reminder))
        .route("/reminders/items/:reminder_id", delete(remove_reminder))
        .route("/reminders/items/:reminder_id/toggle", post(toggle_reminder))
        .route("/reminders/check", post(check_reminders))
        .route(
            "/notifications",
            get(list_notifications).delete(clear_notifications),
        )
        .route("/notifications/:id/read", post(mark_read))
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReminderBody {
    pub reminder_id: String,
    /// Defaults to the catalogue's time for this reminder.
    pub time: Option<String>,
}

fn validate_reminder(reminder_id: &str, time: &str) -> Result<(), AppError> {
    if catalog::find(reminder_id).is_none() {
        return Err(AppError::bad_request(format!("unknown reminder: {reminder_id}")));
    }
    if !is_valid_time(time) {
        return Err(AppError::bad_request(format!("invalid time {time:?}, expected HH:MM")));
    }
    Ok(())
}

#[instrument]
pub async fn list_catalog() -> Json<&'static [ReminderType]> {
    Json(AVAILABLE_REMINDERS)
}

#[instrument(skip(state))]
pub async fn get_settings(State(state): State<AppState>) -> Json<ReminderSettings> {
    Json(state.reminders.settings().await)
}

#[instrument(skip(state, body))]
pub async fn put_settings(
    State(state): State<AppState>,
    Json(body): Json<ReminderSettings>,
) -> Result<Json<ReminderSettings>, AppError> {
    for r in &body.user_reminders {
        validate_reminder(&r.reminder_id, &r.time)?;
    }
    state.reminders.save_settings(&body).await?;
    Ok(Json(body))
}

#[instrument(skip(state))]
pub async fn toggle_all(
    State(state): State<AppState>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<ReminderSettings>, AppError> {
    state.reminders.toggle(body.enabled).await?;
    Ok(Json(state.reminders.settings().await))
}

#[instrument(skip(state))]
pub async fn add_reminder(
    State(state): State<AppState>,
    Json(body): Json<AddReminderBody>,
) -> Result<(StatusCode, Json<UserReminder>), AppError> {
    let time = match body.time {
        Some(t) => t,
        None => catalog::find(&body.reminder_id)
            .map(|k| k.default_time.to_string())
            .unwrap_or_default(),
    };
    validate_reminder(&body.reminder_id, &time)?;
    let reminder = state
        .reminders
        .add(&body.reminder_id, &time, now_ms())
        .await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

#[instrument(skip(state))]
pub async fn remove_reminder(
    State(state): State<AppState>,
    Path(reminder_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.reminders.remove(&reminder_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn toggle_reminder(
    State(state): State<AppState>,
    Path(reminder_id): Path<String>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<ReminderSettings>, AppError> {
    state
        .reminders
        .toggle_reminder(&reminder_id, body.enabled)
        .await?;
    Ok(Json(state.reminders.settings().await))
}

#[instrument(skip(state))]
pub async fn check_reminders(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActiveNotification>>, AppError> {
    let fired = state.reminders.check_due(OffsetDateTime::now_utc()).await?;
    Ok(Json(fired))
}

#[instrument(skip(state))]
pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<ActiveNotification>> {
    Json(state.reminders.notifications().await)
}

#[instrument(skip(state))]
pub async fn clear_notifications(State(state): State<AppState>) -> StatusCode {
    state.reminders.clear_notifications().await;
    StatusCode::NO_CONTENT
}

#[instrument(skip(state))]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.reminders.mark_read(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Notification not found"))
    }
}
