pub mod category;
mod dto;
pub mod handlers;
pub mod labels;
pub mod nutrition;
pub mod services;
pub mod vision;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
