mod list;
mod track;

use axum::{
    Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events/track", post(track::track))
        .route("/events", get(list::list))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    PageView,
    ConsultationBooked,
    PaymentCompleted,
    MessageSent,
    ProfileViewed,
}
