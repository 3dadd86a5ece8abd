mod list;
mod new;
mod send;

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::SqlitePool;

use crate::{AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversations", post(new::new_conversation))
        .route("/messages/send", post(send::send))
        .route("/messages", get(list::list))
}

/// Conversation must exist (404) and the caller must be a participant (403).
/// Non-members get an authorization failure, never a not-found.
pub(crate) async fn require_member(
    db_pool: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
) -> AppResult<()> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM conversations WHERE id=?")
        .bind(conversation_id)
        .fetch_optional(db_pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("conversation"));
    }

    let member: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM conversation_participants WHERE conversation_id=? AND user_id=?",
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
    if member.is_none() {
        return Err(AppError::Forbidden);
    }

    Ok(())
}
