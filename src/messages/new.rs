use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, db, session::CurrentUser};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewConversationRequest {
    participant_id: String,
}

#[debug_handler]
pub(crate) async fn new_conversation(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(req): Json<NewConversationRequest>,
) -> AppResult<Response> {
    let participant: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id=?")
        .bind(&req.participant_id)
        .fetch_optional(&db_pool)
        .await?;
    if participant.is_none() {
        return Err(AppError::NotFound("user"));
    }

    let id = Uuid::now_v7().to_string();
    let created_at = db::now();

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO conversations (id,created_at,last_message_at) VALUES (?,?,?)")
        .bind(&id)
        .bind(created_at)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
    for participant_id in [&user.id, &req.participant_id] {
        sqlx::query(
            "INSERT OR IGNORE INTO conversation_participants (conversation_id,user_id) VALUES (?,?)",
        )
        .bind(&id)
        .bind(participant_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(Json(json!({
        "success": true,
        "conversation": {
            "id": id,
            "participants": [user.id, req.participant_id],
            "createdAt": db::rfc3339(created_at),
        },
    }))
    .into_response())
}
