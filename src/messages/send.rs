use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    db::{self, PublicUser},
    session::CurrentUser,
};

use super::require_member;

const MAX_CONTENT_LEN: usize = 5000;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageRequest {
    conversation_id: String,
    content: String,
}

#[debug_handler]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Response> {
    if req.content.is_empty() || req.content.len() > MAX_CONTENT_LEN {
        return Err(AppError::Validation(format!(
            "content must be between 1 and {MAX_CONTENT_LEN} characters"
        )));
    }

    require_member(&db_pool, &req.conversation_id, &user.id).await?;

    let id = Uuid::now_v7().to_string();
    let created_at = db::now();

    let mut tx = db_pool.begin().await?;
    sqlx::query(
        "INSERT INTO messages (id,conversation_id,sender_id,content,created_at) VALUES (?,?,?,?,?)",
    )
    .bind(&id)
    .bind(&req.conversation_id)
    .bind(&user.id)
    .bind(&req.content)
    .bind(created_at)
    .execute(&mut *tx)
    .await?;
    sqlx::query("UPDATE conversations SET last_message_at=? WHERE id=?")
        .bind(created_at)
        .bind(&req.conversation_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    let sender = PublicUser::fetch(&db_pool, &user.id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok(Json(json!({
        "success": true,
        "message": {
            "id": id,
            "conversationId": req.conversation_id,
            "senderId": user.id,
            "content": req.content,
            "createdAt": db::rfc3339(created_at),
            "sender": { "id": sender.id, "name": sender.name, "avatar": sender.avatar },
        },
    }))
    .into_response())
}
