use axum::{
    Json, debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{AppError, AppResult, db, session::CurrentUser};

use super::require_member;

const PAGE_SIZE: i64 = 50;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMessagesQuery {
    conversation_id: Option<String>,
}

/// Messages oldest-first, capped at one page. The uuid-v7 id tiebreak keeps
/// ordering stable when two messages share a second.
#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Query(query): Query<ListMessagesQuery>,
) -> AppResult<Response> {
    let Some(conversation_id) = query.conversation_id else {
        return Err(AppError::Validation("conversationId is required".to_owned()));
    };

    require_member(&db_pool, &conversation_id, &user.id).await?;

    let rows: Vec<(String, String, String, i64, String, Option<String>)> = sqlx::query_as(
        "SELECT m.id, m.sender_id, m.content, m.created_at, u.name, u.avatar \
         FROM messages m JOIN users u ON u.id = m.sender_id \
         WHERE m.conversation_id = ? \
         ORDER BY m.created_at ASC, m.id ASC LIMIT ?",
    )
    .bind(&conversation_id)
    .bind(PAGE_SIZE)
    .fetch_all(&db_pool)
    .await?;

    let messages: Vec<_> = rows
        .into_iter()
        .map(|(id, sender_id, content, created_at, name, avatar)| {
            json!({
                "id": id,
                "conversationId": conversation_id,
                "senderId": sender_id.clone(),
                "content": content,
                "createdAt": db::rfc3339(created_at),
                "sender": { "id": sender_id, "name": name, "avatar": avatar },
            })
        })
        .collect();

    Ok(Json(json!({ "success": true, "messages": messages })).into_response())
}
