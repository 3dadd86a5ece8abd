use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{AppError, AppResult, session::CurrentUser};

use super::Kind;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendNotificationRequest {
    user_id: String,
    title: String,
    content: String,
    #[serde(rename = "type")]
    kind: Kind,
    link: Option<String>,
}

#[debug_handler]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    _user: CurrentUser,
    Json(req): Json<SendNotificationRequest>,
) -> AppResult<Response> {
    if req.title.is_empty() || req.title.len() > 255 {
        return Err(AppError::Validation(
            "title must be between 1 and 255 characters".to_owned(),
        ));
    }
    if req.content.is_empty() || req.content.len() > 1000 {
        return Err(AppError::Validation(
            "content must be between 1 and 1000 characters".to_owned(),
        ));
    }

    let target: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id=?")
        .bind(&req.user_id)
        .fetch_optional(&db_pool)
        .await?;
    if target.is_none() {
        return Err(AppError::NotFound("user"));
    }

    let id = super::insert(
        &db_pool,
        &req.user_id,
        &req.title,
        &req.content,
        req.kind,
        req.link.as_deref(),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "notification": {
            "id": id,
            "userId": req.user_id,
            "title": req.title,
            "content": req.content,
            "type": req.kind,
            "link": req.link,
            "read": false,
        },
    }))
    .into_response())
}
