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

use super::EventType;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackEventRequest {
    event_name: String,
    event_type: EventType,
    metadata: Option<serde_json::Value>,
}

#[debug_handler]
pub(crate) async fn track(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(req): Json<TrackEventRequest>,
) -> AppResult<Response> {
    if req.event_name.is_empty() || req.event_name.len() > 255 {
        return Err(AppError::Validation(
            "eventName must be between 1 and 255 characters".to_owned(),
        ));
    }

    let metadata = req.metadata.unwrap_or_else(|| json!({}));
    let id = Uuid::now_v7().to_string();
    let created_at = db::now();

    sqlx::query(
        "INSERT INTO events (id,user_id,event_name,event_type,metadata,created_at) \
         VALUES (?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(&user.id)
    .bind(&req.event_name)
    .bind(req.event_type)
    .bind(serde_json::to_string(&metadata)?)
    .bind(created_at)
    .execute(&db_pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "event": {
            "id": id,
            "userId": user.id,
            "eventName": req.event_name,
            "eventType": req.event_type,
            "metadata": metadata,
            "createdAt": db::rfc3339(created_at),
        },
    }))
    .into_response())
}
