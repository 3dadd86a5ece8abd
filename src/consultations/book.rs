use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState,
    db::{self, PublicUser},
    email::{self, Mailer},
    session::CurrentUser,
};

const MIN_DURATION_MIN: i64 = 15;
const MAX_DURATION_MIN: i64 = 480;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookRequest {
    lawyer_id: String,
    title: String,
    description: Option<String>,
    scheduled_at: String,
    duration: i64,
}

/// Book a consultation slot. The conflict check and the insert share one
/// transaction; SQLite serializes writers, so two racing requests for
/// overlapping slots cannot both commit.
#[debug_handler(state = AppState)]
pub(crate) async fn book(
    State(db_pool): State<SqlitePool>,
    State(mailer): State<Mailer>,
    user: CurrentUser,
    Json(req): Json<BookRequest>,
) -> AppResult<Response> {
    if req.title.trim().len() < 5 {
        return Err(AppError::Validation(
            "title must be at least 5 characters".to_owned(),
        ));
    }
    if !(MIN_DURATION_MIN..=MAX_DURATION_MIN).contains(&req.duration) {
        return Err(AppError::Validation(format!(
            "duration must be between {MIN_DURATION_MIN} and {MAX_DURATION_MIN} minutes"
        )));
    }
    let start = OffsetDateTime::parse(&req.scheduled_at, &Rfc3339)
        .map_err(|_| AppError::Validation("scheduledAt must be an RFC 3339 timestamp".to_owned()))?
        .unix_timestamp();
    let end = start + req.duration * 60;

    let mut tx = db_pool.begin().await?;

    let lawyer: Option<(String, String)> =
        sqlx::query_as("SELECT name,email FROM users WHERE id=? AND role='LAWYER'")
            .bind(&req.lawyer_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((lawyer_name, _)) = lawyer else {
        return Err(AppError::NotFound("lawyer"));
    };

    // existing.start < candidate.end AND existing.end > candidate.start
    let conflict: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM consultations \
         WHERE lawyer_id = ? AND status IN ('SCHEDULED','CONFIRMED') \
           AND scheduled_at < ? AND scheduled_at + duration_min * 60 > ?",
    )
    .bind(&req.lawyer_id)
    .bind(end)
    .bind(start)
    .fetch_optional(&mut *tx)
    .await?;
    if conflict.is_some() {
        return Err(AppError::Conflict("time slot not available".to_owned()));
    }

    let id = Uuid::now_v7().to_string();
    let created_at = db::now();
    sqlx::query(
        "INSERT INTO consultations \
         (id,client_id,lawyer_id,title,description,scheduled_at,duration_min,status,created_at) \
         VALUES (?,?,?,?,?,?,?,'SCHEDULED',?)",
    )
    .bind(&id)
    .bind(&user.id)
    .bind(&req.lawyer_id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(start)
    .bind(req.duration)
    .bind(created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(consultation_id = %id, lawyer_id = %req.lawyer_id, "consultation booked");

    let client = PublicUser::fetch(&db_pool, &user.id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    let lawyer = PublicUser::fetch(&db_pool, &req.lawyer_id)
        .await?
        .ok_or(AppError::NotFound("lawyer"))?;

    {
        let (to, name) = (client.email.clone(), client.name.clone());
        let (title, when) = (req.title.trim().to_owned(), db::rfc3339(start));
        email::spawn_send(async move {
            mailer
                .send_consultation_confirmation(&to, &name, &lawyer_name, &when, &title)
                .await
        });
    }

    Ok(Json(json!({
        "success": true,
        "consultation": {
            "id": id,
            "title": req.title.trim(),
            "description": req.description,
            "scheduledAt": db::rfc3339(start),
            "duration": req.duration,
            "status": "SCHEDULED",
            "createdAt": db::rfc3339(created_at),
            "client": { "id": client.id, "name": client.name, "email": client.email },
            "lawyer": { "id": lawyer.id, "name": lawyer.name, "email": lawyer.email },
        },
    }))
    .into_response())
}
