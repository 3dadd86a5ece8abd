use axum::{
    Json, Router, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState,
    db::{self, Role},
    session::CurrentUser,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/cases", post(create).get(list))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCaseRequest {
    lawyer_id: String,
    title: String,
    description: Option<String>,
}

#[debug_handler]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(req): Json<CreateCaseRequest>,
) -> AppResult<Response> {
    if user.role != Role::Client {
        return Err(AppError::Forbidden);
    }
    if req.title.trim().len() < 5 {
        return Err(AppError::Validation(
            "title must be at least 5 characters".to_owned(),
        ));
    }

    let lawyer: Option<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE id=? AND role='LAWYER'")
            .bind(&req.lawyer_id)
            .fetch_optional(&db_pool)
            .await?;
    if lawyer.is_none() {
        return Err(AppError::NotFound("lawyer"));
    }

    let id = Uuid::now_v7().to_string();
    let created_at = db::now();
    sqlx::query(
        "INSERT INTO cases (id,client_id,lawyer_id,title,description,status,created_at) \
         VALUES (?,?,?,?,?,'OPEN',?)",
    )
    .bind(&id)
    .bind(&user.id)
    .bind(&req.lawyer_id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(created_at)
    .execute(&db_pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "case": {
            "id": id,
            "clientId": user.id,
            "lawyerId": req.lawyer_id,
            "title": req.title.trim(),
            "description": req.description,
            "status": "OPEN",
            "createdAt": db::rfc3339(created_at),
        },
    }))
    .into_response())
}

/// The caller's cases, scoped by which side of the table they sit on.
#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
) -> AppResult<Response> {
    let sql = match user.role {
        Role::Client => {
            "SELECT id,client_id,lawyer_id,title,description,status,created_at \
             FROM cases WHERE client_id=? ORDER BY created_at DESC, id DESC"
        }
        Role::Lawyer => {
            "SELECT id,client_id,lawyer_id,title,description,status,created_at \
             FROM cases WHERE lawyer_id=? ORDER BY created_at DESC, id DESC"
        }
    };

    let rows: Vec<(String, String, String, String, Option<String>, String, i64)> =
        sqlx::query_as(sql).bind(&user.id).fetch_all(&db_pool).await?;

    let cases: Vec<_> = rows
        .into_iter()
        .map(
            |(id, client_id, lawyer_id, title, description, status, created_at)| {
                json!({
                    "id": id,
                    "clientId": client_id,
                    "lawyerId": lawyer_id,
                    "title": title,
                    "description": description,
                    "status": status,
                    "createdAt": db::rfc3339(created_at),
                })
            },
        )
        .collect();

    Ok(Json(json!({ "success": true, "cases": cases })).into_response())
}
