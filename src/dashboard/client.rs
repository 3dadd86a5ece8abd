use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult,
    db::{self, PublicUser, Role},
    session::CurrentUser,
};

/// Client dashboard: profile, cases, recent consultations, counts and spend,
/// all scoped to the caller.
#[debug_handler]
pub(crate) async fn dashboard(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
) -> AppResult<Response> {
    if user.role != Role::Client {
        return Err(AppError::Forbidden);
    }

    let profile: Option<(String,)> =
        sqlx::query_as("SELECT user_id FROM client_profiles WHERE user_id=?")
            .bind(&user.id)
            .fetch_optional(&db_pool)
            .await?;
    if profile.is_none() {
        return Err(AppError::NotFound("client profile"));
    }
    let me = PublicUser::fetch(&db_pool, &user.id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let cases: Vec<(String, String, Option<String>, String, i64, String, String, Option<String>)> =
        sqlx::query_as(
            "SELECT c.id, c.title, c.description, c.status, c.created_at, \
                    u.id, u.name, u.avatar \
             FROM cases c JOIN users u ON u.id = c.lawyer_id \
             WHERE c.client_id=? ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(&user.id)
        .fetch_all(&db_pool)
        .await?;

    let consultations: Vec<(String, String, i64, i64, String, String, String)> = sqlx::query_as(
        "SELECT c.id, c.title, c.scheduled_at, c.duration_min, c.status, u.id, u.name \
         FROM consultations c JOIN users u ON u.id = c.lawyer_id \
         WHERE c.client_id=? ORDER BY c.created_at DESC, c.id DESC LIMIT 10",
    )
    .bind(&user.id)
    .fetch_all(&db_pool)
    .await?;

    let (total_cases,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cases WHERE client_id=?")
        .bind(&user.id)
        .fetch_one(&db_pool)
        .await?;
    let (active_cases,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cases WHERE client_id=? AND status='OPEN'")
            .bind(&user.id)
            .fetch_one(&db_pool)
            .await?;
    let (completed_cases,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cases WHERE client_id=? AND status='CLOSED'")
            .bind(&user.id)
            .fetch_one(&db_pool)
            .await?;
    let (total_spent,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(amount),0) FROM payments WHERE user_id=?")
            .bind(&user.id)
            .fetch_one(&db_pool)
            .await?;

    Ok(Json(json!({
        "success": true,
        "profile": { "user": me },
        "cases": cases.into_iter().map(|(id, title, description, status, created_at, lawyer_id, lawyer_name, lawyer_avatar)| json!({
            "id": id,
            "title": title,
            "description": description,
            "status": status,
            "createdAt": db::rfc3339(created_at),
            "lawyer": { "id": lawyer_id, "name": lawyer_name, "avatar": lawyer_avatar },
        })).collect::<Vec<_>>(),
        "consultations": consultations.into_iter().map(|(id, title, scheduled_at, duration, status, lawyer_id, lawyer_name)| json!({
            "id": id,
            "title": title,
            "scheduledAt": db::rfc3339(scheduled_at),
            "duration": duration,
            "status": status,
            "lawyer": { "id": lawyer_id, "name": lawyer_name },
        })).collect::<Vec<_>>(),
        "stats": {
            "totalCases": total_cases,
            "activeCases": active_cases,
            "completedCases": completed_cases,
            "totalSpent": total_spent,
        },
    }))
    .into_response())
}
