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

#[derive(sqlx::FromRow)]
struct ProfileRow {
    license_number: String,
    license_state: String,
    specialties: String,
    biography: Option<String>,
    consultation_fee: Option<f64>,
    rating: f64,
    review_count: i64,
}

#[debug_handler]
pub(crate) async fn dashboard(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
) -> AppResult<Response> {
    if user.role != Role::Lawyer {
        return Err(AppError::Forbidden);
    }

    let profile: Option<ProfileRow> = sqlx::query_as(
        "SELECT license_number,license_state,specialties,biography,\
                consultation_fee,rating,review_count \
         FROM lawyer_profiles WHERE user_id=?",
    )
    .bind(&user.id)
    .fetch_optional(&db_pool)
    .await?;
    let Some(profile) = profile else {
        return Err(AppError::NotFound("lawyer profile"));
    };
    let me = PublicUser::fetch(&db_pool, &user.id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let consultations: Vec<(String, String, i64, i64, String, String, String)> = sqlx::query_as(
        "SELECT c.id, c.title, c.scheduled_at, c.duration_min, c.status, u.id, u.name \
         FROM consultations c JOIN users u ON u.id = c.client_id \
         WHERE c.lawyer_id=? ORDER BY c.created_at DESC, c.id DESC LIMIT 10",
    )
    .bind(&user.id)
    .fetch_all(&db_pool)
    .await?;

    let cases: Vec<(String, String, String, i64, String, String)> = sqlx::query_as(
        "SELECT c.id, c.title, c.status, c.created_at, u.id, u.name \
         FROM cases c JOIN users u ON u.id = c.client_id \
         WHERE c.lawyer_id=? ORDER BY c.created_at DESC, c.id DESC LIMIT 10",
    )
    .bind(&user.id)
    .fetch_all(&db_pool)
    .await?;

    let (total_consultations,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM consultations WHERE lawyer_id=?")
            .bind(&user.id)
            .fetch_one(&db_pool)
            .await?;
    let (total_cases,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cases WHERE lawyer_id=?")
        .bind(&user.id)
        .fetch_one(&db_pool)
        .await?;
    let (completed_cases,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cases WHERE lawyer_id=? AND status='CLOSED'")
            .bind(&user.id)
            .fetch_one(&db_pool)
            .await?;
    // revenue = payments against this lawyer's consultations
    let (total_revenue,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(p.amount),0) FROM payments p \
         JOIN consultations c ON c.id = p.consultation_id \
         WHERE c.lawyer_id=?",
    )
    .bind(&user.id)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "profile": {
            "user": me,
            "licenseNumber": profile.license_number,
            "licenseState": profile.license_state,
            "specialties": serde_json::from_str::<Vec<String>>(&profile.specialties)
                .unwrap_or_default(),
            "biography": profile.biography,
            "consultationFee": profile.consultation_fee,
            "rating": profile.rating,
            "reviewCount": profile.review_count,
        },
        "consultations": consultations.into_iter().map(|(id, title, scheduled_at, duration, status, client_id, client_name)| json!({
            "id": id,
            "title": title,
            "scheduledAt": db::rfc3339(scheduled_at),
            "duration": duration,
            "status": status,
            "client": { "id": client_id, "name": client_name },
        })).collect::<Vec<_>>(),
        "cases": cases.into_iter().map(|(id, title, status, created_at, client_id, client_name)| json!({
            "id": id,
            "title": title,
            "status": status,
            "createdAt": db::rfc3339(created_at),
            "client": { "id": client_id, "name": client_name },
        })).collect::<Vec<_>>(),
        "stats": {
            "totalConsultations": total_consultations,
            "totalCases": total_cases,
            "completedCases": completed_cases,
            "totalRevenue": total_revenue,
            "rating": profile.rating,
            "totalReviews": profile.review_count,
        },
    }))
    .into_response())
}
