use axum::{
    Json, debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{AppError, AppResult, auth::normalize_email};

use super::{LAWYER_COLUMNS, LawyerDto, LawyerRow};

/// Public lawyer profile; the slug is the user's email or id.
#[debug_handler]
pub(crate) async fn lawyer(
    Path(slug): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Response> {
    let row: Option<LawyerRow> = sqlx::query_as(&format!(
        "SELECT {LAWYER_COLUMNS} FROM lawyer_profiles lp \
         JOIN users u ON u.id = lp.user_id \
         WHERE u.role = 'LAWYER' AND (u.email = ? OR u.id = ?)"
    ))
    .bind(normalize_email(&slug))
    .bind(&slug)
    .fetch_optional(&db_pool)
    .await?;

    let Some(row) = row else {
        return Err(AppError::NotFound("lawyer"));
    };

    Ok(Json(json!({
        "success": true,
        "lawyer": LawyerDto::from(row),
    }))
    .into_response())
}
