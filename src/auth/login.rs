use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppError, AppResult, db::Role, session};

use super::{normalize_email, verify_password};

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

/// Credentials login. Unknown email, password-less (OAuth-only) account and
/// wrong password all fail with the same opaque 401.
#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let email = normalize_email(&req.email);

    let row: Option<(String, String, Option<String>, Role, Option<String>, bool)> =
        sqlx::query_as("SELECT id,name,password_hash,role,avatar,verified FROM users WHERE email=?")
            .bind(&email)
            .fetch_optional(&db_pool)
            .await?;

    let Some((id, name, Some(password_hash), role, avatar, verified)) = row else {
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(&req.password, &password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    session::establish(&session, &id, role).await?;
    tracing::info!(user_id = %id, "credentials login");

    Ok(Json(json!({
        "success": true,
        "user": {
            "id": id,
            "name": name,
            "email": email,
            "role": role,
            "avatar": avatar,
            "verified": verified,
        },
    }))
    .into_response())
}
