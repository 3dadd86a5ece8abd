use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::{AppError, AppResult, db::Role};

pub const USER_ID: &str = "user_id";
pub const USER_ROLE: &str = "user_role";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const CALLBACK_URL: &str = "callback_url";

/// The authenticated caller, pulled out of the session. Extraction fails
/// with 401 when no session identity is present.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::Error::msg(msg)))?;

        let Some(id) = session.get::<String>(USER_ID).await? else {
            return Err(AppError::Unauthenticated);
        };
        let Some(role) = session.get::<Role>(USER_ROLE).await? else {
            return Err(AppError::Unauthenticated);
        };

        Ok(CurrentUser { id, role })
    }
}

pub async fn establish(session: &Session, user_id: &str, role: Role) -> AppResult<()> {
    session.insert(USER_ID, user_id).await?;
    session.insert(USER_ROLE, role).await?;
    Ok(())
}
