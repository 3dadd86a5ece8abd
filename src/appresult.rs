use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// Request failure taxonomy. Everything except `Internal` is surfaced to the
/// caller verbatim; `Internal` is logged and collapsed to a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("access denied")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid credentials".to_owned())
            }
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "not authenticated".to_owned())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "access denied".to_owned()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self::Internal(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self::Internal(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! internal_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

internal_impl!(serde_json::Error);
internal_impl!(sqlx::Error);
internal_impl!(tower_sessions::session::Error);
internal_impl!(axum::Error);
internal_impl!(reqwest::Error);
internal_impl!(time::error::Format);
internal_impl!(time::error::ComponentRange);

impl<E: core::error::Error + Send + Sync + 'static, R: oauth2::ErrorResponse + Send + Sync + 'static>
    From<oauth2::RequestTokenError<E, R>> for AppError
{
    fn from(err: oauth2::RequestTokenError<E, R>) -> Self {
        Self::Internal(anyhow::Error::from(err))
    }
}
