mod list;
mod send;

use axum::{
    Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, db};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications/send", post(send::send))
        .route("/notifications", get(list::list))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    Info,
    Success,
    Warning,
    Error,
}

/// Shared by the send endpoint and internal triggers (OAuth welcome);
/// generic over the executor so it can join a caller's transaction.
pub async fn insert<'e, E>(
    db: E,
    user_id: &str,
    title: &str,
    content: &str,
    kind: Kind,
    link: Option<&str>,
) -> Result<String, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let id = Uuid::now_v7().to_string();
    sqlx::query(
        "INSERT INTO notifications (id,user_id,title,content,kind,link,read,created_at) \
         VALUES (?,?,?,?,?,?,0,?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(title)
    .bind(content)
    .bind(kind)
    .bind(link)
    .bind(db::now())
    .execute(db)
    .await?;
    Ok(id)
}
