use axum::{
    Json, debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{AppResult, db, session::CurrentUser};

use super::Kind;

const PAGE_SIZE: i64 = 20;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListNotificationsQuery {
    #[serde(default)]
    unread_only: bool,
}

#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Response> {
    let sql = if query.unread_only {
        "SELECT id,title,content,kind,link,read,created_at FROM notifications \
         WHERE user_id=? AND read=0 ORDER BY created_at DESC, id DESC LIMIT ?"
    } else {
        "SELECT id,title,content,kind,link,read,created_at FROM notifications \
         WHERE user_id=? ORDER BY created_at DESC, id DESC LIMIT ?"
    };

    let rows: Vec<(String, String, String, Kind, Option<String>, bool, i64)> =
        sqlx::query_as(sql)
            .bind(&user.id)
            .bind(PAGE_SIZE)
            .fetch_all(&db_pool)
            .await?;

    let notifications: Vec<_> = rows
        .into_iter()
        .map(|(id, title, content, kind, link, read, created_at)| {
            json!({
                "id": id,
                "userId": user.id.clone(),
                "title": title,
                "content": content,
                "type": kind,
                "link": link,
                "read": read,
                "createdAt": db::rfc3339(created_at),
            })
        })
        .collect();

    Ok(Json(json!({ "success": true, "notifications": notifications })).into_response())
}
