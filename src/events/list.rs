use std::collections::BTreeMap;

use axum::{
    Json, debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::{OffsetDateTime, macros::format_description};

use crate::{AppResult, db, session::CurrentUser};

const PAGE_SIZE: i64 = 100;
const DEFAULT_DAYS: i64 = 7;
const MAX_DAYS: i64 = 3650;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListEventsQuery {
    event_type: Option<String>,
    days: Option<i64>,
}

#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<Response> {
    // clamp before multiplying; an unchecked caller-supplied value overflows
    let days = query.days.unwrap_or(DEFAULT_DAYS).clamp(0, MAX_DAYS);
    let since = db::now() - days * 86_400;

    let rows: Vec<(String, String, String, String, i64)> = match &query.event_type {
        Some(event_type) => {
            sqlx::query_as(
                "SELECT id,event_name,event_type,metadata,created_at FROM events \
                 WHERE user_id=? AND created_at>=? AND event_type=? \
                 ORDER BY created_at DESC, id DESC LIMIT ?",
            )
            .bind(&user.id)
            .bind(since)
            .bind(event_type)
            .bind(PAGE_SIZE)
            .fetch_all(&db_pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id,event_name,event_type,metadata,created_at FROM events \
                 WHERE user_id=? AND created_at>=? \
                 ORDER BY created_at DESC, id DESC LIMIT ?",
            )
            .bind(&user.id)
            .bind(since)
            .bind(PAGE_SIZE)
            .fetch_all(&db_pool)
            .await?
        }
    };

    let mut events_by_type: BTreeMap<String, i64> = BTreeMap::new();
    let mut events_per_day: BTreeMap<String, i64> = BTreeMap::new();
    let date_format = format_description!("[year]-[month]-[day]");

    let events: Vec<_> = rows
        .into_iter()
        .map(|(id, event_name, event_type, metadata, created_at)| {
            *events_by_type.entry(event_type.clone()).or_default() += 1;
            if let Ok(t) = OffsetDateTime::from_unix_timestamp(created_at) {
                if let Ok(day) = t.date().format(&date_format) {
                    *events_per_day.entry(day).or_default() += 1;
                }
            }
            json!({
                "id": id,
                "eventName": event_name,
                "eventType": event_type,
                "metadata": serde_json::from_str::<serde_json::Value>(&metadata)
                    .unwrap_or_else(|_| json!({})),
                "createdAt": db::rfc3339(created_at),
            })
        })
        .collect();

    let total_events = events.len();
    Ok(Json(json!({
        "success": true,
        "events": events,
        "stats": {
            "totalEvents": total_events,
            "eventsByType": events_by_type,
            "eventsPerDay": events_per_day,
        },
    }))
    .into_response())
}
