mod book;

use axum::{Router, routing::post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/consultations/book", post(book::book))
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// collide iff each starts before the other ends. Back-to-back slots
/// (`a_end == b_start`) do not collide.
pub fn overlaps(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start < b_end && a_end > b_start
}
