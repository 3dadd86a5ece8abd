mod client;
mod lawyer;

use axum::{Router, routing::get};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/client/dashboard", get(client::dashboard))
        .route("/lawyer/dashboard", get(lawyer::dashboard))
}
