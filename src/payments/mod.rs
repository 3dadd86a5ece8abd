mod checkout;
mod stripe;
mod webhook;

use axum::{Router, routing::post};

pub use stripe::StripeClient;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments/create-checkout", post(checkout::create_checkout))
        // confirmation path, must stay reachable without a session
        .route("/payments/webhook", post(webhook::webhook))
}
