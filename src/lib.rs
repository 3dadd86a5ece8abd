pub mod appresult;
pub mod auth;
pub mod cases;
pub mod config;
pub mod consultations;
pub mod dashboard;
pub mod db;
pub mod email;
pub mod events;
pub mod gate;
pub mod lawyers;
pub mod messages;
pub mod notifications;
pub mod pages;
pub mod payments;
pub mod session;

pub use appresult::{AppError, AppResult};

use axum::{Router, extract::FromRef, middleware, routing::get};
use serde_json::Value;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub clients: auth::Clients,
    pub stripe: payments::StripeClient,
    pub mailer: email::Mailer,
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
}

impl GetField for Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(self
            .get(field)
            .ok_or(format!("expected {field} in response"))?
            .as_str()
            .ok_or(format!("expected {field} to be a string"))?
            .to_owned())
    }
}

/// The full application router, session layer included. Integration tests
/// drive this directly with `tower::ServiceExt::oneshot`.
pub fn app(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(8)));

    let api = Router::new()
        .merge(auth::router())
        .merge(lawyers::router())
        .merge(consultations::router())
        .merge(messages::router())
        .merge(notifications::router())
        .merge(payments::router())
        .merge(cases::router())
        .merge(events::router())
        .merge(dashboard::router());

    Router::new()
        .route("/", get(pages::landing))
        .route("/login", get(pages::login_page))
        .route("/register", get(pages::register_page))
        .route("/dashboard", get(pages::dashboard))
        .merge(auth::oauth_router())
        .nest("/api", api)
        .with_state(state)
        .layer(middleware::from_fn(gate::gate))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
