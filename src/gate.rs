use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::session::USER_ID;

/// Paths (and everything under them) reachable without a session. The JSON
/// API under /api enforces its own per-handler check, which also keeps the
/// Stripe webhook reachable unauthenticated.
const PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/register",
    "/auth",
    "/api",
    "/assets",
    "/favicon.ico",
];

/// Auth entry points: an already-authenticated visitor is sent to the
/// dashboard instead of being shown a login form again.
const AUTH_ENTRY: &[&str] = &["/login", "/register"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Allow,
    ToLogin { callback: String },
    ToDashboard,
}

/// Pure per-request decision over (path, token-validity).
pub fn decide(path: &str, authed: bool) -> Gate {
    if AUTH_ENTRY.contains(&path) {
        return if authed { Gate::ToDashboard } else { Gate::Allow };
    }

    let public = path == "/"
        || PUBLIC_PREFIXES.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        });
    if public {
        return Gate::Allow;
    }

    if authed {
        Gate::Allow
    } else {
        Gate::ToLogin {
            callback: path.to_owned(),
        }
    }
}

pub async fn gate(session: Session, req: Request, next: Next) -> Response {
    let authed = session
        .get::<String>(USER_ID)
        .await
        .ok()
        .flatten()
        .is_some();

    match decide(req.uri().path(), authed) {
        Gate::Allow => next.run(req).await,
        Gate::ToDashboard => Redirect::to("/dashboard").into_response(),
        Gate::ToLogin { callback } => {
            Redirect::to(&format!("/login?callbackUrl={}", urlencoding::encode(&callback)))
                .into_response()
        }
    }
}
