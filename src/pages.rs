use axum::{
    debug_handler,
    response::{Html, IntoResponse, Redirect},
};

use crate::{db::Role, session::CurrentUser};

#[debug_handler]
pub async fn landing() -> impl IntoResponse {
    Html(include_str!("../pages/index.html"))
}

#[debug_handler]
pub async fn login_page() -> impl IntoResponse {
    Html(include_str!("../pages/login.html"))
}

#[debug_handler]
pub async fn register_page() -> impl IntoResponse {
    Html(include_str!("../pages/register.html"))
}

/// Role-aware dashboard entry; the gate guarantees a session here.
#[debug_handler]
pub async fn dashboard(user: CurrentUser) -> Redirect {
    match user.role {
        Role::Client => Redirect::to("/api/client/dashboard"),
        Role::Lawyer => Redirect::to("/api/lawyer/dashboard"),
    }
}
