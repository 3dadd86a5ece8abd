use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use oauth2::{
    AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, Scope, TokenResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    AppResult, AppState, GetField,
    db::{self, Role},
    notifications,
    session::{self, CALLBACK_URL, CSRF_STATE, PKCE_VERIFIER},
};

use super::{Clients, Provider};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthorizeQuery {
    callback_url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct CallbackQuery {
    state: Option<String>,
    code: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn authorize(
    Path(provider): Path<Provider>,
    Query(AuthorizeQuery { callback_url }): Query<AuthorizeQuery>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<Response> {
    let client = clients.get(provider)?;

    let (pkce_code_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let mut request = client
        .authorize_url(CsrfToken::new_random)
        .set_pkce_challenge(pkce_code_challenge);
    for scope in provider.scopes() {
        request = request.add_scope(Scope::new((*scope).to_owned()));
    }
    let (authorize_url, csrf_state) = request.url();

    session.insert(CSRF_STATE, csrf_state.secret()).await?;
    session.insert(PKCE_VERIFIER, pkce_verifier.secret()).await?;
    if let Some(callback_url) = callback_url {
        session.insert(CALLBACK_URL, callback_url).await?;
    }

    Ok(Redirect::to(authorize_url.as_str()).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn callback(
    Path(provider): Path<Provider>,
    Query(CallbackQuery { state, code }): Query<CallbackQuery>,
    State(db_pool): State<SqlitePool>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let state = CsrfToken::new(state.ok_or("OAuth: without state")?);
    let code = AuthorizationCode::new(code.ok_or("OAuth: without code")?);

    let Some(stored_state) = session.get::<String>(CSRF_STATE).await? else {
        return Err("no csrf_state")?;
    };
    if state.secret().as_str() != stored_state.as_str() {
        return Err("csrf tokens don't match")?;
    }

    let Some(pkce_verifier) = session.get::<String>(PKCE_VERIFIER).await? else {
        return Err("no pkce_verifier")?;
    };

    let client = clients.get(provider)?;
    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let token_result = client
        .exchange_code(code)
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(&http_client)
        .await?;

    let access_token = token_result.access_token().secret();
    let userinfo: serde_json::Value = http_client
        .get(provider.userinfo_url())
        .bearer_auth(access_token)
        .send()
        .await?
        .json()
        .await?;

    let account_id = userinfo.get_str_field("id")?;
    let (user_id, role) = find_or_provision(&db_pool, provider, &account_id, &userinfo).await?;

    session::establish(&session, &user_id, role).await?;

    let callback_url: Option<String> = session.get(CALLBACK_URL).await?;
    Ok(Redirect::to(post_login_target(callback_url.as_deref())))
}

/// The stashed callback comes from a query parameter; only same-site paths
/// are honored, anything absolute or protocol-relative falls back to the
/// dashboard.
fn post_login_target(callback_url: Option<&str>) -> &str {
    match callback_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url,
        _ => "/dashboard",
    }
}

/// First sight of a provider identity creates a verified user, its client
/// profile, the linked account and a one-time welcome notification, all in
/// one transaction. A user already holding the email gets the account linked
/// instead of a duplicate.
async fn find_or_provision(
    db_pool: &SqlitePool,
    provider: Provider,
    account_id: &str,
    userinfo: &serde_json::Value,
) -> AppResult<(String, Role)> {
    let linked: Option<(String, Role)> = sqlx::query_as(
        "SELECT u.id, u.role FROM users u \
         JOIN oauth_accounts a ON a.user_id = u.id \
         WHERE a.provider=? AND a.provider_account_id=?",
    )
    .bind(provider.as_str())
    .bind(account_id)
    .fetch_optional(db_pool)
    .await?;
    if let Some(found) = linked {
        return Ok(found);
    }

    let name = userinfo
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("Nameless User")
        .to_owned();
    let email = userinfo
        .get("email")
        .and_then(|v| v.as_str())
        .map(super::normalize_email)
        .unwrap_or_else(|| format!("{account_id}@{provider}.oauth.invalid"));
    let avatar = userinfo.get("picture").and_then(|v| v.as_str());

    let mut tx = db_pool.begin().await?;

    let existing: Option<(String, Role)> = sqlx::query_as("SELECT id,role FROM users WHERE email=?")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;

    let (user_id, role, is_new) = match existing {
        Some((id, role)) => (id, role, false),
        None => {
            let id = Uuid::now_v7().to_string();
            sqlx::query(
                "INSERT INTO users (id,name,email,role,verified,avatar,created_at) \
                 VALUES (?,?,?,?,1,?,?)",
            )
            .bind(&id)
            .bind(&name)
            .bind(&email)
            .bind(Role::Client)
            .bind(avatar)
            .bind(db::now())
            .execute(&mut *tx)
            .await?;
            sqlx::query("INSERT INTO client_profiles (user_id) VALUES (?)")
                .bind(&id)
                .execute(&mut *tx)
                .await?;
            (id, Role::Client, true)
        }
    };

    sqlx::query(
        "INSERT INTO oauth_accounts (id,user_id,provider,provider_account_id) VALUES (?,?,?,?)",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(&user_id)
    .bind(provider.as_str())
    .bind(account_id)
    .execute(&mut *tx)
    .await?;

    if is_new {
        notifications::insert(
            &mut *tx,
            &user_id,
            "Welcome to LawLink!",
            "Your account was created successfully. Complete your profile to get started.",
            notifications::Kind::Success,
            None,
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(%user_id, %provider, "oauth sign-in");
    Ok((user_id, role))
}

#[cfg(test)]
mod tests {
    use super::post_login_target;

    #[test]
    fn same_site_paths_are_honored() {
        assert_eq!(post_login_target(Some("/lawyer/ana@example.com")), "/lawyer/ana@example.com");
        assert_eq!(post_login_target(Some("/")), "/");
    }

    #[test]
    fn offsite_callbacks_fall_back_to_dashboard() {
        assert_eq!(post_login_target(Some("https://evil.example")), "/dashboard");
        assert_eq!(post_login_target(Some("//evil.example")), "/dashboard");
        assert_eq!(post_login_target(Some("javascript:alert(1)")), "/dashboard");
        assert_eq!(post_login_target(None), "/dashboard");
    }
}
