mod clients;
mod login;
mod logout;
mod oauth;
mod register;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Router,
    routing::{get, post},
};

pub use clients::{Clients, Provider};

use crate::{AppResult, AppState};

/// JSON auth endpoints, mounted under /api.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register::register))
        .route("/auth/login", post(login::login))
}

/// Browser-facing OAuth flow plus logout, mounted at the root.
pub fn oauth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", get(logout::logout))
        .route("/auth/{provider}", get(oauth::authorize))
        .route("/auth/{provider}/callback", get(oauth::callback))
}

/// Duplicate detection and login lookups both run on this form.
/// Rule: trim surrounding whitespace, lowercase the whole address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("password hashing failed: {err}"))?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization_is_trim_plus_lowercase() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
        assert_eq!(
            normalize_email("ana@example.com"),
            normalize_email("ANA@EXAMPLE.COM")
        );
    }

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong", &hash));
        assert_ne!(hash, "correct horse battery");
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
