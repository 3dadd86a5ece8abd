use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState,
    db::{self, Role},
    email::{self, Mailer},
};

use super::{hash_password, normalize_email};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    confirm_password: String,
    role: Option<Role>,
    phone: Option<String>,
    // lawyer-only fields
    license_number: Option<String>,
    license_state: Option<String>,
    #[serde(default)]
    specialties: Vec<String>,
    biography: Option<String>,
    education: Option<String>,
    experience: Option<String>,
    office_address: Option<String>,
    office_phone: Option<String>,
    consultation_fee: Option<f64>,
}

impl RegisterRequest {
    fn role(&self) -> Role {
        self.role.unwrap_or(Role::Client)
    }
}

/// First failing rule wins; the order is part of the contract.
fn validate(req: &RegisterRequest) -> Result<(), String> {
    if req.name.trim().len() < 2 {
        return Err("name must be at least 2 characters".to_owned());
    }
    if !is_valid_email(req.email.trim()) {
        return Err("invalid email".to_owned());
    }
    if req.password.len() < 8 {
        return Err("password must be at least 8 characters".to_owned());
    }
    if req.password != req.confirm_password {
        return Err("passwords do not match".to_owned());
    }
    if req.role() == Role::Lawyer {
        let has_credentials = req.license_number.as_deref().is_some_and(|s| !s.is_empty())
            && req.license_state.as_deref().is_some_and(|s| !s.is_empty())
            && !req.specialties.is_empty();
        if !has_credentials {
            return Err(
                "license number, license state and at least one specialty are required for lawyers"
                    .to_owned(),
            );
        }
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    State(mailer): State<Mailer>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    validate(&req).map_err(AppError::Validation)?;

    let email = normalize_email(&req.email);
    let taken: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email=?")
        .bind(&email)
        .fetch_optional(&db_pool)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("email already registered".to_owned()));
    }

    let role = req.role();
    let user_id = Uuid::now_v7().to_string();
    let password_hash = hash_password(&req.password)?;
    let created_at = db::now();

    // User plus role profile is one atomic unit; a user without a profile
    // must never be observable.
    let mut tx = db_pool.begin().await?;
    sqlx::query(
        "INSERT INTO users (id,name,email,password_hash,role,verified,phone,created_at) \
         VALUES (?,?,?,?,?,0,?,?)",
    )
    .bind(&user_id)
    .bind(req.name.trim())
    .bind(&email)
    .bind(&password_hash)
    .bind(role)
    .bind(&req.phone)
    .bind(created_at)
    .execute(&mut *tx)
    .await?;

    match role {
        Role::Lawyer => {
            sqlx::query(
                "INSERT INTO lawyer_profiles \
                 (user_id,license_number,license_state,specialties,biography,education,\
                  experience,office_address,office_phone,consultation_fee) \
                 VALUES (?,?,?,?,?,?,?,?,?,?)",
            )
            .bind(&user_id)
            .bind(&req.license_number)
            .bind(&req.license_state)
            .bind(serde_json::to_string(&req.specialties)?)
            .bind(&req.biography)
            .bind(&req.education)
            .bind(&req.experience)
            .bind(&req.office_address)
            .bind(&req.office_phone)
            .bind(req.consultation_fee)
            .execute(&mut *tx)
            .await?;
        }
        Role::Client => {
            sqlx::query("INSERT INTO client_profiles (user_id) VALUES (?)")
                .bind(&user_id)
                .execute(&mut *tx)
                .await?;
        }
    }
    tx.commit().await?;

    tracing::info!(%user_id, ?role, "registered new user");

    let name = req.name.trim().to_owned();
    email::spawn_send(async move { mailer.send_welcome(&email, &name, role).await });

    Ok(Json(json!({
        "success": true,
        "user": {
            "id": user_id,
            "name": req.name.trim(),
            "email": normalize_email(&req.email),
            "role": role,
            "createdAt": db::rfc3339(created_at),
        },
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RegisterRequest {
        RegisterRequest {
            name: "Ana Souza".to_owned(),
            email: "ana@example.com".to_owned(),
            password: "hunter2hunter2".to_owned(),
            confirm_password: "hunter2hunter2".to_owned(),
            role: None,
            phone: None,
            license_number: None,
            license_state: None,
            specialties: vec![],
            biography: None,
            education: None,
            experience: None,
            office_address: None,
            office_phone: None,
            consultation_fee: None,
        }
    }

    fn lawyer() -> RegisterRequest {
        RegisterRequest {
            role: Some(Role::Lawyer),
            license_number: Some("123456".to_owned()),
            license_state: Some("SP".to_owned()),
            specialties: vec!["immigration".to_owned()],
            ..base()
        }
    }

    #[test]
    fn valid_client_passes() {
        assert!(validate(&base()).is_ok());
    }

    #[test]
    fn valid_lawyer_passes() {
        assert!(validate(&lawyer()).is_ok());
    }

    #[test]
    fn short_name_fails_first() {
        let mut req = base();
        req.name = "A".to_owned();
        req.password = "short".to_owned(); // later rule also broken
        assert_eq!(
            validate(&req).unwrap_err(),
            "name must be at least 2 characters"
        );
    }

    #[test]
    fn malformed_emails_fail() {
        for email in ["plain", "@no-local.com", "no-domain@", "a@b", "a b@c.com"] {
            let mut req = base();
            req.email = email.to_owned();
            assert_eq!(validate(&req).unwrap_err(), "invalid email", "{email}");
        }
    }

    #[test]
    fn short_password_fails() {
        let mut req = base();
        req.password = "seven77".to_owned();
        req.confirm_password = "seven77".to_owned();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn mismatched_confirmation_fails() {
        let mut req = base();
        req.confirm_password = "different-password".to_owned();
        assert_eq!(validate(&req).unwrap_err(), "passwords do not match");
    }

    #[test]
    fn lawyer_missing_any_credential_fails() {
        let mut req = lawyer();
        req.license_number = None;
        assert!(validate(&req).is_err());

        let mut req = lawyer();
        req.license_state = None;
        assert!(validate(&req).is_err());

        let mut req = lawyer();
        req.specialties.clear();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn client_needs_no_credentials() {
        let mut req = base();
        req.role = Some(Role::Client);
        assert!(validate(&req).is_ok());
    }
}
