use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState, db, session::CurrentUser};

use super::stripe::{CheckoutArgs, StripeClient};

const MIN_AMOUNT_CENTS: i64 = 100;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCheckoutRequest {
    consultation_id: String,
    amount: i64,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_checkout(
    State(db_pool): State<SqlitePool>,
    State(stripe): State<StripeClient>,
    user: CurrentUser,
    Json(req): Json<CreateCheckoutRequest>,
) -> AppResult<Response> {
    if req.amount < MIN_AMOUNT_CENTS {
        return Err(AppError::Validation(format!(
            "amount must be at least {MIN_AMOUNT_CENTS} cents"
        )));
    }

    let consultation: Option<(String, String, String, String)> = sqlx::query_as(
        "SELECT c.client_id, c.lawyer_id, c.title, u.name \
         FROM consultations c JOIN users u ON u.id = c.lawyer_id \
         WHERE c.id = ?",
    )
    .bind(&req.consultation_id)
    .fetch_optional(&db_pool)
    .await?;
    let Some((client_id, lawyer_id, title, lawyer_name)) = consultation else {
        return Err(AppError::NotFound("consultation"));
    };
    if client_id != user.id {
        return Err(AppError::Forbidden);
    }

    let session = stripe
        .create_checkout_session(&CheckoutArgs {
            consultation_id: &req.consultation_id,
            client_id: &client_id,
            lawyer_id: &lawyer_id,
            lawyer_name: &lawyer_name,
            title: &title,
            amount_cents: req.amount,
        })
        .await?;

    let payment_id = Uuid::now_v7().to_string();
    let created_at = db::now();
    sqlx::query(
        "INSERT INTO payments \
         (id,user_id,consultation_id,amount,currency,status,stripe_session_id,created_at) \
         VALUES (?,?,?,?,'BRL','PENDING',?,?)",
    )
    .bind(&payment_id)
    .bind(&user.id)
    .bind(&req.consultation_id)
    .bind(req.amount)
    .bind(&session.id)
    .bind(created_at)
    .execute(&db_pool)
    .await?;

    tracing::info!(payment_id = %payment_id, "checkout session created");

    Ok(Json(json!({
        "success": true,
        "sessionUrl": session.url,
        "payment": {
            "id": payment_id,
            "userId": user.id,
            "consultationId": req.consultation_id,
            "amount": req.amount,
            "currency": "BRL",
            "status": "PENDING",
            "stripeSessionId": session.id,
            "createdAt": db::rfc3339(created_at),
        },
    }))
    .into_response())
}
