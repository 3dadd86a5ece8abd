mod page;
mod search;

use axum::{Router, routing::get};
use serde::Serialize;
use sqlx::FromRow;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lawyers/search", get(search::search))
        .route("/lawyer/{slug}", get(page::lawyer))
}

#[derive(FromRow)]
pub(crate) struct LawyerRow {
    user_id: String,
    name: String,
    email: String,
    avatar: Option<String>,
    phone: Option<String>,
    license_number: String,
    license_state: String,
    specialties: String,
    biography: Option<String>,
    consultation_fee: Option<f64>,
    rating: f64,
    review_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LawyerDto {
    user_id: String,
    name: String,
    email: String,
    avatar: Option<String>,
    phone: Option<String>,
    license_number: String,
    license_state: String,
    specialties: Vec<String>,
    biography: Option<String>,
    consultation_fee: Option<f64>,
    rating: f64,
    review_count: i64,
}

impl From<LawyerRow> for LawyerDto {
    fn from(row: LawyerRow) -> LawyerDto {
        LawyerDto {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            avatar: row.avatar,
            phone: row.phone,
            license_number: row.license_number,
            license_state: row.license_state,
            specialties: serde_json::from_str(&row.specialties).unwrap_or_default(),
            biography: row.biography,
            consultation_fee: row.consultation_fee,
            rating: row.rating,
            review_count: row.review_count,
        }
    }
}

pub(crate) const LAWYER_COLUMNS: &str = "lp.user_id, u.name, u.email, u.avatar, u.phone, \
     lp.license_number, lp.license_state, lp.specialties, lp.biography, \
     lp.consultation_fee, lp.rating, lp.review_count";
