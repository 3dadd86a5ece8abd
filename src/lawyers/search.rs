use axum::{
    Json, debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{AppError, AppResult};

use super::{LAWYER_COLUMNS, LawyerDto, LawyerRow};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchQuery {
    specialty: Option<String>,
    min_rating: Option<f64>,
    max_price: Option<f64>,
    state: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

/// One field per supported filter; all present filters apply conjunctively.
struct LawyerFilters {
    specialty: Option<String>,
    min_rating: Option<f64>,
    max_price: Option<f64>,
    state: Option<String>,
}

impl LawyerFilters {
    fn from_query(q: &SearchQuery) -> Result<LawyerFilters, String> {
        if let Some(r) = q.min_rating {
            if !(0.0..=5.0).contains(&r) {
                return Err("minRating must be between 0 and 5".to_owned());
            }
        }
        if let Some(p) = q.max_price {
            if p < 0.0 {
                return Err("maxPrice must not be negative".to_owned());
            }
        }
        Ok(LawyerFilters {
            specialty: q.specialty.clone().filter(|s| !s.is_empty()),
            min_rating: q.min_rating.filter(|r| *r > 0.0),
            max_price: q.max_price,
            state: q.state.clone().filter(|s| !s.is_empty()),
        })
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(specialty) = &self.specialty {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(lp.specialties) WHERE json_each.value = ");
            qb.push_bind(specialty.clone());
            qb.push(")");
        }
        if let Some(min_rating) = self.min_rating {
            qb.push(" AND lp.rating >= ");
            qb.push_bind(min_rating);
        }
        if let Some(max_price) = self.max_price {
            qb.push(" AND lp.consultation_fee <= ");
            qb.push_bind(max_price);
        }
        if let Some(state) = &self.state {
            qb.push(" AND lp.license_state = ");
            qb.push_bind(state.clone());
        }
    }
}

pub(crate) fn total_pages(total: i64, limit: i64) -> i64 {
    if total == 0 { 0 } else { (total + limit - 1) / limit }
}

#[debug_handler]
pub(crate) async fn search(
    State(db_pool): State<SqlitePool>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Response> {
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("page must be at least 1".to_owned()));
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let filters = LawyerFilters::from_query(&query).map_err(AppError::Validation)?;

    let mut count_qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "SELECT COUNT(*) FROM lawyer_profiles lp \
         JOIN users u ON u.id = lp.user_id WHERE u.role = 'LAWYER'",
    );
    filters.push_where(&mut count_qb);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&db_pool).await?;

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
        "SELECT {LAWYER_COLUMNS} FROM lawyer_profiles lp \
         JOIN users u ON u.id = lp.user_id WHERE u.role = 'LAWYER'"
    ));
    filters.push_where(&mut qb);
    qb.push(" ORDER BY lp.rating DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind((page - 1) * limit);

    let rows: Vec<LawyerRow> = qb.build_query_as().fetch_all(&db_pool).await?;
    let lawyers: Vec<LawyerDto> = rows.into_iter().map(Into::into).collect();

    Ok(Json(json!({
        "success": true,
        "lawyers": lawyers,
        "total": total,
        "page": page,
        "limit": limit,
        "totalPages": total_pages(total, limit),
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceil() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(50, 7), 8);
    }
}
