//! Free-slot listing.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SlotsQuery};
use crate::db::EntityStore;
use crate::models::Professional;
use crate::scheduling::{SlotCalculator, ValidationErrors};

/// `GET /api/professionals/:id/slots?date=YYYY-MM-DD`: free `HH:MM` labels, ascending.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(professional_id): Path<i64>,
    query: Result<Query<SlotsQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let Query(query) = query?;
    let date = parse_date(query.date.as_deref())?;

    let store = ctx.core.open_store()?;
    if store.get::<Professional>(professional_id)?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Professional {professional_id} not found"
        )));
    }

    let calculator = SlotCalculator::new(ctx.core.config().working_hours);
    let free = calculator.free_slots(&store, professional_id, date)?;
    Ok(Json(free.iter().map(ToString::to_string).collect()))
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, ValidationErrors> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Err(ValidationErrors::single("date", "Date is required")),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            ValidationErrors::single("date", "Invalid date. Use the YYYY-MM-DD format")
        }),
    }
}
