//! Dashboard summary and appointment reports.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ReportResponse};
use crate::models::AppointmentFilter;
use crate::scheduling::{filter_appointments, summarize, validate_filter, StatusCounts, Summary};

/// `GET /api/reports/summary`
pub async fn summary(State(ctx): State<ApiContext>) -> Result<Json<Summary>, ApiError> {
    let store = ctx.core.open_store()?;
    Ok(Json(summarize(&store, ctx.core.today())?))
}

/// `GET /api/reports/appointments`: filtered listing with per-status counts.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    filter: Result<Query<AppointmentFilter>, QueryRejection>,
) -> Result<Json<ReportResponse>, ApiError> {
    let Query(filter) = filter?;
    validate_filter(&filter)?;

    let store = ctx.core.open_store()?;
    let appointments = filter_appointments(&store, &filter)?;
    Ok(Json(ReportResponse {
        counts: StatusCounts::tally(&appointments),
        appointments,
    }))
}
