//! Appointment endpoints.
//!
//! All state changes go through `AppointmentLifecycle`; handlers only parse,
//! delegate and shape the response.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AppointmentPatch};
use crate::models::{Appointment, AppointmentFilter};
use crate::scheduling::AppointmentSubmission;

/// `GET /api/appointments`: filtered listing, ordered by date and time.
pub async fn list(
    State(ctx): State<ApiContext>,
    filter: Result<Query<AppointmentFilter>, QueryRejection>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let Query(filter) = filter?;
    let store = ctx.core.open_store()?;
    let appointments = ctx.core.lifecycle(&store).list(&filter)?;
    Ok(Json(appointments))
}

/// `GET /api/appointments/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let store = ctx.core.open_store()?;
    Ok(Json(ctx.core.lifecycle(&store).get(id)?))
}

/// `POST /api/appointments`: 201 with the stored appointment, 409 when the slot is gone.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AppointmentSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let Json(submission) = payload?;
    let store = ctx.core.open_store()?;
    let manager = ctx.core.lifecycle(&store);

    let input = manager.validate(&submission, ctx.core.today())?;
    let created = manager.create(&input)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/appointments/:id`: merge over the stored record, then validate.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    payload: Result<Json<AppointmentPatch>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let Json(patch) = payload?;
    let store = ctx.core.open_store()?;
    let manager = ctx.core.lifecycle(&store);

    // Terminal appointments are refused before their (usually past) date is validated
    let current = manager.get_editable(id)?;
    let input = manager.validate(&patch.merge_over(&current), ctx.core.today())?;
    Ok(Json(manager.update(id, &input)?))
}

/// `POST /api/appointments/:id/cancel`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let store = ctx.core.open_store()?;
    Ok(Json(ctx.core.lifecycle(&store).cancel(id)?))
}

/// `POST /api/appointments/:id/complete`
pub async fn complete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let store = ctx.core.open_store()?;
    Ok(Json(ctx.core.lifecycle(&store).complete(id)?))
}

/// `DELETE /api/appointments/:id`: 204, from any status.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let store = ctx.core.open_store()?;
    ctx.core.lifecycle(&store).delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
