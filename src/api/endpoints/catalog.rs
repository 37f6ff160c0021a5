//! Catalog endpoints, shared by `/professionals`, `/clients` and `/services`.
//!
//! Each handler is generic over the catalog input type; the router picks the
//! concrete type per path.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::catalog::{self, CatalogInput};

/// `GET /api/{entity}`
pub async fn list<I>(State(ctx): State<ApiContext>) -> Result<Json<Vec<I::Record>>, ApiError>
where
    I: CatalogInput,
    I::Record: Serialize,
{
    let store = ctx.core.open_store()?;
    Ok(Json(catalog::list::<I::Record, _>(&store)?))
}

/// `GET /api/{entity}/:id`
pub async fn detail<I>(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<I::Record>, ApiError>
where
    I: CatalogInput,
    I::Record: Serialize,
{
    let store = ctx.core.open_store()?;
    Ok(Json(catalog::get::<I::Record, _>(&store, id)?))
}

/// `POST /api/{entity}`: 201 with the stored record.
pub async fn create<I>(
    State(ctx): State<ApiContext>,
    payload: Result<Json<I>, JsonRejection>,
) -> Result<(StatusCode, Json<I::Record>), ApiError>
where
    I: CatalogInput + DeserializeOwned,
    I::Record: Serialize,
{
    let Json(input) = payload?;
    let store = ctx.core.open_store()?;
    let saved = catalog::create(&store, &input, ctx.core.today())?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// `PUT /api/{entity}/:id`: full replace of the editable fields.
pub async fn update<I>(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    payload: Result<Json<I>, JsonRejection>,
) -> Result<Json<I::Record>, ApiError>
where
    I: CatalogInput + DeserializeOwned,
    I::Record: Serialize,
{
    let Json(input) = payload?;
    let store = ctx.core.open_store()?;
    Ok(Json(catalog::update(&store, id, &input, ctx.core.today())?))
}

/// `DELETE /api/{entity}/:id`: 204.
pub async fn remove<I>(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
    I: CatalogInput,
{
    let store = ctx.core.open_store()?;
    catalog::delete::<I::Record, _>(&store, id)?;
    Ok(StatusCode::NO_CONTENT)
}
