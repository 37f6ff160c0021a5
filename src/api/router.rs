//! API router.
//!
//! Returns a composable `Router` with every endpoint nested under `/api/`.
//! Outer layers: permissive CORS for the browser UI and `Cache-Control:
//! no-store` on every response.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints::{self, catalog};
use crate::api::types::ApiContext;
use crate::catalog::{ClientInput, ProfessionalInput, ServiceInput};
use crate::core_state::CoreState;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail)
                .patch(endpoints::appointments::update)
                .delete(endpoints::appointments::remove),
        )
        .route(
            "/appointments/:id/cancel",
            post(endpoints::appointments::cancel),
        )
        .route(
            "/appointments/:id/complete",
            post(endpoints::appointments::complete),
        )
        .route(
            "/professionals",
            get(catalog::list::<ProfessionalInput>).post(catalog::create::<ProfessionalInput>),
        )
        .route(
            "/professionals/:id",
            get(catalog::detail::<ProfessionalInput>)
                .put(catalog::update::<ProfessionalInput>)
                .delete(catalog::remove::<ProfessionalInput>),
        )
        .route("/professionals/:id/slots", get(endpoints::slots::list))
        .route(
            "/clients",
            get(catalog::list::<ClientInput>).post(catalog::create::<ClientInput>),
        )
        .route(
            "/clients/:id",
            get(catalog::detail::<ClientInput>)
                .put(catalog::update::<ClientInput>)
                .delete(catalog::remove::<ClientInput>),
        )
        .route(
            "/services",
            get(catalog::list::<ServiceInput>).post(catalog::create::<ServiceInput>),
        )
        .route(
            "/services/:id",
            get(catalog::detail::<ServiceInput>)
                .put(catalog::update::<ServiceInput>)
                .delete(catalog::remove::<ServiceInput>),
        )
        .route("/reports/summary", get(endpoints::reports::summary))
        .route(
            "/reports/appointments",
            get(endpoints::reports::appointments),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
}
