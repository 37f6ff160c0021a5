//! REST API.
//!
//! Exposes the scheduling core and the catalog as JSON endpoints nested
//! under `/api/`. The router is composable: `api_router()` returns a
//! `Router` that can be mounted on any axum server instance, and
//! `ApiServer` runs it with graceful shutdown.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{ApiServer, ApiSession, ServerError};
pub use types::ApiContext;
