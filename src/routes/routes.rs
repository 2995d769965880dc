//! Defines routes for the SEO meta service.
//!
//! ## Structure
//! - **Meta update**
//!   - `POST /rank-math-api/v1/update-meta`: update SEO meta fields of an item
//!
//! - **Generic object API**
//!   - `GET  /wp/v2/{rest_base}/{id}`: read an item with its registered meta
//!   - `POST /wp/v2/{rest_base}/{id}`: write registered meta from a `meta` object
//!
//! - **Probes**
//!   - `GET  /healthz`, `GET /readyz`

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        meta_handlers::update_meta,
        object_handlers::{get_object, update_object},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build and return the router for all routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/rank-math-api/v1/update-meta", post(update_meta))
        .route(
            "/wp/v2/{rest_base}/{id}",
            get(get_object).post(update_object),
        )
        .layer(TraceLayer::new_for_http())
}
