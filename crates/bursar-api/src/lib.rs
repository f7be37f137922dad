//! # bursar-api — Axum HTTP Surface
//!
//! The HTTP layer over the fee engine, built on Axum/Tower/Tokio.
//! Assembles the catalog, fee, and report routers into a single
//! application with shared tracing and CORS middleware.
//!
//! ## Routers
//!
//! - `/fee-components/*` — fee catalog components
//! - `/fees/*` — structures, assignments, discounts, payments, reports
//! - `/health` — liveness probe (unauthenticated)
//!
//! ## Actor Context
//!
//! Authentication lives upstream. Every fee route expects the resolved
//! identity as headers (`x-tenant-id`, `x-actor-id`, `x-actor-role`),
//! extracted by [`extractors::Actor`]; the engine consumes the role, it
//! never resolves it.
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — they deserialize, delegate to
//!   `bursar-ledger`, and serialize.
//! - All errors map to structured HTTP responses via [`AppError`].
//! - Monetary fields in request and response bodies are decimal strings
//!   with exactly two fraction digits.

pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full application router around shared state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
