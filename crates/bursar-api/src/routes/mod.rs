//! # Route Assembly
//!
//! Three routers sharing [`AppState`]:
//!
//! - [`catalog`] — fee components and class fee structures
//! - [`fees`] — assignments, discounts, payments, audit trail
//! - [`reports`] — read-only fee status report

pub mod catalog;
pub mod fees;
pub mod reports;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(fees::router())
        .merge(reports::router())
}
