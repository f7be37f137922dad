//! # Report Routes
//!
//! Routes:
//! - GET /fees/report — fee status rows for a year, optionally narrowed
//!   to one class and/or one status

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use bursar_core::FeeStatus;
use bursar_ledger::report::{self, FeeReportRow};

use crate::error::AppError;
use crate::extractors::Actor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/fees/report", get(fee_report))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub academic_year_id: Uuid,
    pub class_id: Option<Uuid>,
    pub fee_status: Option<FeeStatus>,
}

async fn fee_report(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<FeeReportRow>>, AppError> {
    let conn = state.db.lock();
    let rows = report::report(
        &conn,
        actor.0.tenant,
        query.academic_year_id.into(),
        query.class_id.map(Into::into),
        query.fee_status,
    )?;
    Ok(Json(rows))
}
