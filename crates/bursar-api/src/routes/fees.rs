//! # Fee Ledger Routes
//!
//! Routes:
//! - POST  /fees/assign/{student_id} — assign template fees
//! - POST  /fees/assign-roster — assign template fees to many students
//! - POST  /fees/custom/{student_id} — add a one-off custom fee
//! - GET   /fees/student/{student_id} — student fee view with names
//! - POST  /fees/discount/{assignment_id} — apply a discount
//! - PATCH /fees/discount/{id}/deactivate — deactivate a discount
//! - POST  /fees/pay/{assignment_id} — record a payment
//! - GET   /fees/payment-history/{student_id} — payment history
//! - GET   /fees/audit/{entity_id} — audit trail of one entity

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bursar_core::{DiscountCategory, DiscountKind, Money, PaymentMode, StudentId};
use bursar_ledger::assignment::{self, OptionalComponent};
use bursar_ledger::audit::audit_trail;
use bursar_ledger::discount::{self, NewDiscount};
use bursar_ledger::model::{
    AssignmentDetail, FeeAuditLogEntry, PaymentTransaction, StudentFeeAssignment,
    StudentFeeDiscount,
};
use bursar_ledger::payment::{self, NewPayment};

use crate::error::AppError;
use crate::extractors::Actor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fees/assign/{student_id}", post(assign))
        .route("/fees/assign-roster", post(assign_roster))
        .route("/fees/custom/{student_id}", post(custom_fee))
        .route("/fees/student/{student_id}", get(student_fees))
        .route("/fees/discount/{assignment_id}", post(add_discount))
        .route("/fees/discount/{id}/deactivate", patch(deactivate_discount))
        .route("/fees/pay/{assignment_id}", post(record_payment))
        .route("/fees/payment-history/{student_id}", get(payment_history))
        .route("/fees/audit/{entity_id}", get(audit))
}

#[derive(Debug, Deserialize)]
pub struct OptionalComponentRequest {
    pub class_fee_structure_id: Uuid,
    pub custom_amount: Option<Money>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub academic_year_id: Uuid,
    #[serde(default)]
    pub optional_components: Vec<OptionalComponentRequest>,
}

async fn assign(
    State(state): State<AppState>,
    actor: Actor,
    Path(student_id): Path<Uuid>,
    Json(body): Json<AssignRequest>,
) -> Result<Json<Vec<StudentFeeAssignment>>, AppError> {
    let optional: Vec<OptionalComponent> = body
        .optional_components
        .into_iter()
        .map(|o| OptionalComponent {
            class_fee_structure_id: o.class_fee_structure_id.into(),
            custom_amount: o.custom_amount,
        })
        .collect();
    let mut conn = state.db.lock();
    let assignments = assignment::assign_fees(
        &mut conn,
        state.caps.as_ref(),
        &actor.0,
        student_id.into(),
        body.academic_year_id.into(),
        &optional,
    )?;
    Ok(Json(assignments))
}

#[derive(Debug, Deserialize)]
pub struct RosterRequest {
    pub academic_year_id: Uuid,
    pub student_ids: Vec<Uuid>,
}

/// Per-student outcome in the roster response; one of `assignments` or
/// `error` is present.
#[derive(Debug, Serialize)]
pub struct RosterEntry {
    pub student_id: StudentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<StudentFeeAssignment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn assign_roster(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<RosterRequest>,
) -> Result<(StatusCode, Json<Vec<RosterEntry>>), AppError> {
    let students: Vec<StudentId> = body.student_ids.into_iter().map(Into::into).collect();
    let mut conn = state.db.lock();
    let outcomes = assignment::assign_fees_roster(
        &mut conn,
        state.caps.as_ref(),
        &actor.0,
        body.academic_year_id.into(),
        &students,
    );
    let entries: Vec<RosterEntry> = outcomes
        .into_iter()
        .map(|o| match o.outcome {
            Ok(assignments) => RosterEntry {
                student_id: o.student_id,
                assignments: Some(assignments),
                error: None,
            },
            Err(e) => RosterEntry {
                student_id: o.student_id,
                assignments: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    Ok((StatusCode::MULTI_STATUS, Json(entries)))
}

#[derive(Debug, Deserialize)]
pub struct CustomFeeRequest {
    pub academic_year_id: Uuid,
    pub custom_name: String,
    pub amount: Money,
    pub reason: Option<String>,
}

async fn custom_fee(
    State(state): State<AppState>,
    actor: Actor,
    Path(student_id): Path<Uuid>,
    Json(body): Json<CustomFeeRequest>,
) -> Result<(StatusCode, Json<StudentFeeAssignment>), AppError> {
    let mut conn = state.db.lock();
    let created = assignment::add_custom_fee(
        &mut conn,
        state.caps.as_ref(),
        &actor.0,
        student_id.into(),
        body.academic_year_id.into(),
        &body.custom_name,
        body.amount,
        body.reason.as_deref(),
    )?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct YearFilterQuery {
    pub academic_year_id: Option<Uuid>,
}

async fn student_fees(
    State(state): State<AppState>,
    actor: Actor,
    Path(student_id): Path<Uuid>,
    Query(query): Query<YearFilterQuery>,
) -> Result<Json<Vec<AssignmentDetail>>, AppError> {
    let conn = state.db.lock();
    let fees = assignment::student_fees(
        &conn,
        actor.0.tenant,
        student_id.into(),
        query.academic_year_id.map(Into::into),
    )?;
    Ok(Json(fees))
}

#[derive(Debug, Deserialize)]
pub struct DiscountRequest {
    pub discount_name: String,
    pub category: DiscountCategory,
    #[serde(flatten)]
    pub kind: DiscountKind,
    pub reason: Option<String>,
}

async fn add_discount(
    State(state): State<AppState>,
    actor: Actor,
    Path(assignment_id): Path<Uuid>,
    Json(body): Json<DiscountRequest>,
) -> Result<(StatusCode, Json<StudentFeeDiscount>), AppError> {
    let mut conn = state.db.lock();
    let created = discount::add_discount(
        &mut conn,
        state.caps.as_ref(),
        &actor.0,
        assignment_id.into(),
        NewDiscount {
            discount_name: body.discount_name,
            category: body.category,
            kind: body.kind,
            reason: body.reason,
        },
    )?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn deactivate_discount(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentFeeDiscount>, AppError> {
    let mut conn = state.db.lock();
    let updated =
        discount::deactivate_discount(&mut conn, state.caps.as_ref(), &actor.0, id.into())?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount_paid: Money,
    pub payment_mode: PaymentMode,
    pub transaction_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

async fn record_payment(
    State(state): State<AppState>,
    actor: Actor,
    Path(assignment_id): Path<Uuid>,
    Json(body): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<PaymentTransaction>), AppError> {
    let mut conn = state.db.lock();
    let created = payment::record_payment(
        &mut conn,
        state.caps.as_ref(),
        &actor.0,
        assignment_id.into(),
        NewPayment {
            amount_paid: body.amount_paid,
            payment_mode: body.payment_mode,
            transaction_reference: body.transaction_reference,
            paid_at: body.paid_at,
        },
    )?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn payment_history(
    State(state): State<AppState>,
    actor: Actor,
    Path(student_id): Path<Uuid>,
    Query(query): Query<YearFilterQuery>,
) -> Result<Json<Vec<PaymentTransaction>>, AppError> {
    let conn = state.db.lock();
    let history = payment::payment_history(
        &conn,
        actor.0.tenant,
        student_id.into(),
        query.academic_year_id.map(Into::into),
    )?;
    Ok(Json(history))
}

async fn audit(
    State(state): State<AppState>,
    actor: Actor,
    Path(entity_id): Path<Uuid>,
) -> Result<Json<Vec<FeeAuditLogEntry>>, AppError> {
    let conn = state.db.lock();
    let trail = audit_trail(&conn, actor.0.tenant, entity_id)?;
    Ok(Json(trail))
}
