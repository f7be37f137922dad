//! # Payment Ledger
//!
//! Records payments against an assignment's shrinking balance. A payment
//! that would overshoot the remaining balance is rejected whole — no
//! partial acceptance, the caller resubmits with a corrected amount.
//! Transaction rows are append-only; `paid_amount` on the assignment is
//! the running total and is recomputed in the same transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, TransactionBehavior};
use serde_json::json;

use bursar_core::{
    rules, AcademicYearId, AssignmentId, AuditAction, CapabilityAction, CapabilityCheck, Money,
    PaymentId, PaymentMode, StudentId, TenantId,
};

use crate::assignment::get_assignment;
use crate::audit;
use crate::discount::update_assignment_amounts;
use crate::error::LedgerError;
use crate::gate::check_writable;
use crate::model::PaymentTransaction;
use crate::{require_capability, ActorContext};

/// Input for a new payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount_paid: Money,
    pub payment_mode: PaymentMode,
    pub transaction_reference: Option<String>,
    /// When the money changed hands. Defaults to now; back-datable for
    /// receipts entered after the fact.
    pub paid_at: Option<DateTime<Utc>>,
}

/// Record a payment against an assignment.
///
/// The remaining balance is read under the transaction's write lock, so
/// two concurrent payments against the same assignment serialize and the
/// second sees the first's committed total — the pair can never jointly
/// overpay.
pub fn record_payment(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    assignment_id: AssignmentId,
    new: NewPayment,
) -> Result<PaymentTransaction, LedgerError> {
    require_capability(caps, ctx, CapabilityAction::Update)?;
    if !new.amount_paid.is_positive() {
        return Err(bursar_core::FeeRuleError::InvalidAmount(
            "payment amount must be greater than zero".to_string(),
        )
        .into());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let assignment = get_assignment(&tx, ctx.tenant, assignment_id)?;
    check_writable(&tx, ctx.tenant, assignment.academic_year_id)?;

    let remaining = rules::remaining_balance(assignment.final_amount, assignment.paid_amount);
    if new.amount_paid > remaining {
        return Err(LedgerError::PaymentExceedsBalance {
            requested: new.amount_paid.to_string(),
            remaining: remaining.to_string(),
        });
    }

    let id = PaymentId::new();
    let now = Utc::now();
    let paid_at = new.paid_at.unwrap_or(now);
    tx.execute(
        "INSERT INTO payment_transactions
             (id, tenant_id, student_fee_assignment_id, amount_paid, payment_mode,
              transaction_reference, paid_at, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.as_uuid().to_string(),
            ctx.tenant.as_uuid().to_string(),
            assignment_id.as_uuid().to_string(),
            new.amount_paid.to_string(),
            new.payment_mode.to_string(),
            new.transaction_reference.as_deref().map(str::trim),
            paid_at.to_rfc3339(),
            now.to_rfc3339(),
        ],
    )?;

    let new_paid = assignment.paid_amount + new.amount_paid;
    let new_status = rules::derive_status(new_paid, assignment.final_amount);
    update_assignment_amounts(&tx, ctx.tenant, assignment_id, assignment.final_amount, new_paid)?;

    audit::record(
        &tx,
        ctx.tenant,
        "payment_transactions",
        *id.as_uuid(),
        AuditAction::Create,
        Some(json!({
            "paid_amount": assignment.paid_amount.to_string(),
            "status": assignment.status.to_string(),
        })),
        json!({
            "amount_paid": new.amount_paid.to_string(),
            "payment_mode": new.payment_mode.to_string(),
            "paid_amount": new_paid.to_string(),
            "status": new_status.to_string(),
        }),
        ctx.actor,
    )?;

    let payment = get_payment(&tx, ctx.tenant, id)?;
    tx.commit()?;
    tracing::info!(
        payment = %id,
        assignment = %assignment_id,
        amount = %new.amount_paid,
        "payment recorded"
    );
    Ok(payment)
}

/// Fetch one payment, tenant-scoped.
pub fn get_payment(
    conn: &Connection,
    tenant: TenantId,
    id: PaymentId,
) -> Result<PaymentTransaction, LedgerError> {
    use rusqlite::OptionalExtension;
    conn.query_row(
        "SELECT * FROM payment_transactions WHERE id = ?1 AND tenant_id = ?2",
        params![id.as_uuid().to_string(), tenant.as_uuid().to_string()],
        PaymentTransaction::from_row,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "payment",
        id: id.to_string(),
    })
}

/// A student's payment history, most recent `paid_at` first. Pure read,
/// no computation.
pub fn payment_history(
    conn: &Connection,
    tenant: TenantId,
    student: StudentId,
    year: Option<AcademicYearId>,
) -> Result<Vec<PaymentTransaction>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT p.* FROM payment_transactions p
         JOIN student_fee_assignments a ON a.id = p.student_fee_assignment_id
         WHERE p.tenant_id = ?1 AND a.student_id = ?2
           AND (?3 IS NULL OR a.academic_year_id = ?3)
         ORDER BY p.paid_at DESC, p.id",
    )?;
    let rows = stmt.query_map(
        params![
            tenant.as_uuid().to_string(),
            student.as_uuid().to_string(),
            year.map(|y| y.as_uuid().to_string()),
        ],
        PaymentTransaction::from_row,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
