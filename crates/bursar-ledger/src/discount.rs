//! # Discount Engine
//!
//! Validates and applies discounts against an assignment, recomputing the
//! payable amount. The checks run in a fixed order inside one
//! transaction: year gate, component `allow_discount`, resolution to a
//! frozen computed amount, the >20% admin approval gate, the
//! original-amount cap, then the already-paid floor. Deactivation
//! recomputes the balance upward — it
//! can reopen a paid assignment, it never manufactures a refund.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::json;

use bursar_core::{
    rules, AssignmentId, AssignmentSource, AuditAction, CapabilityAction, CapabilityCheck,
    DiscountCategory, DiscountId, DiscountKind, Money, TenantId,
};

use crate::assignment::get_assignment;
use crate::audit;
use crate::catalog::{get_component, get_structure};
use crate::error::LedgerError;
use crate::gate::check_writable;
use crate::model::StudentFeeDiscount;
use crate::{require_capability, ActorContext};

/// Input for a new discount.
#[derive(Debug, Clone)]
pub struct NewDiscount {
    pub discount_name: String,
    pub category: DiscountCategory,
    pub kind: DiscountKind,
    pub reason: Option<String>,
}

/// Apply a discount to an assignment.
///
/// The computed amount is resolved against the frozen `original_amount`
/// and persisted on the discount row; `final_amount` and `status` are
/// recomputed in the same transaction. A discount that would push the
/// payable amount below what has already been paid is rejected, so
/// `paid_amount ≤ final_amount` holds on both sides of the commit.
pub fn add_discount(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    assignment_id: AssignmentId,
    new: NewDiscount,
) -> Result<StudentFeeDiscount, LedgerError> {
    require_capability(caps, ctx, CapabilityAction::Update)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let assignment = get_assignment(&tx, ctx.tenant, assignment_id)?;
    check_writable(&tx, ctx.tenant, assignment.academic_year_id)?;

    if assignment.source == AssignmentSource::Template {
        let structure_id = assignment.class_fee_structure_id.ok_or(LedgerError::NotFound {
            entity: "fee structure",
            id: assignment_id.to_string(),
        })?;
        let structure = get_structure(&tx, ctx.tenant, structure_id)?;
        let component = get_component(&tx, ctx.tenant, structure.fee_component_id)?;
        if !component.allow_discount {
            return Err(LedgerError::DiscountNotAllowed);
        }
    }

    let computed = rules::resolve_discount(new.kind, assignment.original_amount)?;
    rules::check_role_gate(ctx.role, computed, assignment.original_amount)?;
    let active_total = active_discount_total(&tx, ctx.tenant, assignment_id)?;
    rules::check_discount_cap(active_total, computed, assignment.original_amount)?;
    let new_final = assignment
        .original_amount
        .saturating_sub(active_total + computed);
    rules::check_paid_covered(computed, new_final, assignment.paid_amount)?;
    let new_status = rules::derive_status(assignment.paid_amount, new_final);

    let id = DiscountId::new();
    let (kind_tag, value) = match new.kind {
        DiscountKind::Fixed(amount) => ("FIXED", amount.to_string()),
        DiscountKind::Percentage(rate) => ("PERCENTAGE", rate.to_string()),
    };
    tx.execute(
        "INSERT INTO student_fee_discounts
             (id, tenant_id, student_fee_assignment_id, discount_name, category, kind, value,
              computed_amount, reason, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10)",
        params![
            id.as_uuid().to_string(),
            ctx.tenant.as_uuid().to_string(),
            assignment_id.as_uuid().to_string(),
            new.discount_name.trim(),
            new.category.to_string(),
            kind_tag,
            value,
            computed.to_string(),
            new.reason.as_deref().map(str::trim),
            Utc::now().to_rfc3339(),
        ],
    )?;

    update_assignment_amounts(&tx, ctx.tenant, assignment_id, new_final, assignment.paid_amount)?;

    audit::record(
        &tx,
        ctx.tenant,
        "student_fee_discounts",
        *id.as_uuid(),
        AuditAction::Create,
        Some(json!({
            "final_amount": assignment.final_amount.to_string(),
            "status": assignment.status.to_string(),
        })),
        json!({
            "discount_name": new.discount_name.trim(),
            "category": new.category.to_string(),
            "kind": kind_tag,
            "value": value,
            "computed_amount": computed.to_string(),
            "final_amount": new_final.to_string(),
            "status": new_status.to_string(),
        }),
        ctx.actor,
    )?;

    let discount = get_discount(&tx, ctx.tenant, id)?;
    tx.commit()?;
    tracing::info!(
        discount = %id,
        assignment = %assignment_id,
        computed = %computed,
        "discount applied"
    );
    Ok(discount)
}

/// Deactivate a discount, recomputing the payable amount upward.
///
/// Already-inactive discounts are a no-op. Status can move back from
/// `PAID` to `PARTIAL` (or `UNPAID` when nothing was paid) — reopening a
/// balance is deliberate policy, refunds are not.
pub fn deactivate_discount(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    discount_id: DiscountId,
) -> Result<StudentFeeDiscount, LedgerError> {
    require_capability(caps, ctx, CapabilityAction::Update)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let discount = get_discount(&tx, ctx.tenant, discount_id)?;
    if !discount.is_active {
        return Ok(discount);
    }
    let assignment = get_assignment(&tx, ctx.tenant, discount.student_fee_assignment_id)?;
    check_writable(&tx, ctx.tenant, assignment.academic_year_id)?;

    tx.execute(
        "UPDATE student_fee_discounts SET is_active = 0 WHERE id = ?1 AND tenant_id = ?2",
        params![
            discount_id.as_uuid().to_string(),
            ctx.tenant.as_uuid().to_string(),
        ],
    )?;

    let active_total = active_discount_total(&tx, ctx.tenant, assignment.id)?;
    let new_final = assignment.original_amount.saturating_sub(active_total);
    let new_status = rules::derive_status(assignment.paid_amount, new_final);
    update_assignment_amounts(&tx, ctx.tenant, assignment.id, new_final, assignment.paid_amount)?;

    audit::record(
        &tx,
        ctx.tenant,
        "student_fee_discounts",
        *discount_id.as_uuid(),
        AuditAction::Deactivate,
        Some(json!({
            "is_active": true,
            "computed_amount": discount.computed_amount.to_string(),
            "final_amount": assignment.final_amount.to_string(),
            "status": assignment.status.to_string(),
        })),
        json!({
            "is_active": false,
            "final_amount": new_final.to_string(),
            "status": new_status.to_string(),
        }),
        ctx.actor,
    )?;

    let updated = get_discount(&tx, ctx.tenant, discount_id)?;
    tx.commit()?;
    tracing::info!(discount = %discount_id, assignment = %assignment.id, "discount deactivated");
    Ok(updated)
}

/// Fetch one discount, tenant-scoped.
pub fn get_discount(
    conn: &Connection,
    tenant: TenantId,
    id: DiscountId,
) -> Result<StudentFeeDiscount, LedgerError> {
    conn.query_row(
        "SELECT * FROM student_fee_discounts WHERE id = ?1 AND tenant_id = ?2",
        params![id.as_uuid().to_string(), tenant.as_uuid().to_string()],
        StudentFeeDiscount::from_row,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "discount",
        id: id.to_string(),
    })
}

/// All discounts ever applied to an assignment, active and deactivated.
pub fn discounts_for_assignment(
    conn: &Connection,
    tenant: TenantId,
    assignment: AssignmentId,
) -> Result<Vec<StudentFeeDiscount>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM student_fee_discounts
         WHERE tenant_id = ?1 AND student_fee_assignment_id = ?2
         ORDER BY created_at, id",
    )?;
    let rows = stmt.query_map(
        params![
            tenant.as_uuid().to_string(),
            assignment.as_uuid().to_string(),
        ],
        StudentFeeDiscount::from_row,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Sum of the computed amounts of the currently active discounts.
///
/// Summed in Rust over exact decimals — amounts are stored as TEXT, a SQL
/// SUM would go through float affinity.
fn active_discount_total(
    conn: &Connection,
    tenant: TenantId,
    assignment: AssignmentId,
) -> Result<Money, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT computed_amount FROM student_fee_discounts
         WHERE tenant_id = ?1 AND student_fee_assignment_id = ?2 AND is_active = 1",
    )?;
    let rows = stmt.query_map(
        params![
            tenant.as_uuid().to_string(),
            assignment.as_uuid().to_string(),
        ],
        |row| crate::model::get_money(row, "computed_amount"),
    )?;
    let mut total = Money::ZERO;
    for row in rows {
        total = total + row?;
    }
    Ok(total)
}

/// Rewrite an assignment's derived columns. Status is always recomputed
/// from the amounts being written, never taken from the caller.
pub(crate) fn update_assignment_amounts(
    conn: &Connection,
    tenant: TenantId,
    id: AssignmentId,
    final_amount: Money,
    paid_amount: Money,
) -> Result<(), LedgerError> {
    let status = rules::derive_status(paid_amount, final_amount);
    conn.execute(
        "UPDATE student_fee_assignments
         SET final_amount = ?1, paid_amount = ?2, status = ?3
         WHERE id = ?4 AND tenant_id = ?5",
        params![
            final_amount.to_string(),
            paid_amount.to_string(),
            status.to_string(),
            id.as_uuid().to_string(),
            tenant.as_uuid().to_string(),
        ],
    )?;
    Ok(())
}
