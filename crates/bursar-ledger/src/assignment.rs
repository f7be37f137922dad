//! # Assignment Builder
//!
//! Materializes frozen per-student fee snapshots from the catalog. Every
//! mandatory structure of the student's class becomes an assignment;
//! optional structures are assigned on selection, with an optional amount
//! override; custom fees bypass the catalog entirely.
//!
//! Assignment is idempotent per structure: re-running `assign_fees` never
//! duplicates an existing assignment, it reports the existing rows.
//! `original_amount` is frozen here and never touched again by any
//! operation.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde_json::json;

use bursar_core::{
    AcademicYearId, AssignmentId, AssignmentSource, AuditAction, CapabilityAction,
    CapabilityCheck, FeeRuleError, FeeStatus, FeeStructureId, Money, StudentId, TenantId,
};

use crate::audit;
use crate::error::LedgerError;
use crate::gate::check_writable;
use crate::model::{AssignmentDetail, StudentFeeAssignment};
use crate::registry::current_class;
use crate::{require_capability, ActorContext};

/// One optional-structure selection in an `assign_fees` call.
#[derive(Debug, Clone)]
pub struct OptionalComponent {
    /// Must reference a non-mandatory structure of the student's
    /// class/year, in this tenant.
    pub class_fee_structure_id: FeeStructureId,
    /// Overrides the structure's amount when present.
    pub custom_amount: Option<Money>,
}

/// Per-student outcome of a roster-wide assignment run.
#[derive(Debug)]
pub struct RosterOutcome {
    pub student_id: StudentId,
    pub outcome: Result<Vec<StudentFeeAssignment>, LedgerError>,
}

/// Assign template fees to one student for a year.
///
/// Mandatory structures are assigned automatically; `optional` entries
/// must reference non-mandatory structures of the student's class. The
/// whole call runs in one transaction and returns the full set of
/// assignments for the student/year, created and pre-existing alike.
pub fn assign_fees(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    student: StudentId,
    year: AcademicYearId,
    optional: &[OptionalComponent],
) -> Result<Vec<StudentFeeAssignment>, LedgerError> {
    require_capability(caps, ctx, CapabilityAction::Create)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    check_writable(&tx, ctx.tenant, year)?;
    let class = current_class(&tx, ctx.tenant, student, year)?;

    let structures = crate::catalog::list_structures(&tx, ctx.tenant, year, Some(class))?;

    let mut to_assign: Vec<(FeeStructureId, Money)> = structures
        .iter()
        .filter(|s| s.is_mandatory)
        .map(|s| (s.id, s.amount))
        .collect();

    for sel in optional {
        let structure = structures
            .iter()
            .find(|s| !s.is_mandatory && s.id == sel.class_fee_structure_id)
            .ok_or(LedgerError::UnknownStructure(sel.class_fee_structure_id))?;
        let amount = match sel.custom_amount {
            Some(a) if !a.is_positive() => {
                return Err(FeeRuleError::InvalidAmount(format!(
                    "custom amount for structure {} must be greater than zero",
                    structure.id
                ))
                .into())
            }
            Some(a) => a,
            None => structure.amount,
        };
        to_assign.push((structure.id, amount));
    }

    for (structure_id, amount) in to_assign {
        let exists: Option<String> = tx
            .query_row(
                "SELECT id FROM student_fee_assignments
                 WHERE tenant_id = ?1 AND student_id = ?2 AND class_fee_structure_id = ?3",
                params![
                    ctx.tenant.as_uuid().to_string(),
                    student.as_uuid().to_string(),
                    structure_id.as_uuid().to_string(),
                ],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            // Idempotent per structure: the second call is a no-op here.
            continue;
        }
        insert_assignment(
            &tx,
            ctx,
            student,
            year,
            AssignmentSource::Template,
            Some(structure_id),
            None,
            None,
            amount,
        )?;
    }
    tx.commit()?;

    assignments_for_student(conn, ctx.tenant, student, Some(year))
}

/// Assign template fees across a class roster, one transaction per
/// student, so a failure for one student never aborts the others and no
/// lock is held across the whole roster.
pub fn assign_fees_roster(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    year: AcademicYearId,
    students: &[StudentId],
) -> Vec<RosterOutcome> {
    students
        .iter()
        .map(|&student_id| RosterOutcome {
            student_id,
            outcome: assign_fees(conn, caps, ctx, student_id, year, &[]),
        })
        .collect()
}

/// Create a custom (non-catalog) fee for a student. The amount is
/// caller-supplied and must be strictly positive.
pub fn add_custom_fee(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    student: StudentId,
    year: AcademicYearId,
    custom_name: &str,
    amount: Money,
    reason: Option<&str>,
) -> Result<StudentFeeAssignment, LedgerError> {
    require_capability(caps, ctx, CapabilityAction::Create)?;
    if custom_name.trim().is_empty() {
        return Err(
            FeeRuleError::InvalidName("custom fee name must be non-empty".to_string()).into(),
        );
    }
    if !amount.is_positive() {
        return Err(FeeRuleError::InvalidAmount(
            "custom fee amount must be greater than zero".to_string(),
        )
        .into());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    check_writable(&tx, ctx.tenant, year)?;
    let id = insert_assignment(
        &tx,
        ctx,
        student,
        year,
        AssignmentSource::Custom,
        None,
        Some(custom_name.trim()),
        reason,
        amount,
    )?;
    let assignment = get_assignment(&tx, ctx.tenant, id)?;
    tx.commit()?;
    tracing::info!(assignment = %id, student = %student, "custom fee added");
    Ok(assignment)
}

/// Insert one assignment row plus its audit entry. Caller holds the
/// transaction.
#[allow(clippy::too_many_arguments)]
fn insert_assignment(
    tx: &Transaction<'_>,
    ctx: &ActorContext,
    student: StudentId,
    year: AcademicYearId,
    source: AssignmentSource,
    structure_id: Option<FeeStructureId>,
    custom_name: Option<&str>,
    reason: Option<&str>,
    amount: Money,
) -> Result<AssignmentId, LedgerError> {
    let id = AssignmentId::new();
    tx.execute(
        "INSERT INTO student_fee_assignments
             (id, tenant_id, student_id, academic_year_id, source, class_fee_structure_id,
              custom_name, original_amount, final_amount, paid_amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9, ?10, ?11)",
        params![
            id.as_uuid().to_string(),
            ctx.tenant.as_uuid().to_string(),
            student.as_uuid().to_string(),
            year.as_uuid().to_string(),
            source.to_string(),
            structure_id.map(|s| s.as_uuid().to_string()),
            custom_name,
            amount.to_string(),
            Money::ZERO.to_string(),
            FeeStatus::Unpaid.to_string(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    audit::record(
        tx,
        ctx.tenant,
        "student_fee_assignments",
        *id.as_uuid(),
        AuditAction::Create,
        None,
        json!({
            "student_id": student.as_uuid(),
            "academic_year_id": year.as_uuid(),
            "source": source.to_string(),
            "class_fee_structure_id": structure_id.map(|s| *s.as_uuid()),
            "custom_name": custom_name,
            "original_amount": amount.to_string(),
            "final_amount": amount.to_string(),
            "status": FeeStatus::Unpaid.to_string(),
            "reason": reason,
        }),
        ctx.actor,
    )?;
    Ok(id)
}

/// Fetch one assignment, tenant-scoped.
pub fn get_assignment(
    conn: &Connection,
    tenant: TenantId,
    id: AssignmentId,
) -> Result<StudentFeeAssignment, LedgerError> {
    conn.query_row(
        "SELECT * FROM student_fee_assignments WHERE id = ?1 AND tenant_id = ?2",
        params![id.as_uuid().to_string(), tenant.as_uuid().to_string()],
        StudentFeeAssignment::from_row,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "assignment",
        id: id.to_string(),
    })
}

/// All assignments for a student, optionally narrowed to one year.
pub fn assignments_for_student(
    conn: &Connection,
    tenant: TenantId,
    student: StudentId,
    year: Option<AcademicYearId>,
) -> Result<Vec<StudentFeeAssignment>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM student_fee_assignments
         WHERE tenant_id = ?1 AND student_id = ?2
           AND (?3 IS NULL OR academic_year_id = ?3)
         ORDER BY created_at, id",
    )?;
    let rows = stmt.query_map(
        params![
            tenant.as_uuid().to_string(),
            student.as_uuid().to_string(),
            year.map(|y| y.as_uuid().to_string()),
        ],
        StudentFeeAssignment::from_row,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Assignments for a student with display names resolved: the component
/// name for template fees, the custom name otherwise.
pub fn student_fees(
    conn: &Connection,
    tenant: TenantId,
    student: StudentId,
    year: Option<AcademicYearId>,
) -> Result<Vec<AssignmentDetail>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT a.*, COALESCE(c.name, a.custom_name) AS fee_name, c.code AS fee_code
         FROM student_fee_assignments a
         LEFT JOIN class_fee_structures s ON s.id = a.class_fee_structure_id
         LEFT JOIN fee_components c ON c.id = s.fee_component_id
         WHERE a.tenant_id = ?1 AND a.student_id = ?2
           AND (?3 IS NULL OR a.academic_year_id = ?3)
         ORDER BY a.created_at, a.id",
    )?;
    let rows = stmt.query_map(
        params![
            tenant.as_uuid().to_string(),
            student.as_uuid().to_string(),
            year.map(|y| y.as_uuid().to_string()),
        ],
        |row| {
            Ok(AssignmentDetail {
                assignment: StudentFeeAssignment::from_row(row)?,
                fee_name: row
                    .get::<_, Option<String>>("fee_name")?
                    .unwrap_or_default(),
                fee_code: row.get("fee_code")?,
            })
        },
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
