//! # Report Reader
//!
//! Read-only aggregation over assignments for a year, optionally filtered
//! by class (via the student's enrollment) and by status. No mutation, no
//! invariants of its own — the written rows already carry them.

use rusqlite::{params, Connection};
use serde::Serialize;

use bursar_core::{
    rules, AcademicYearId, AssignmentId, ClassId, FeeStatus, Money, StudentId, TenantId,
};

use crate::error::LedgerError;
use crate::model::{get_money, get_parsed, get_uuid, get_uuid_opt};

/// One row of the fee status report.
#[derive(Debug, Clone, Serialize)]
pub struct FeeReportRow {
    pub student_id: StudentId,
    /// The student's class for the year; absent when the student has no
    /// enrollment record (custom fees only).
    pub class_id: Option<ClassId>,
    pub assignment_id: AssignmentId,
    /// Component name for template fees, custom name otherwise.
    pub fee_name: String,
    pub original_amount: Money,
    pub final_amount: Money,
    pub paid_amount: Money,
    /// `final_amount - paid_amount`.
    pub balance: Money,
    pub status: FeeStatus,
}

/// Per-student amounts for a year, optionally narrowed by class and
/// status.
pub fn report(
    conn: &Connection,
    tenant: TenantId,
    year: AcademicYearId,
    class: Option<ClassId>,
    status: Option<FeeStatus>,
) -> Result<Vec<FeeReportRow>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT a.id AS assignment_id, a.student_id, e.class_id,
                COALESCE(c.name, a.custom_name) AS fee_name,
                a.original_amount, a.final_amount, a.paid_amount, a.status
         FROM student_fee_assignments a
         LEFT JOIN student_enrollments e
             ON e.tenant_id = a.tenant_id
            AND e.student_id = a.student_id
            AND e.academic_year_id = a.academic_year_id
         LEFT JOIN class_fee_structures s ON s.id = a.class_fee_structure_id
         LEFT JOIN fee_components c ON c.id = s.fee_component_id
         WHERE a.tenant_id = ?1 AND a.academic_year_id = ?2
           AND (?3 IS NULL OR e.class_id = ?3)
           AND (?4 IS NULL OR a.status = ?4)
         ORDER BY e.class_id, a.student_id, fee_name",
    )?;
    let rows = stmt.query_map(
        params![
            tenant.as_uuid().to_string(),
            year.as_uuid().to_string(),
            class.map(|c| c.as_uuid().to_string()),
            status.map(|s| s.to_string()),
        ],
        |row| {
            let final_amount = get_money(row, "final_amount")?;
            let paid_amount = get_money(row, "paid_amount")?;
            Ok(FeeReportRow {
                student_id: StudentId::from(get_uuid(row, "student_id")?),
                class_id: get_uuid_opt(row, "class_id")?.map(ClassId::from),
                assignment_id: AssignmentId::from(get_uuid(row, "assignment_id")?),
                fee_name: row
                    .get::<_, Option<String>>("fee_name")?
                    .unwrap_or_default(),
                original_amount: get_money(row, "original_amount")?,
                final_amount,
                paid_amount,
                balance: rules::remaining_balance(final_amount, paid_amount),
                status: get_parsed(row, "status")?,
            })
        },
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
