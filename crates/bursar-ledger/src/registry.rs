//! # Consumed Registry Slices
//!
//! The engine treats the academic-year registry and the student/class
//! registry as external collaborators; these are the two slices it
//! actually consumes — the year's ACTIVE/CLOSED flag and the student's
//! current class for a year — plus the writes needed to provision them
//! (used by tests and operational tooling, not exposed on the fee API).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use bursar_core::{AcademicYearId, ClassId, FeeRuleError, StudentId, TenantId};

use crate::error::LedgerError;
use crate::model::get_uuid;

/// Lifecycle flag of an academic year. The only field of the year the
/// engine ever reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearStatus {
    /// Writes allowed.
    Active,
    /// Every mutating fee operation is rejected.
    Closed,
}

impl std::fmt::Display for YearStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

impl FromStr for YearStatus {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "academic year status",
                value: s.to_string(),
            }),
        }
    }
}

/// Register an academic year for a tenant.
pub fn create_academic_year(
    conn: &Connection,
    tenant: TenantId,
    label: &str,
    status: YearStatus,
) -> Result<AcademicYearId, LedgerError> {
    let id = AcademicYearId::new();
    conn.execute(
        "INSERT INTO academic_years (id, tenant_id, label, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.as_uuid().to_string(),
            tenant.as_uuid().to_string(),
            label,
            status.to_string(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(id)
}

/// Flip a year's status (close it at year end, or reopen it).
pub fn set_year_status(
    conn: &Connection,
    tenant: TenantId,
    year: AcademicYearId,
    status: YearStatus,
) -> Result<(), LedgerError> {
    let n = conn.execute(
        "UPDATE academic_years SET status = ?1 WHERE id = ?2 AND tenant_id = ?3",
        params![
            status.to_string(),
            year.as_uuid().to_string(),
            tenant.as_uuid().to_string(),
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::NotFound {
            entity: "academic year",
            id: year.to_string(),
        });
    }
    Ok(())
}

/// Read a year's status, tenant-scoped.
pub fn year_status(
    conn: &Connection,
    tenant: TenantId,
    year: AcademicYearId,
) -> Result<YearStatus, LedgerError> {
    let status: Option<String> = conn
        .query_row(
            "SELECT status FROM academic_years WHERE id = ?1 AND tenant_id = ?2",
            params![year.as_uuid().to_string(), tenant.as_uuid().to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match status {
        Some(s) => Ok(s.parse::<YearStatus>()?),
        None => Err(LedgerError::NotFound {
            entity: "academic year",
            id: year.to_string(),
        }),
    }
}

/// Record a student's enrollment (their current class) for a year.
pub fn enroll_student(
    conn: &Connection,
    tenant: TenantId,
    student: StudentId,
    year: AcademicYearId,
    class: ClassId,
) -> Result<(), LedgerError> {
    conn.execute(
        "INSERT INTO student_enrollments (id, tenant_id, student_id, academic_year_id, class_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            uuid::Uuid::new_v4().to_string(),
            tenant.as_uuid().to_string(),
            student.as_uuid().to_string(),
            year.as_uuid().to_string(),
            class.as_uuid().to_string(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// The student's current class in a year. Fails `NotFound` for an
/// unenrolled student — fees cannot be assigned without a class to
/// resolve templates against.
pub fn current_class(
    conn: &Connection,
    tenant: TenantId,
    student: StudentId,
    year: AcademicYearId,
) -> Result<ClassId, LedgerError> {
    let class = conn
        .query_row(
            "SELECT class_id FROM student_enrollments
             WHERE tenant_id = ?1 AND student_id = ?2 AND academic_year_id = ?3",
            params![
                tenant.as_uuid().to_string(),
                student.as_uuid().to_string(),
                year.as_uuid().to_string(),
            ],
            |row| get_uuid(row, "class_id"),
        )
        .optional()?;
    match class {
        Some(c) => Ok(ClassId::from(c)),
        None => Err(LedgerError::NotFound {
            entity: "enrollment",
            id: format!("{student} in {year}"),
        }),
    }
}
