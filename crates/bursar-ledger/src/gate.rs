//! # Academic-Year Gate
//!
//! Answers "is writing allowed right now for this tenant/year?". A pure
//! precondition read, not a lock: every mutating operation calls it as its
//! first step inside the operation's transaction.

use rusqlite::Connection;

use bursar_core::{AcademicYearId, TenantId};

use crate::error::LedgerError;
use crate::registry::{year_status, YearStatus};

/// Fail with [`LedgerError::AcademicYearClosed`] when the year is CLOSED.
///
/// A year that does not exist for this tenant is `NotFound` — a
/// cross-tenant year id must not leak whether it exists elsewhere.
pub fn check_writable(
    conn: &Connection,
    tenant: TenantId,
    year: AcademicYearId,
) -> Result<(), LedgerError> {
    match year_status(conn, tenant, year)? {
        YearStatus::Active => Ok(()),
        YearStatus::Closed => Err(LedgerError::AcademicYearClosed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::create_academic_year;
    use crate::schema::init_schema;

    #[test]
    fn test_active_year_is_writable() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let tenant = TenantId::new();
        let year = create_academic_year(&conn, tenant, "2025-26", YearStatus::Active).unwrap();
        assert!(check_writable(&conn, tenant, year).is_ok());
    }

    #[test]
    fn test_closed_year_rejects_writes() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let tenant = TenantId::new();
        let year = create_academic_year(&conn, tenant, "2024-25", YearStatus::Closed).unwrap();
        let err = check_writable(&conn, tenant, year).unwrap_err();
        assert!(matches!(err, LedgerError::AcademicYearClosed));
    }

    #[test]
    fn test_cross_tenant_year_is_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let year =
            create_academic_year(&conn, TenantId::new(), "2025-26", YearStatus::Active).unwrap();
        let err = check_writable(&conn, TenantId::new(), year).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }
}
