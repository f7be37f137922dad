//! # Schema Bootstrap
//!
//! Creates the ledger tables and the indexes that back the engine's
//! uniqueness rules. Idempotent — every statement is `IF NOT EXISTS`.
//!
//! Monetary columns are TEXT: amounts round-trip as exact decimal strings
//! and never touch SQLite's float affinity. All ids are TEXT UUIDs and all
//! timestamps RFC 3339 TEXT.

use rusqlite::Connection;

use crate::error::LedgerError;

/// Create all tables and indexes if they do not exist.
pub fn init_schema(conn: &Connection) -> Result<(), LedgerError> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        -- Consumed registry slice: only {id, status} is read by the engine.
        CREATE TABLE IF NOT EXISTS academic_years (
            id               TEXT PRIMARY KEY,
            tenant_id        TEXT NOT NULL,
            label            TEXT NOT NULL,
            status           TEXT NOT NULL CHECK (status IN ('ACTIVE', 'CLOSED')),
            created_at       TEXT NOT NULL
        );

        -- Consumed registry slice: the student's current class per year.
        CREATE TABLE IF NOT EXISTS student_enrollments (
            id               TEXT PRIMARY KEY,
            tenant_id        TEXT NOT NULL,
            student_id       TEXT NOT NULL,
            academic_year_id TEXT NOT NULL,
            class_id         TEXT NOT NULL,
            created_at       TEXT NOT NULL,
            UNIQUE (tenant_id, student_id, academic_year_id)
        );

        CREATE TABLE IF NOT EXISTS fee_components (
            id                   TEXT PRIMARY KEY,
            tenant_id            TEXT NOT NULL,
            name                 TEXT NOT NULL,
            code                 TEXT NOT NULL,
            category             TEXT NOT NULL,
            allow_discount       INTEGER NOT NULL,
            is_mandatory_default INTEGER NOT NULL,
            is_active            INTEGER NOT NULL DEFAULT 1,
            created_at           TEXT NOT NULL,
            updated_at           TEXT NOT NULL,
            UNIQUE (tenant_id, code)
        );

        CREATE TABLE IF NOT EXISTS class_fee_structures (
            id               TEXT PRIMARY KEY,
            tenant_id        TEXT NOT NULL,
            academic_year_id TEXT NOT NULL,
            class_id         TEXT NOT NULL,
            fee_component_id TEXT NOT NULL REFERENCES fee_components (id),
            amount           TEXT NOT NULL,
            frequency        TEXT NOT NULL,
            due_date         TEXT,
            is_mandatory     INTEGER NOT NULL,
            is_active        INTEGER NOT NULL DEFAULT 1,
            created_at       TEXT NOT NULL,
            UNIQUE (tenant_id, academic_year_id, class_id, fee_component_id)
        );

        CREATE TABLE IF NOT EXISTS student_fee_assignments (
            id                     TEXT PRIMARY KEY,
            tenant_id              TEXT NOT NULL,
            student_id             TEXT NOT NULL,
            academic_year_id       TEXT NOT NULL,
            source                 TEXT NOT NULL CHECK (source IN ('TEMPLATE', 'CUSTOM')),
            class_fee_structure_id TEXT REFERENCES class_fee_structures (id),
            custom_name            TEXT,
            original_amount        TEXT NOT NULL,
            final_amount           TEXT NOT NULL,
            paid_amount            TEXT NOT NULL,
            status                 TEXT NOT NULL CHECK (status IN ('UNPAID', 'PARTIAL', 'PAID')),
            created_at             TEXT NOT NULL
        );

        -- Assignment is idempotent per structure: at most one template
        -- assignment per (student, structure).
        CREATE UNIQUE INDEX IF NOT EXISTS ux_assignment_per_structure
            ON student_fee_assignments (tenant_id, student_id, class_fee_structure_id)
            WHERE class_fee_structure_id IS NOT NULL;

        CREATE INDEX IF NOT EXISTS ix_assignments_student_year
            ON student_fee_assignments (tenant_id, student_id, academic_year_id);

        CREATE INDEX IF NOT EXISTS ix_assignments_year
            ON student_fee_assignments (tenant_id, academic_year_id, status);

        CREATE TABLE IF NOT EXISTS student_fee_discounts (
            id                        TEXT PRIMARY KEY,
            tenant_id                 TEXT NOT NULL,
            student_fee_assignment_id TEXT NOT NULL REFERENCES student_fee_assignments (id),
            discount_name             TEXT NOT NULL,
            category                  TEXT NOT NULL,
            kind                      TEXT NOT NULL CHECK (kind IN ('FIXED', 'PERCENTAGE')),
            value                     TEXT NOT NULL,
            computed_amount           TEXT NOT NULL,
            reason                    TEXT,
            is_active                 INTEGER NOT NULL DEFAULT 1,
            created_at                TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS ix_discounts_assignment
            ON student_fee_discounts (tenant_id, student_fee_assignment_id, is_active);

        CREATE TABLE IF NOT EXISTS payment_transactions (
            id                        TEXT PRIMARY KEY,
            tenant_id                 TEXT NOT NULL,
            student_fee_assignment_id TEXT NOT NULL REFERENCES student_fee_assignments (id),
            amount_paid               TEXT NOT NULL,
            payment_mode              TEXT NOT NULL,
            transaction_reference     TEXT,
            paid_at                   TEXT NOT NULL,
            recorded_at               TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS ix_payments_assignment
            ON payment_transactions (tenant_id, student_fee_assignment_id);

        CREATE TABLE IF NOT EXISTS fee_audit_log (
            id              TEXT PRIMARY KEY,
            tenant_id       TEXT NOT NULL,
            entity_type     TEXT NOT NULL,
            entity_id       TEXT NOT NULL,
            action          TEXT NOT NULL CHECK (action IN ('CREATE', 'UPDATE', 'DEACTIVATE')),
            before_snapshot TEXT,
            after_snapshot  TEXT NOT NULL,
            performed_by    TEXT NOT NULL,
            performed_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS ix_audit_entity
            ON fee_audit_log (tenant_id, entity_type, entity_id);
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }
}
