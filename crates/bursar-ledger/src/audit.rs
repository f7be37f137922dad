//! # Audit Recorder
//!
//! Pure append. `record` is always called inside the same transaction as
//! the mutation it describes, so a rollback of the mutation also discards
//! the audit row: no audit entry ever describes a change that did not
//! durably happen, and no durable change goes unaudited.

use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;
use uuid::Uuid;

use bursar_core::{ActorId, AuditAction, TenantId};

use crate::error::LedgerError;
use crate::model::FeeAuditLogEntry;

/// Append one audit entry. Caller must hold the mutation's transaction.
#[allow(clippy::too_many_arguments)]
pub(crate) fn record(
    conn: &Connection,
    tenant: TenantId,
    entity_type: &str,
    entity_id: Uuid,
    action: AuditAction,
    before: Option<Value>,
    after: Value,
    actor: ActorId,
) -> Result<(), LedgerError> {
    conn.execute(
        "INSERT INTO fee_audit_log
             (id, tenant_id, entity_type, entity_id, action, before_snapshot, after_snapshot, performed_by, performed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            Uuid::new_v4().to_string(),
            tenant.as_uuid().to_string(),
            entity_type,
            entity_id.to_string(),
            action.to_string(),
            before.map(|v| v.to_string()),
            after.to_string(),
            actor.as_uuid().to_string(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// All audit entries for an entity, oldest first. Read-only; used by
/// reconciliation tooling and the invariant tests.
pub fn audit_trail(
    conn: &Connection,
    tenant: TenantId,
    entity_id: Uuid,
) -> Result<Vec<FeeAuditLogEntry>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM fee_audit_log
         WHERE tenant_id = ?1 AND entity_id = ?2
         ORDER BY performed_at, id",
    )?;
    let rows = stmt.query_map(
        params![tenant.as_uuid().to_string(), entity_id.to_string()],
        FeeAuditLogEntry::from_row,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
