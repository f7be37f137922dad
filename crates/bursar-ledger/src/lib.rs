//! # bursar-ledger — Fee Ledger & Discount Resolution Engine
//!
//! Turns per-class fee templates into frozen, auditable per-student
//! financial obligations, applies bounded discounts, records payments, and
//! always exposes a consistent amount-owed view.
//!
//! ## Components
//!
//! - [`gate`] — Academic-Year Gate: is writing allowed for this
//!   tenant/year right now?
//! - [`catalog`] — Fee Catalog: tenant-scoped fee components and per-class,
//!   per-year fee structures (the templates).
//! - [`assignment`] — Assignment Builder: materializes frozen per-student
//!   snapshots from the catalog plus optional custom rows.
//! - [`discount`] — Discount Engine: bounded discounts with role gating
//!   and the original-amount cap.
//! - [`payment`] — Payment Ledger: payments against a shrinking balance.
//! - [`audit`] — Audit Recorder: one append-only entry per committed
//!   mutation, written inside the same transaction.
//! - [`report`] — Report Reader: read-only aggregation, never mutates.
//! - [`registry`] — the consumed slices of the academic-year and
//!   student/class registries (status flag, current class).
//!
//! ## Transactional Model
//!
//! Every mutating operation runs in one `IMMEDIATE` SQLite transaction:
//! the write lock is acquired up front, so two concurrent discount or
//! payment requests against the same assignment serialize and the second
//! observes the first's committed amounts. A failure anywhere rolls the
//! whole transaction back, audit row included — no audit entry ever
//! describes a change that did not durably happen.
//!
//! ## Tenancy
//!
//! Every query is scoped by `tenant_id`. This is a hard isolation
//! invariant: the public functions all demand a [`TenantId`] (inside
//! [`ActorContext`] for writes) and every SQL statement filters on it.

pub mod assignment;
pub mod audit;
pub mod catalog;
pub mod discount;
pub mod error;
pub mod gate;
pub mod model;
pub mod payment;
pub mod registry;
pub mod report;
pub mod schema;

pub use error::LedgerError;
pub use schema::init_schema;

use bursar_core::{ActorId, CapabilityAction, CapabilityCheck, Role, TenantId};

/// Permission module every operation in this crate checks against.
pub const FEES_MODULE: &str = "fees";

/// The caller's identity for a ledger operation.
///
/// Resolved by the external auth collaborator and passed in explicitly;
/// the engine never re-derives tenant, actor, or role from ambient state.
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    /// Tenant every touched row must belong to.
    pub tenant: TenantId,
    /// Acting user, recorded on audit entries.
    pub actor: ActorId,
    /// Resolved role, consumed by the capability seam and the discount
    /// approval gate.
    pub role: Role,
}

/// Consult the injected capability check before opening a transaction.
pub(crate) fn require_capability(
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    action: CapabilityAction,
) -> Result<(), error::LedgerError> {
    if caps.has_capability(ctx.role, FEES_MODULE, action) {
        Ok(())
    } else {
        Err(error::LedgerError::CapabilityDenied {
            role: ctx.role,
            module: FEES_MODULE,
            action,
        })
    }
}
