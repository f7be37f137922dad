//! # Capability Seam
//!
//! Module-level permission checks are an injected collaborator, not a
//! baked-in table. The engine asks "may this role perform this action on
//! this module?" through the [`CapabilityCheck`] trait; the platform's
//! auth service owns the real answer. [`StaticCapabilities`] ships the
//! default grants so the engine is usable without that service wired in.
//!
//! Note the >20% discount approval gate is *not* a capability — it is a
//! numeric rule in [`crate::rules::check_role_gate`] and applies on top of
//! `fees.update`.

use crate::domain::Role;

/// An action on a module, in `module.action` permission terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityAction {
    /// Create new rows.
    Create,
    /// Read rows and reports.
    Read,
    /// Mutate existing rows (discounts, payments, deactivation).
    Update,
}

impl std::fmt::Display for CapabilityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
        };
        f.write_str(s)
    }
}

/// Injected permission check.
///
/// Implementations must be cheap and side-effect free; the check runs
/// before any transaction opens.
pub trait CapabilityCheck: Send + Sync {
    /// Whether `role` may perform `action` on `module` (e.g. `"fees"`).
    fn has_capability(&self, role: Role, module: &str, action: CapabilityAction) -> bool;
}

/// Default grant table.
///
/// Admin-tier roles hold everything. Accountants hold the full `fees`
/// module. Teachers may read and update fees (assign, discount within the
/// numeric ceiling, record payments) but not define the catalog. Students
/// are read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCapabilities;

impl CapabilityCheck for StaticCapabilities {
    fn has_capability(&self, role: Role, module: &str, action: CapabilityAction) -> bool {
        if role.is_admin_tier() {
            return true;
        }
        match (module, role) {
            ("fees", Role::Accountant) => true,
            ("fees", Role::Teacher) => {
                matches!(action, CapabilityAction::Read | CapabilityAction::Update)
            }
            ("fees", Role::Student) => matches!(action, CapabilityAction::Read),
            _ => false,
        }
    }
}
