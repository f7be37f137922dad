//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the fee engine. These
//! prevent accidental identifier confusion — you cannot pass a
//! `DiscountId` where an `AssignmentId` is expected.
//!
//! ## Tenancy Invariant
//!
//! `TenantId` in particular exists so that every storage query signature
//! demands one. Tenant scoping is a hard isolation invariant, not a
//! filter someone remembers to add.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }
    };
}

id_newtype!(
    /// Unique identifier for a tenant (an isolated customer organization).
    TenantId,
    "tenant"
);

id_newtype!(
    /// Unique identifier for an academic year within a tenant.
    AcademicYearId,
    "year"
);

id_newtype!(
    /// Unique identifier for a student.
    StudentId,
    "student"
);

id_newtype!(
    /// Unique identifier for a school class.
    ClassId,
    "class"
);

id_newtype!(
    /// Unique identifier for a fee component (catalog entry, year-agnostic).
    FeeComponentId,
    "component"
);

id_newtype!(
    /// Unique identifier for a class fee structure (the per-class template row).
    FeeStructureId,
    "structure"
);

id_newtype!(
    /// Unique identifier for a student fee assignment (the ledger anchor row).
    AssignmentId,
    "assignment"
);

id_newtype!(
    /// Unique identifier for a discount applied to an assignment.
    DiscountId,
    "discount"
);

id_newtype!(
    /// Unique identifier for a payment transaction.
    PaymentId,
    "payment"
);

id_newtype!(
    /// Unique identifier for the acting user (supplied by the auth collaborator).
    ActorId,
    "actor"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_namespace_prefix() {
        let id = AssignmentId::new();
        assert!(id.to_string().starts_with("assignment:"));
        let id = TenantId::new();
        assert!(id.to_string().starts_with("tenant:"));
    }

    #[test]
    fn test_ids_are_distinct_types() {
        // Compile-time property; exercised here only for round-trip.
        let raw = Uuid::new_v4();
        let a = AssignmentId::from(raw);
        assert_eq!(a.as_uuid(), &raw);
    }

    #[test]
    fn test_serde_round_trip() {
        let id = DiscountId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: DiscountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
