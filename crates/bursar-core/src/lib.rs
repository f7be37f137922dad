//! # bursar-core — Foundational Types for the Bursar Fee Engine
//!
//! This crate is the bedrock of the Bursar workspace. It defines the
//! type-system primitives that make the fee ledger's invariants hard to
//! violate by construction. Every other crate in the workspace depends on
//! `bursar-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `TenantId`, `StudentId`,
//!    `AssignmentId`, `DiscountId` — all newtypes. You cannot pass a
//!    discount id where an assignment id is expected, and a query scoped by
//!    the wrong tenant does not typecheck into existence by accident.
//!
//! 2. **`Money` is exact.** All monetary quantities are `rust_decimal`
//!    fixed-point values with exactly 2 fraction digits. No `f64` anywhere
//!    in a monetary path; no binary representation error in an invoice.
//!
//! 3. **Status is derived, never stored independently.** `FeeStatus` is a
//!    pure function of `(paid_amount, final_amount)` via
//!    [`rules::derive_status`]. Callers recompute it inside the same
//!    transaction that moves either amount.
//!
//! 4. **Rules are pure.** Discount resolution, the >20% role gate, and the
//!    discount-sum cap live here as side-effect-free functions so they can
//!    be tested exhaustively without a database.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bursar-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross a wire.

pub mod domain;
pub mod error;
pub mod identity;
pub mod money;
pub mod rbac;
pub mod rules;

// Re-export primary types for ergonomic imports.
pub use domain::{
    AssignmentSource, AuditAction, DiscountCategory, DiscountKind, FeeCategory, FeeStatus,
    Frequency, PaymentMode, Role,
};
pub use error::FeeRuleError;
pub use identity::{
    AcademicYearId, ActorId, AssignmentId, ClassId, DiscountId, FeeComponentId, FeeStructureId,
    PaymentId, StudentId, TenantId,
};
pub use money::Money;
pub use rbac::{CapabilityAction, CapabilityCheck, StaticCapabilities};
