//! # Rule Errors
//!
//! Violations of the pure fee rules. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations. Storage and
//! precondition failures (closed year, missing rows, serialization
//! conflicts) live in `bursar-ledger`'s error type; this enum covers only
//! what the side-effect-free rule layer can reject on its own.

use rust_decimal::Decimal;
use thiserror::Error;

/// A violation of the pure fee rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeRuleError {
    /// A monetary amount is malformed, non-positive where positivity is
    /// required, or carries more than 2 fraction digits.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A stored or supplied enum value is outside its variant set.
    #[error("unknown {kind}: {value}")]
    UnknownVariant {
        /// Which enum was being parsed.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The effective discount percentage exceeds the non-admin ceiling and
    /// the actor does not hold an admin-tier role.
    #[error(
        "discount of {effective_percent}% of the original amount requires an admin-tier role (actor holds {actor_role})"
    )]
    InsufficientRole {
        /// Role the actor holds.
        actor_role: String,
        /// Effective percentage of the original amount being discounted.
        effective_percent: Decimal,
    },

    /// A required name or code is missing or blank.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Active discounts plus the requested one would exceed the original
    /// amount.
    #[error("total discount would exceed original amount ({active_total} active + {requested} requested > {original})")]
    DiscountExceedsOriginal {
        /// Sum of currently active discounts.
        active_total: String,
        /// The requested discount's computed amount.
        requested: String,
        /// The assignment's frozen original amount.
        original: String,
    },

    /// The requested discount would push the payable amount below what
    /// has already been paid.
    #[error("discount of {requested} would reduce the payable amount to {new_final}, below the {paid} already paid")]
    DiscountBelowPaid {
        /// The requested discount's computed amount.
        requested: String,
        /// The payable amount the discount would produce.
        new_final: String,
        /// The amount already recorded against the assignment.
        paid: String,
    },
}
