//! # Pure Fee Rules
//!
//! The numerical core of the engine: discount resolution, the admin
//! approval gate, the discount-sum cap, and status derivation. Everything
//! here is a total function over values — no storage, no clock, no actor
//! lookup — so the invariants can be tested exhaustively in isolation.
//!
//! Callers (the ledger crate) sequence these checks inside a single
//! storage transaction; the ordering guarantees are documented on each
//! function.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{DiscountKind, FeeStatus, Role};
use crate::error::FeeRuleError;
use crate::money::Money;

/// Largest effective discount percentage a non-admin role may approve.
pub const NON_ADMIN_DISCOUNT_CEILING_PERCENT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Resolve a discount to its concrete amount against the assignment's
/// frozen original amount.
///
/// Fixed discounts pass through unchanged; percentages are resolved as
/// `round(original × value / 100, 2)` with half-away-from-zero rounding.
/// The result is frozen on the discount row at creation time — because
/// `original_amount` never changes after creation, the computed amount can
/// never drift from what was approved.
pub fn resolve_discount(kind: DiscountKind, original: Money) -> Result<Money, FeeRuleError> {
    match kind {
        DiscountKind::Fixed(amount) => {
            if !amount.is_positive() {
                return Err(FeeRuleError::InvalidAmount(
                    "fixed discount must be greater than zero".to_string(),
                ));
            }
            Ok(amount)
        }
        DiscountKind::Percentage(rate) => {
            if rate <= Decimal::ZERO {
                return Err(FeeRuleError::InvalidAmount(
                    "percentage discount must be greater than zero".to_string(),
                ));
            }
            let raw = original.as_decimal() * rate / HUNDRED;
            let rounded =
                raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let computed = Money::new(rounded)?;
            if !computed.is_positive() {
                return Err(FeeRuleError::InvalidAmount(format!(
                    "{rate}% of {original} rounds to zero"
                )));
            }
            Ok(computed)
        }
    }
}

/// The effective percentage of the original amount a computed discount
/// represents.
///
/// Only meaningful for a positive original amount; callers run the cap
/// check first, which rejects any discount against a zero original.
pub fn effective_percent(computed: Money, original: Money) -> Decimal {
    (computed.as_decimal() / original.as_decimal() * HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Enforce the admin approval gate.
///
/// A discount whose effective percentage of the original amount exceeds
/// [`NON_ADMIN_DISCOUNT_CEILING_PERCENT`] requires an admin-tier role.
/// The gate is on the *effective* percentage, so a FIXED discount worth
/// 25% of the original is gated exactly like a 25% percentage discount.
pub fn check_role_gate(
    actor_role: Role,
    computed: Money,
    original: Money,
) -> Result<(), FeeRuleError> {
    if !original.is_positive() {
        // Cap check rejects any discount on a zero original before this
        // gate is consulted; nothing to divide by here.
        return Ok(());
    }
    let pct = effective_percent(computed, original);
    if pct > NON_ADMIN_DISCOUNT_CEILING_PERCENT && !actor_role.is_admin_tier() {
        return Err(FeeRuleError::InsufficientRole {
            actor_role: actor_role.to_string(),
            effective_percent: pct,
        });
    }
    Ok(())
}

/// Enforce the discount-sum cap: active discounts plus the requested one
/// may never exceed the original amount.
pub fn check_discount_cap(
    active_total: Money,
    requested: Money,
    original: Money,
) -> Result<(), FeeRuleError> {
    if active_total + requested > original {
        return Err(FeeRuleError::DiscountExceedsOriginal {
            active_total: active_total.to_string(),
            requested: requested.to_string(),
            original: original.to_string(),
        });
    }
    Ok(())
}

/// Reject a discount that would strand money already paid: the payable
/// amount it produces must still cover the recorded `paid_amount`, or the
/// `paid ≤ final` invariant breaks on commit.
pub fn check_paid_covered(
    requested: Money,
    new_final: Money,
    paid: Money,
) -> Result<(), FeeRuleError> {
    if paid > new_final {
        return Err(FeeRuleError::DiscountBelowPaid {
            requested: requested.to_string(),
            new_final: new_final.to_string(),
            paid: paid.to_string(),
        });
    }
    Ok(())
}

/// Derive an assignment's status from its amounts.
///
/// `PAID` iff `paid == final > 0`; `UNPAID` iff `paid == 0`; `PARTIAL`
/// otherwise. A fully-discounted assignment (`final == 0`) with nothing
/// paid is `UNPAID`, not `PAID` — nothing was owed and nothing moved.
pub fn derive_status(paid: Money, final_amount: Money) -> FeeStatus {
    if paid.is_zero() {
        FeeStatus::Unpaid
    } else if paid == final_amount && final_amount.is_positive() {
        FeeStatus::Paid
    } else {
        FeeStatus::Partial
    }
}

/// Remaining balance on an assignment.
pub fn remaining_balance(final_amount: Money, paid: Money) -> Money {
    final_amount.saturating_sub(paid)
}
