//! # Domain Enums
//!
//! The closed variant sets of the fee ledger. Every enum round-trips
//! through its SCREAMING_SNAKE_CASE wire form: `Display` produces it,
//! `FromStr` parses it, and serde uses the same spelling. Storage persists
//! these strings, so an exhaustive `match` in `FromStr` is the single
//! place a new variant must be taught to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FeeRuleError;
use crate::money::Money;

// ─── Fee Catalog ─────────────────────────────────────────────────────

/// Category of a fee component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeCategory {
    /// Tuition and other academic charges.
    Academic,
    /// Transport / bus fees.
    Transport,
    /// Hostel and boarding charges.
    Hostel,
    /// Anything else.
    Other,
}

impl std::fmt::Display for FeeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Academic => "ACADEMIC",
            Self::Transport => "TRANSPORT",
            Self::Hostel => "HOSTEL",
            Self::Other => "OTHER",
        };
        f.write_str(s)
    }
}

impl FromStr for FeeCategory {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACADEMIC" => Ok(Self::Academic),
            "TRANSPORT" => Ok(Self::Transport),
            "HOSTEL" => Ok(Self::Hostel),
            "OTHER" => Ok(Self::Other),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "fee category",
                value: s.to_string(),
            }),
        }
    }
}

/// Billing frequency of a class fee structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    /// Charged once for the academic year.
    OneTime,
    /// Charged monthly.
    Monthly,
    /// Charged per term.
    TermWise,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OneTime => "ONE_TIME",
            Self::Monthly => "MONTHLY",
            Self::TermWise => "TERM_WISE",
        };
        f.write_str(s)
    }
}

impl FromStr for Frequency {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONE_TIME" => Ok(Self::OneTime),
            "MONTHLY" => Ok(Self::Monthly),
            "TERM_WISE" => Ok(Self::TermWise),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "frequency",
                value: s.to_string(),
            }),
        }
    }
}

// ─── Assignments ─────────────────────────────────────────────────────

/// How a student fee assignment came into being.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentSource {
    /// Materialized from a class fee structure row.
    Template,
    /// Created directly with a caller-supplied name and amount.
    Custom,
}

impl std::fmt::Display for AssignmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Template => "TEMPLATE",
            Self::Custom => "CUSTOM",
        };
        f.write_str(s)
    }
}

impl FromStr for AssignmentSource {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEMPLATE" => Ok(Self::Template),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "assignment source",
                value: s.to_string(),
            }),
        }
    }
}

/// Payment status of an assignment.
///
/// Always derived from `(paid_amount, final_amount)` via
/// [`crate::rules::derive_status`]; never settable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeStatus {
    /// Nothing paid yet.
    Unpaid,
    /// Some, but not all, of the final amount paid.
    Partial,
    /// Fully paid (and the final amount is non-zero).
    Paid,
}

impl std::fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unpaid => "UNPAID",
            Self::Partial => "PARTIAL",
            Self::Paid => "PAID",
        };
        f.write_str(s)
    }
}

impl FromStr for FeeStatus {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNPAID" => Ok(Self::Unpaid),
            "PARTIAL" => Ok(Self::Partial),
            "PAID" => Ok(Self::Paid),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "fee status",
                value: s.to_string(),
            }),
        }
    }
}

// ─── Discounts ───────────────────────────────────────────────────────

/// Administrative category of a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountCategory {
    /// From the tenant's master discount list.
    Master,
    /// Ad-hoc, named by the caller.
    Custom,
    /// Applied by the platform itself.
    System,
}

impl std::fmt::Display for DiscountCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Master => "MASTER",
            Self::Custom => "CUSTOM",
            Self::System => "SYSTEM",
        };
        f.write_str(s)
    }
}

impl FromStr for DiscountCategory {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MASTER" => Ok(Self::Master),
            "CUSTOM" => Ok(Self::Custom),
            "SYSTEM" => Ok(Self::System),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "discount category",
                value: s.to_string(),
            }),
        }
    }
}

/// The value of a discount: a fixed amount or a percentage of the
/// assignment's original amount.
///
/// Resolution to a concrete amount happens exactly once, at creation, via
/// [`crate::rules::resolve_discount`]; the result is frozen on the
/// discount row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// A fixed monetary reduction.
    Fixed(Money),
    /// A percentage of the original amount, resolved at creation time.
    Percentage(Decimal),
}

// ─── Payments ────────────────────────────────────────────────────────

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    /// Unified Payments Interface.
    Upi,
    /// Debit/credit card.
    Card,
    /// Cash at the school office.
    Cash,
    /// Bank transfer.
    Bank,
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Upi => "UPI",
            Self::Card => "CARD",
            Self::Cash => "CASH",
            Self::Bank => "BANK",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentMode {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPI" => Ok(Self::Upi),
            "CARD" => Ok(Self::Card),
            "CASH" => Ok(Self::Cash),
            "BANK" => Ok(Self::Bank),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "payment mode",
                value: s.to_string(),
            }),
        }
    }
}

// ─── Audit ───────────────────────────────────────────────────────────

/// What kind of mutation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A row was created.
    Create,
    /// A row's derived amounts or status changed.
    Update,
    /// A row was deactivated (never deleted).
    Deactivate,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Deactivate => "DEACTIVATE",
        };
        f.write_str(s)
    }
}

impl FromStr for AuditAction {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DEACTIVATE" => Ok(Self::Deactivate),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "audit action",
                value: s.to_string(),
            }),
        }
    }
}

// ─── Roles ───────────────────────────────────────────────────────────

/// The resolved role of the acting user.
///
/// Supplied by the external auth collaborator; this engine never resolves
/// roles itself, it only consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform-wide superuser.
    SuperAdmin,
    /// Platform operations admin.
    PlatformAdmin,
    /// Tenant (school) administrator.
    Admin,
    /// Accounts office staff.
    Accountant,
    /// Teaching staff.
    Teacher,
    /// Student / guardian self-service.
    Student,
}

impl Role {
    /// Whether this role sits in the admin tier that may approve
    /// discounts above the 20% ceiling.
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::PlatformAdmin | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::PlatformAdmin => "PLATFORM_ADMIN",
            Self::Admin => "ADMIN",
            Self::Accountant => "ACCOUNTANT",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "PLATFORM_ADMIN" => Ok(Self::PlatformAdmin),
            "ADMIN" => Ok(Self::Admin),
            "ACCOUNTANT" => Ok(Self::Accountant),
            "TEACHER" => Ok(Self::Teacher),
            "STUDENT" => Ok(Self::Student),
            _ => Err(FeeRuleError::UnknownVariant {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trips() {
        for cat in [
            FeeCategory::Academic,
            FeeCategory::Transport,
            FeeCategory::Hostel,
            FeeCategory::Other,
        ] {
            assert_eq!(cat.to_string().parse::<FeeCategory>().unwrap(), cat);
        }
        for st in [FeeStatus::Unpaid, FeeStatus::Partial, FeeStatus::Paid] {
            assert_eq!(st.to_string().parse::<FeeStatus>().unwrap(), st);
        }
        for mode in [
            PaymentMode::Upi,
            PaymentMode::Card,
            PaymentMode::Cash,
            PaymentMode::Bank,
        ] {
            assert_eq!(mode.to_string().parse::<PaymentMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let err = "CHEQUE".parse::<PaymentMode>().unwrap_err();
        assert!(matches!(err, FeeRuleError::UnknownVariant { .. }));
    }

    #[test]
    fn test_admin_tier_membership() {
        assert!(Role::SuperAdmin.is_admin_tier());
        assert!(Role::PlatformAdmin.is_admin_tier());
        assert!(Role::Admin.is_admin_tier());
        assert!(!Role::Accountant.is_admin_tier());
        assert!(!Role::Teacher.is_admin_tier());
        assert!(!Role::Student.is_admin_tier());
    }

    #[test]
    fn test_discount_kind_serde_shape() {
        let k = DiscountKind::Percentage(Decimal::new(10, 0));
        let json = serde_json::to_value(&k).unwrap();
        assert_eq!(json["type"], "PERCENTAGE");
    }
}
