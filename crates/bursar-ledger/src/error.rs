//! # Ledger Errors
//!
//! The error taxonomy of the engine. Every member except [`LedgerError::Concurrency`]
//! is terminal: the caller must change the request, nothing is retried
//! internally. A failed operation commits nothing — the transaction that
//! would have produced inconsistent amounts rolls back in full, audit row
//! included.

use thiserror::Error;

use bursar_core::{CapabilityAction, FeeRuleError, FeeStructureId, Role};

/// Fixed user-visible message for writes against a closed year.
pub const YEAR_CLOSED_MESSAGE: &str = "This academic year is closed and cannot be modified.";

/// Error type for all ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A pure fee rule was violated (invalid amount, insufficient role,
    /// discount cap exceeded, unparseable stored variant).
    #[error(transparent)]
    Rule(#[from] FeeRuleError),

    /// Write attempted against a CLOSED academic year.
    #[error("{YEAR_CLOSED_MESSAGE}")]
    AcademicYearClosed,

    /// The assignment's fee component forbids discounts.
    #[error("discounts are not allowed for this fee component")]
    DiscountNotAllowed,

    /// Payment would overshoot the remaining balance. The whole request is
    /// rejected; no partial acceptance.
    #[error("payment of {requested} exceeds remaining balance of {remaining}")]
    PaymentExceedsBalance {
        /// Amount the caller tried to pay.
        requested: String,
        /// What is actually still owed.
        remaining: String,
    },

    /// An optional component id does not belong to this tenant/year/class
    /// or is not optional.
    #[error("unknown or non-optional fee structure {0}")]
    UnknownStructure(FeeStructureId),

    /// A referenced row is absent or belongs to another tenant. Cross-tenant
    /// references are indistinguishable from missing rows by design.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"assignment"`.
        entity: &'static str,
        /// The id that failed to resolve.
        id: String,
    },

    /// A uniqueness rule was violated (e.g. duplicate fee structure for a
    /// class/component/year triple).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The actor's role lacks the module permission for this operation.
    #[error("role {role} lacks {module}.{action}")]
    CapabilityDenied {
        /// Role the actor holds.
        role: Role,
        /// Permission module, e.g. `"fees"`.
        module: &'static str,
        /// The denied action.
        action: CapabilityAction,
    },

    /// The storage layer reported a serialization failure on the locked
    /// row. Retryable — the only non-terminal member of the taxonomy.
    #[error("storage serialization conflict, retry the request")]
    Concurrency,

    /// Any other storage failure.
    #[error("storage error: {0}")]
    Storage(rusqlite::Error),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;
        match &e {
            rusqlite::Error::SqliteFailure(f, _) => match f.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => LedgerError::Concurrency,
                ErrorCode::ConstraintViolation => {
                    LedgerError::Conflict(e.to_string())
                }
                _ => LedgerError::Storage(e),
            },
            _ => LedgerError::Storage(e),
        }
    }
}

impl LedgerError {
    /// Whether the caller may retry the identical request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_concurrency_is_retryable() {
        assert!(LedgerError::Concurrency.is_retryable());
        assert!(!LedgerError::AcademicYearClosed.is_retryable());
        assert!(!LedgerError::DiscountNotAllowed.is_retryable());
    }

    #[test]
    fn test_year_closed_uses_fixed_message() {
        assert_eq!(
            LedgerError::AcademicYearClosed.to_string(),
            "This academic year is closed and cannot be modified."
        );
    }
}
