//! # Application Error
//!
//! Maps engine errors to structured HTTP responses with proper status
//! codes and error bodies. The only retryable failure is a storage
//! serialization conflict; everything else requires a changed request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use bursar_core::FeeRuleError;
use bursar_ledger::LedgerError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Actor-context headers missing or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Request rejected before any transaction opened.
    #[error("validation error: {0}")]
    Validation(String),

    /// Engine failure, mapped per variant.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Ledger(err) => match err {
                LedgerError::Rule(rule) => match rule {
                    FeeRuleError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
                    FeeRuleError::InvalidAmount(_)
                    | FeeRuleError::InvalidName(_)
                    | FeeRuleError::UnknownVariant { .. }
                    | FeeRuleError::DiscountExceedsOriginal { .. }
                    | FeeRuleError::DiscountBelowPaid { .. } => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                },
                LedgerError::DiscountNotAllowed
                | LedgerError::PaymentExceedsBalance { .. }
                | LedgerError::UnknownStructure(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::AcademicYearClosed
                | LedgerError::Conflict(_)
                | LedgerError::Concurrency => StatusCode::CONFLICT,
                LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
                LedgerError::CapabilityDenied { .. } => StatusCode::FORBIDDEN,
                LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Ledger(err) if err.is_retryable())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
                "retryable": self.retryable(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursar_core::{AssignmentId, FeeStructureId};

    #[test]
    fn test_year_closed_maps_to_conflict() {
        let err = AppError::from(LedgerError::AcademicYearClosed);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(!err.retryable());
    }

    #[test]
    fn test_concurrency_is_retryable_conflict() {
        let err = AppError::from(LedgerError::Concurrency);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.retryable());
    }

    #[test]
    fn test_role_and_capability_failures_are_forbidden() {
        let err = AppError::from(LedgerError::Rule(FeeRuleError::InsufficientRole {
            actor_role: "TEACHER".to_string(),
            effective_percent: rust_decimal::Decimal::new(25, 0),
        }));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unknown_structure_is_unprocessable() {
        let err = AppError::from(LedgerError::UnknownStructure(FeeStructureId::new()));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::from(LedgerError::NotFound {
            entity: "assignment",
            id: AssignmentId::new().to_string(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
