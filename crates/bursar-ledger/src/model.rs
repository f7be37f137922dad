//! # Ledger Row Types
//!
//! The persisted entities of the fee ledger, plus the row-mapping helpers
//! shared by the engine modules. These types are also the response bodies
//! of the HTTP layer — monetary fields serialize as exact decimal strings.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

use bursar_core::{
    AcademicYearId, ActorId, AssignmentId, AssignmentSource, AuditAction, ClassId,
    DiscountCategory, DiscountId, DiscountKind, FeeCategory, FeeComponentId, FeeStatus,
    FeeStructureId, Frequency, Money, PaymentId, PaymentMode, StudentId, TenantId,
};

// ─── Row-mapping helpers ─────────────────────────────────────────────

fn conversion_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
}

pub(crate) fn get_uuid(row: &Row<'_>, col: &str) -> rusqlite::Result<Uuid> {
    let s: String = row.get(col)?;
    Uuid::parse_str(&s).map_err(conversion_err)
}

pub(crate) fn get_uuid_opt(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(col)?;
    s.map(|s| Uuid::parse_str(&s).map_err(conversion_err)).transpose()
}

pub(crate) fn get_money(row: &Row<'_>, col: &str) -> rusqlite::Result<Money> {
    let s: String = row.get(col)?;
    Money::from_str(&s).map_err(conversion_err)
}

pub(crate) fn get_parsed<T>(row: &Row<'_>, col: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s: String = row.get(col)?;
    s.parse::<T>().map_err(conversion_err)
}

pub(crate) fn get_timestamp(row: &Row<'_>, col: &str) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(col)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(conversion_err)
}

pub(crate) fn get_date_opt(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let s: Option<String> = row.get(col)?;
    s.map(|s| NaiveDate::from_str(&s).map_err(conversion_err)).transpose()
}

// ─── Fee Catalog ─────────────────────────────────────────────────────

/// Catalog entry for a reusable fee category. Year-agnostic; never
/// deleted, only deactivated.
#[derive(Debug, Clone, Serialize)]
pub struct FeeComponent {
    pub id: FeeComponentId,
    pub tenant_id: TenantId,
    pub name: String,
    pub code: String,
    pub category: FeeCategory,
    pub allow_discount: bool,
    pub is_mandatory_default: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeeComponent {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: FeeComponentId::from(get_uuid(row, "id")?),
            tenant_id: TenantId::from(get_uuid(row, "tenant_id")?),
            name: row.get("name")?,
            code: row.get("code")?,
            category: get_parsed(row, "category")?,
            allow_discount: row.get("allow_discount")?,
            is_mandatory_default: row.get("is_mandatory_default")?,
            is_active: row.get("is_active")?,
            created_at: get_timestamp(row, "created_at")?,
            updated_at: get_timestamp(row, "updated_at")?,
        })
    }
}

/// Template row: the amount charged for a component to a class in a year.
/// Immutable once referenced by an assignment — assignments freeze the
/// amount at creation, so later template edits cannot reach them.
#[derive(Debug, Clone, Serialize)]
pub struct ClassFeeStructure {
    pub id: FeeStructureId,
    pub tenant_id: TenantId,
    pub academic_year_id: AcademicYearId,
    pub class_id: ClassId,
    pub fee_component_id: FeeComponentId,
    pub amount: Money,
    pub frequency: Frequency,
    pub due_date: Option<NaiveDate>,
    pub is_mandatory: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ClassFeeStructure {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: FeeStructureId::from(get_uuid(row, "id")?),
            tenant_id: TenantId::from(get_uuid(row, "tenant_id")?),
            academic_year_id: AcademicYearId::from(get_uuid(row, "academic_year_id")?),
            class_id: ClassId::from(get_uuid(row, "class_id")?),
            fee_component_id: FeeComponentId::from(get_uuid(row, "fee_component_id")?),
            amount: get_money(row, "amount")?,
            frequency: get_parsed(row, "frequency")?,
            due_date: get_date_opt(row, "due_date")?,
            is_mandatory: row.get("is_mandatory")?,
            is_active: row.get("is_active")?,
            created_at: get_timestamp(row, "created_at")?,
        })
    }
}

// ─── Assignments ─────────────────────────────────────────────────────

/// The ledger's anchor row: a frozen per-student fee obligation.
///
/// `original_amount` is set once at creation and never updated by any
/// operation. `final_amount` moves only through the discount engine,
/// `paid_amount` only through the payment ledger, and `status` is always
/// derived from the two inside the same transaction.
#[derive(Debug, Clone, Serialize)]
pub struct StudentFeeAssignment {
    pub id: AssignmentId,
    pub tenant_id: TenantId,
    pub student_id: StudentId,
    pub academic_year_id: AcademicYearId,
    pub source: AssignmentSource,
    pub class_fee_structure_id: Option<FeeStructureId>,
    pub custom_name: Option<String>,
    pub original_amount: Money,
    pub final_amount: Money,
    pub paid_amount: Money,
    pub status: FeeStatus,
    pub created_at: DateTime<Utc>,
}

impl StudentFeeAssignment {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: AssignmentId::from(get_uuid(row, "id")?),
            tenant_id: TenantId::from(get_uuid(row, "tenant_id")?),
            student_id: StudentId::from(get_uuid(row, "student_id")?),
            academic_year_id: AcademicYearId::from(get_uuid(row, "academic_year_id")?),
            source: get_parsed(row, "source")?,
            class_fee_structure_id: get_uuid_opt(row, "class_fee_structure_id")?
                .map(FeeStructureId::from),
            custom_name: row.get("custom_name")?,
            original_amount: get_money(row, "original_amount")?,
            final_amount: get_money(row, "final_amount")?,
            paid_amount: get_money(row, "paid_amount")?,
            status: get_parsed(row, "status")?,
            created_at: get_timestamp(row, "created_at")?,
        })
    }
}

/// An assignment joined with its display name (component name or custom
/// name) for the student fee view.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: StudentFeeAssignment,
    /// Component name for template fees, custom name otherwise.
    pub fee_name: String,
    /// Component code, absent for custom fees.
    pub fee_code: Option<String>,
}

// ─── Discounts ───────────────────────────────────────────────────────

/// A discount applied to an assignment. `computed_amount` is frozen at
/// creation; deactivation flips `is_active` and preserves the row.
#[derive(Debug, Clone, Serialize)]
pub struct StudentFeeDiscount {
    pub id: DiscountId,
    pub tenant_id: TenantId,
    pub student_fee_assignment_id: AssignmentId,
    pub discount_name: String,
    pub category: DiscountCategory,
    #[serde(flatten)]
    pub kind: DiscountKind,
    pub computed_amount: Money,
    pub reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl StudentFeeDiscount {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let kind_tag: String = row.get("kind")?;
        let value: String = row.get("value")?;
        let kind = match kind_tag.as_str() {
            "FIXED" => DiscountKind::Fixed(Money::from_str(&value).map_err(conversion_err)?),
            "PERCENTAGE" => {
                DiscountKind::Percentage(Decimal::from_str(&value).map_err(conversion_err)?)
            }
            other => {
                return Err(conversion_err(bursar_core::FeeRuleError::UnknownVariant {
                    kind: "discount kind",
                    value: other.to_string(),
                }))
            }
        };
        Ok(Self {
            id: DiscountId::from(get_uuid(row, "id")?),
            tenant_id: TenantId::from(get_uuid(row, "tenant_id")?),
            student_fee_assignment_id: AssignmentId::from(get_uuid(
                row,
                "student_fee_assignment_id",
            )?),
            discount_name: row.get("discount_name")?,
            category: get_parsed(row, "category")?,
            kind,
            computed_amount: get_money(row, "computed_amount")?,
            reason: row.get("reason")?,
            is_active: row.get("is_active")?,
            created_at: get_timestamp(row, "created_at")?,
        })
    }
}

// ─── Payments ────────────────────────────────────────────────────────

/// Append-only payment record. Never updated or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentTransaction {
    pub id: PaymentId,
    pub tenant_id: TenantId,
    pub student_fee_assignment_id: AssignmentId,
    pub amount_paid: Money,
    pub payment_mode: PaymentMode,
    pub transaction_reference: Option<String>,
    /// When the money changed hands (caller-suppliable, back-datable).
    pub paid_at: DateTime<Utc>,
    /// When this row was written. Always server time.
    pub recorded_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: PaymentId::from(get_uuid(row, "id")?),
            tenant_id: TenantId::from(get_uuid(row, "tenant_id")?),
            student_fee_assignment_id: AssignmentId::from(get_uuid(
                row,
                "student_fee_assignment_id",
            )?),
            amount_paid: get_money(row, "amount_paid")?,
            payment_mode: get_parsed(row, "payment_mode")?,
            transaction_reference: row.get("transaction_reference")?,
            paid_at: get_timestamp(row, "paid_at")?,
            recorded_at: get_timestamp(row, "recorded_at")?,
        })
    }
}

// ─── Audit ───────────────────────────────────────────────────────────

/// One append-only audit entry per committed mutating call.
#[derive(Debug, Clone, Serialize)]
pub struct FeeAuditLogEntry {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub before_snapshot: Option<serde_json::Value>,
    pub after_snapshot: serde_json::Value,
    pub performed_by: ActorId,
    pub performed_at: DateTime<Utc>,
}

impl FeeAuditLogEntry {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let before: Option<String> = row.get("before_snapshot")?;
        let after: String = row.get("after_snapshot")?;
        Ok(Self {
            id: get_uuid(row, "id")?,
            tenant_id: TenantId::from(get_uuid(row, "tenant_id")?),
            entity_type: row.get("entity_type")?,
            entity_id: get_uuid(row, "entity_id")?,
            action: get_parsed(row, "action")?,
            before_snapshot: before
                .map(|s| serde_json::from_str(&s).map_err(conversion_err))
                .transpose()?,
            after_snapshot: serde_json::from_str(&after).map_err(conversion_err)?,
            performed_by: ActorId::from(get_uuid(row, "performed_by")?),
            performed_at: get_timestamp(row, "performed_at")?,
        })
    }
}
