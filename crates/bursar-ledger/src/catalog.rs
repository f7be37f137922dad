//! # Fee Catalog
//!
//! Tenant-scoped fee component definitions and the per-class, per-year
//! fee structures built from them. Components are never deleted, only
//! deactivated; structures are effectively immutable once an assignment
//! references them — assignments freeze amounts at creation, so catalog
//! edits never reach existing obligations.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use serde_json::json;

use bursar_core::{
    AcademicYearId, CapabilityAction, CapabilityCheck, ClassId, FeeCategory, FeeComponentId,
    FeeRuleError, FeeStructureId, Frequency, Money, TenantId,
};

use crate::audit;
use crate::error::LedgerError;
use crate::gate::check_writable;
use crate::model::{ClassFeeStructure, FeeComponent};
use crate::{require_capability, ActorContext};

use bursar_core::AuditAction;

// ─── Fee Components ──────────────────────────────────────────────────

/// Input for a new fee component.
#[derive(Debug, Clone)]
pub struct NewFeeComponent {
    pub name: String,
    pub code: String,
    pub category: FeeCategory,
    pub allow_discount: bool,
    pub is_mandatory_default: bool,
}

/// Partial update of a fee component. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct FeeComponentUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub category: Option<FeeCategory>,
    pub allow_discount: Option<bool>,
    pub is_mandatory_default: Option<bool>,
    pub is_active: Option<bool>,
}

/// Create a catalog component. The (tenant, code) pair is unique.
pub fn create_fee_component(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    new: NewFeeComponent,
) -> Result<FeeComponent, LedgerError> {
    require_capability(caps, ctx, CapabilityAction::Create)?;
    if new.name.trim().is_empty() || new.code.trim().is_empty() {
        return Err(FeeRuleError::InvalidName(
            "component name and code must be non-empty".to_string(),
        )
        .into());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let id = FeeComponentId::new();
    let now = Utc::now().to_rfc3339();
    tx.execute(
        "INSERT INTO fee_components
             (id, tenant_id, name, code, category, allow_discount, is_mandatory_default, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
        params![
            id.as_uuid().to_string(),
            ctx.tenant.as_uuid().to_string(),
            new.name.trim(),
            new.code.trim(),
            new.category.to_string(),
            new.allow_discount,
            new.is_mandatory_default,
            now,
        ],
    )?;
    audit::record(
        &tx,
        ctx.tenant,
        "fee_components",
        *id.as_uuid(),
        AuditAction::Create,
        None,
        json!({
            "name": new.name.trim(),
            "code": new.code.trim(),
            "category": new.category.to_string(),
            "allow_discount": new.allow_discount,
            "is_mandatory_default": new.is_mandatory_default,
        }),
        ctx.actor,
    )?;
    let component = get_component(&tx, ctx.tenant, id)?;
    tx.commit()?;
    tracing::info!(component = %id, code = component.code, "fee component created");
    Ok(component)
}

/// Apply a partial update. Deactivation goes through here too —
/// components are never deleted.
pub fn update_fee_component(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    id: FeeComponentId,
    patch: FeeComponentUpdate,
) -> Result<FeeComponent, LedgerError> {
    require_capability(caps, ctx, CapabilityAction::Update)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let before = get_component(&tx, ctx.tenant, id)?;

    let name = patch.name.unwrap_or_else(|| before.name.clone());
    let code = patch.code.unwrap_or_else(|| before.code.clone());
    let category = patch.category.unwrap_or(before.category);
    let allow_discount = patch.allow_discount.unwrap_or(before.allow_discount);
    let is_mandatory_default = patch
        .is_mandatory_default
        .unwrap_or(before.is_mandatory_default);
    let is_active = patch.is_active.unwrap_or(before.is_active);

    tx.execute(
        "UPDATE fee_components
         SET name = ?1, code = ?2, category = ?3, allow_discount = ?4,
             is_mandatory_default = ?5, is_active = ?6, updated_at = ?7
         WHERE id = ?8 AND tenant_id = ?9",
        params![
            name,
            code,
            category.to_string(),
            allow_discount,
            is_mandatory_default,
            is_active,
            Utc::now().to_rfc3339(),
            id.as_uuid().to_string(),
            ctx.tenant.as_uuid().to_string(),
        ],
    )?;
    let after = get_component(&tx, ctx.tenant, id)?;
    audit::record(
        &tx,
        ctx.tenant,
        "fee_components",
        *id.as_uuid(),
        if before.is_active && !after.is_active {
            AuditAction::Deactivate
        } else {
            AuditAction::Update
        },
        Some(json!({
            "name": before.name,
            "code": before.code,
            "category": before.category.to_string(),
            "allow_discount": before.allow_discount,
            "is_mandatory_default": before.is_mandatory_default,
            "is_active": before.is_active,
        })),
        json!({
            "name": after.name,
            "code": after.code,
            "category": after.category.to_string(),
            "allow_discount": after.allow_discount,
            "is_mandatory_default": after.is_mandatory_default,
            "is_active": after.is_active,
        }),
        ctx.actor,
    )?;
    tx.commit()?;
    Ok(after)
}

/// Fetch one component, tenant-scoped.
pub fn get_component(
    conn: &Connection,
    tenant: TenantId,
    id: FeeComponentId,
) -> Result<FeeComponent, LedgerError> {
    conn.query_row(
        "SELECT * FROM fee_components WHERE id = ?1 AND tenant_id = ?2",
        params![id.as_uuid().to_string(), tenant.as_uuid().to_string()],
        FeeComponent::from_row,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "fee component",
        id: id.to_string(),
    })
}

/// List components for a tenant, optionally including deactivated ones.
pub fn list_components(
    conn: &Connection,
    tenant: TenantId,
    include_inactive: bool,
) -> Result<Vec<FeeComponent>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM fee_components
         WHERE tenant_id = ?1 AND (is_active = 1 OR ?2)
         ORDER BY code",
    )?;
    let rows = stmt.query_map(
        params![tenant.as_uuid().to_string(), include_inactive],
        FeeComponent::from_row,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

// ─── Class Fee Structures ────────────────────────────────────────────

/// Input for a new class fee structure (template row).
#[derive(Debug, Clone)]
pub struct NewFeeStructure {
    pub academic_year_id: AcademicYearId,
    pub class_id: ClassId,
    pub fee_component_id: FeeComponentId,
    pub amount: Money,
    pub frequency: Frequency,
    pub due_date: Option<NaiveDate>,
    /// Defaults to the component's `is_mandatory_default` when absent.
    pub is_mandatory: Option<bool>,
}

/// Create a template row for (year, class, component). One per triple;
/// a duplicate is a conflict. Requires an ACTIVE year and an active
/// component.
pub fn create_fee_structure(
    conn: &mut Connection,
    caps: &dyn CapabilityCheck,
    ctx: &ActorContext,
    new: NewFeeStructure,
) -> Result<ClassFeeStructure, LedgerError> {
    require_capability(caps, ctx, CapabilityAction::Create)?;
    if !new.amount.is_positive() {
        return Err(FeeRuleError::InvalidAmount(
            "structure amount must be greater than zero".to_string(),
        )
        .into());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    check_writable(&tx, ctx.tenant, new.academic_year_id)?;
    let component = get_component(&tx, ctx.tenant, new.fee_component_id)?;
    if !component.is_active {
        return Err(LedgerError::NotFound {
            entity: "fee component",
            id: new.fee_component_id.to_string(),
        });
    }
    let is_mandatory = new.is_mandatory.unwrap_or(component.is_mandatory_default);

    let id = FeeStructureId::new();
    tx.execute(
        "INSERT INTO class_fee_structures
             (id, tenant_id, academic_year_id, class_id, fee_component_id, amount, frequency, due_date, is_mandatory, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10)",
        params![
            id.as_uuid().to_string(),
            ctx.tenant.as_uuid().to_string(),
            new.academic_year_id.as_uuid().to_string(),
            new.class_id.as_uuid().to_string(),
            new.fee_component_id.as_uuid().to_string(),
            new.amount.to_string(),
            new.frequency.to_string(),
            new.due_date.map(|d| d.to_string()),
            is_mandatory,
            Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| match LedgerError::from(e) {
        LedgerError::Conflict(_) => LedgerError::Conflict(
            "this class already has this fee component for this academic year".to_string(),
        ),
        other => other,
    })?;
    audit::record(
        &tx,
        ctx.tenant,
        "class_fee_structures",
        *id.as_uuid(),
        AuditAction::Create,
        None,
        json!({
            "academic_year_id": new.academic_year_id.as_uuid(),
            "class_id": new.class_id.as_uuid(),
            "fee_component_id": new.fee_component_id.as_uuid(),
            "amount": new.amount.to_string(),
            "frequency": new.frequency.to_string(),
            "is_mandatory": is_mandatory,
        }),
        ctx.actor,
    )?;
    let structure = get_structure(&tx, ctx.tenant, id)?;
    tx.commit()?;
    tracing::info!(structure = %id, "class fee structure created");
    Ok(structure)
}

/// Fetch one structure, tenant-scoped.
pub fn get_structure(
    conn: &Connection,
    tenant: TenantId,
    id: FeeStructureId,
) -> Result<ClassFeeStructure, LedgerError> {
    conn.query_row(
        "SELECT * FROM class_fee_structures WHERE id = ?1 AND tenant_id = ?2",
        params![id.as_uuid().to_string(), tenant.as_uuid().to_string()],
        ClassFeeStructure::from_row,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "fee structure",
        id: id.to_string(),
    })
}

/// Active structures for a year, optionally narrowed to one class.
pub fn list_structures(
    conn: &Connection,
    tenant: TenantId,
    year: AcademicYearId,
    class: Option<ClassId>,
) -> Result<Vec<ClassFeeStructure>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM class_fee_structures
         WHERE tenant_id = ?1 AND academic_year_id = ?2 AND is_active = 1
           AND (?3 IS NULL OR class_id = ?3)
         ORDER BY class_id, fee_component_id",
    )?;
    let rows = stmt.query_map(
        params![
            tenant.as_uuid().to_string(),
            year.as_uuid().to_string(),
            class.map(|c| c.as_uuid().to_string()),
        ],
        ClassFeeStructure::from_row,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// One line of the per-class fee overview: the structure joined with its
/// component's name and code.
#[derive(Debug, Clone, Serialize)]
pub struct ClassFeeLine {
    #[serde(flatten)]
    pub structure: ClassFeeStructure,
    pub component_name: String,
    pub component_code: String,
}

/// All class fees for a year, grouped by class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassFeeOverview {
    pub class_id: ClassId,
    pub items: Vec<ClassFeeLine>,
}

/// Read every active structure of the year with component details,
/// grouped by class. Feeds the fee-setup screen.
pub fn class_fee_overview(
    conn: &Connection,
    tenant: TenantId,
    year: AcademicYearId,
) -> Result<Vec<ClassFeeOverview>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT s.*, c.name AS component_name, c.code AS component_code
         FROM class_fee_structures s
         JOIN fee_components c ON c.id = s.fee_component_id
         WHERE s.tenant_id = ?1 AND s.academic_year_id = ?2
           AND s.is_active = 1 AND c.is_active = 1
         ORDER BY s.class_id, c.name",
    )?;
    let rows = stmt.query_map(
        params![tenant.as_uuid().to_string(), year.as_uuid().to_string()],
        |row| {
            Ok(ClassFeeLine {
                structure: ClassFeeStructure::from_row(row)?,
                component_name: row.get("component_name")?,
                component_code: row.get("component_code")?,
            })
        },
    )?;

    let mut grouped: Vec<ClassFeeOverview> = Vec::new();
    for row in rows {
        let line = row?;
        let class_id = line.structure.class_id;
        match grouped.iter_mut().find(|g| g.class_id == class_id) {
            Some(g) => g.items.push(line),
            None => grouped.push(ClassFeeOverview {
                class_id,
                items: vec![line],
            }),
        }
    }
    Ok(grouped)
}
