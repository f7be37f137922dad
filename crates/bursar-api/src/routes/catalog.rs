//! # Fee Catalog Routes
//!
//! Routes:
//! - POST  /fee-components — create a catalog component
//! - GET   /fee-components — list components (`include_inactive` query)
//! - PATCH /fee-components/{id} — partial update / deactivation
//! - POST  /fees/class — create a class fee structure
//! - GET   /fees/class — per-class fee overview for a year

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use bursar_core::{FeeCategory, FeeComponentId, Frequency, Money};
use bursar_ledger::catalog::{
    self, ClassFeeOverview, FeeComponentUpdate, NewFeeComponent, NewFeeStructure,
};
use bursar_ledger::model::{ClassFeeStructure, FeeComponent};

use crate::error::AppError;
use crate::extractors::Actor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fee-components", post(create_component).get(list_components))
        .route("/fee-components/{id}", axum::routing::patch(update_component))
        .route("/fees/class", post(create_structure).get(class_overview))
        .route("/fees/class/{class_id}", get(list_class_structures))
}

#[derive(Debug, Deserialize)]
pub struct CreateComponentRequest {
    pub name: String,
    pub code: String,
    pub category: FeeCategory,
    pub allow_discount: bool,
    pub is_mandatory_default: bool,
}

async fn create_component(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateComponentRequest>,
) -> Result<(StatusCode, Json<FeeComponent>), AppError> {
    let mut conn = state.db.lock();
    let component = catalog::create_fee_component(
        &mut conn,
        state.caps.as_ref(),
        &actor.0,
        NewFeeComponent {
            name: body.name,
            code: body.code,
            category: body.category,
            allow_discount: body.allow_discount,
            is_mandatory_default: body.is_mandatory_default,
        },
    )?;
    Ok((StatusCode::CREATED, Json(component)))
}

#[derive(Debug, Deserialize)]
pub struct ComponentListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

async fn list_components(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ComponentListQuery>,
) -> Result<Json<Vec<FeeComponent>>, AppError> {
    let conn = state.db.lock();
    let components = catalog::list_components(&conn, actor.0.tenant, query.include_inactive)?;
    Ok(Json(components))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateComponentRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub category: Option<FeeCategory>,
    pub allow_discount: Option<bool>,
    pub is_mandatory_default: Option<bool>,
    pub is_active: Option<bool>,
}

async fn update_component(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateComponentRequest>,
) -> Result<Json<FeeComponent>, AppError> {
    let mut conn = state.db.lock();
    let component = catalog::update_fee_component(
        &mut conn,
        state.caps.as_ref(),
        &actor.0,
        FeeComponentId::from(id),
        FeeComponentUpdate {
            name: body.name,
            code: body.code,
            category: body.category,
            allow_discount: body.allow_discount,
            is_mandatory_default: body.is_mandatory_default,
            is_active: body.is_active,
        },
    )?;
    Ok(Json(component))
}

#[derive(Debug, Deserialize)]
pub struct CreateStructureRequest {
    pub academic_year_id: Uuid,
    pub class_id: Uuid,
    pub fee_component_id: Uuid,
    pub amount: Money,
    pub frequency: Frequency,
    pub due_date: Option<NaiveDate>,
    pub is_mandatory: Option<bool>,
}

async fn create_structure(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateStructureRequest>,
) -> Result<(StatusCode, Json<ClassFeeStructure>), AppError> {
    let mut conn = state.db.lock();
    let structure = catalog::create_fee_structure(
        &mut conn,
        state.caps.as_ref(),
        &actor.0,
        NewFeeStructure {
            academic_year_id: body.academic_year_id.into(),
            class_id: body.class_id.into(),
            fee_component_id: body.fee_component_id.into(),
            amount: body.amount,
            frequency: body.frequency,
            due_date: body.due_date,
            is_mandatory: body.is_mandatory,
        },
    )?;
    Ok((StatusCode::CREATED, Json(structure)))
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub academic_year_id: Uuid,
}

async fn class_overview(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<ClassFeeOverview>>, AppError> {
    let conn = state.db.lock();
    let overview =
        catalog::class_fee_overview(&conn, actor.0.tenant, query.academic_year_id.into())?;
    Ok(Json(overview))
}

async fn list_class_structures(
    State(state): State<AppState>,
    actor: Actor,
    Path(class_id): Path<Uuid>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<ClassFeeStructure>>, AppError> {
    let conn = state.db.lock();
    let structures = catalog::list_structures(
        &conn,
        actor.0.tenant,
        query.academic_year_id.into(),
        Some(class_id.into()),
    )?;
    Ok(Json(structures))
}
