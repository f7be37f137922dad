//! # Actor Extractor
//!
//! The upstream auth collaborator resolves the caller and forwards the
//! result as headers; this extractor turns them into the
//! [`ActorContext`] every mutating ledger call demands.

use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use bursar_core::{ActorId, Role, TenantId};
use bursar_ledger::ActorContext;

use crate::error::AppError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const ACTOR_HEADER: &str = "x-actor-id";
pub const ROLE_HEADER: &str = "x-actor-role";

/// Resolved caller identity for fee routes.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub ActorContext);

fn header<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("missing header {name}")))
}

fn header_uuid(parts: &Parts, name: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(header(parts, name)?)
        .map_err(|_| AppError::Unauthorized(format!("header {name} is not a uuid")))
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant = header_uuid(parts, TENANT_HEADER)?;
        let actor = header_uuid(parts, ACTOR_HEADER)?;
        let role = Role::from_str(header(parts, ROLE_HEADER)?)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;
        Ok(Actor(ActorContext {
            tenant: TenantId::from(tenant),
            actor: ActorId::from(actor),
            role,
        }))
    }
}
