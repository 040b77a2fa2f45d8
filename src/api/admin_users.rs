// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Administrative actions on tenant accounts.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::accounts;
use crate::{
    auth::{AnyAdmin, Authorized, TenantClass},
    error::ApiError,
    models::IdentityResponse,
    state::AppState,
};

/// Deactivate a tenant account and end its session.
#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}/deactivate",
    tag = "Tenant Accounts",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Tenant identity id")),
    responses(
        (status = 200, description = "Account deactivated", body = IdentityResponse),
        (status = 404, description = "No such account", body = crate::error::ErrorBody)
    )
)]
pub async fn deactivate_user(
    Authorized(principal): Authorized<AnyAdmin>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    accounts::load::<TenantClass>(&state, id).await?;
    let updated = accounts::set_active::<TenantClass>(&state, id, false, principal.id).await?;
    Ok(Json(updated.into()))
}

/// Reactivate a deactivated tenant account. No session is opened.
#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}/activate",
    tag = "Tenant Accounts",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Tenant identity id")),
    responses(
        (status = 200, description = "Account activated", body = IdentityResponse),
        (status = 404, description = "No such account", body = crate::error::ErrorBody)
    )
)]
pub async fn activate_user(
    Authorized(principal): Authorized<AnyAdmin>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    accounts::load::<TenantClass>(&state, id).await?;
    let updated = accounts::set_active::<TenantClass>(&state, id, true, principal.id).await?;
    Ok(Json(updated.into()))
}

/// Soft-delete a tenant account and end its session.
#[utoipa::path(
    delete,
    path = "/v1/admin/users/{id}",
    tag = "Tenant Accounts",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Tenant identity id")),
    responses(
        (status = 200, description = "Account deleted", body = IdentityResponse),
        (status = 404, description = "No such account", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_user(
    Authorized(principal): Authorized<AnyAdmin>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    accounts::load::<TenantClass>(&state, id).await?;
    let deleted = accounts::soft_delete::<TenantClass>(&state, id, principal.id).await?;
    Ok(Json(deleted.into()))
}
