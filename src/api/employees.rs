// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Employee management by company owners.
//!
//! Every target is checked against the caller's company after loading.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::accounts;
use crate::{
    auth::{ownership::managed_employee, AuthError, Authorized, OwnerOnly, TenantClass, TenantRole},
    error::ApiError,
    mail::MailMessage,
    models::{CreateIdentityRequest, IdentityResponse},
    state::AppState,
    storage::Identity,
};

/// Create an employee in the caller's company. Employees start verified.
#[utoipa::path(
    post,
    path = "/v1/owner/employees",
    tag = "Employees",
    security(("bearer" = [])),
    request_body = CreateIdentityRequest,
    responses(
        (status = 201, description = "Employee created", body = IdentityResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 403, description = "Owner required", body = crate::error::ErrorBody),
        (status = 409, description = "Contact already registered", body = crate::error::ErrorBody)
    )
)]
pub async fn create_employee(
    Authorized(principal): Authorized<OwnerOnly>,
    State(state): State<AppState>,
    Json(request): Json<CreateIdentityRequest>,
) -> Result<(StatusCode, Json<IdentityResponse>), ApiError> {
    let company_id = principal.company_id.ok_or(AuthError::Forbidden)?;
    let new = accounts::prepare(&request.name, &request.contact, &request.secret, None).await?;
    let identity = Identity::new(
        new.name,
        &new.contact,
        new.secret_hash,
        TenantRole::Employee,
        Some(principal.id),
    )
    .with_company(company_id);
    let identity = accounts::insert::<TenantClass>(&state, identity).await?;

    accounts::notify(
        &state,
        MailMessage::account_created(&identity.contact, &identity.name, "employee"),
    )
    .await;

    Ok((StatusCode::CREATED, Json(identity.into())))
}

/// Deactivate an employee of the caller's company and end their session.
#[utoipa::path(
    put,
    path = "/v1/owner/employees/{id}/deactivate",
    tag = "Employees",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deactivated", body = IdentityResponse),
        (status = 403, description = "Not an employee of the caller's company", body = crate::error::ErrorBody),
        (status = 404, description = "No such account", body = crate::error::ErrorBody)
    )
)]
pub async fn deactivate_employee(
    Authorized(principal): Authorized<OwnerOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    let target = accounts::load::<TenantClass>(&state, id).await?;
    managed_employee(&principal, &target)?;
    let updated = accounts::set_active::<TenantClass>(&state, id, false, principal.id).await?;
    Ok(Json(updated.into()))
}

/// Reactivate an employee of the caller's company.
#[utoipa::path(
    put,
    path = "/v1/owner/employees/{id}/activate",
    tag = "Employees",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee activated", body = IdentityResponse),
        (status = 403, description = "Not an employee of the caller's company", body = crate::error::ErrorBody),
        (status = 404, description = "No such account", body = crate::error::ErrorBody)
    )
)]
pub async fn activate_employee(
    Authorized(principal): Authorized<OwnerOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    let target = accounts::load::<TenantClass>(&state, id).await?;
    managed_employee(&principal, &target)?;
    let updated = accounts::set_active::<TenantClass>(&state, id, true, principal.id).await?;
    Ok(Json(updated.into()))
}

/// Soft-delete an employee of the caller's company and end their session.
#[utoipa::path(
    delete,
    path = "/v1/owner/employees/{id}",
    tag = "Employees",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted", body = IdentityResponse),
        (status = 403, description = "Not an employee of the caller's company", body = crate::error::ErrorBody),
        (status = 404, description = "No such account", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_employee(
    Authorized(principal): Authorized<OwnerOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    let target = accounts::load::<TenantClass>(&state, id).await?;
    managed_employee(&principal, &target)?;
    let deleted = accounts::soft_delete::<TenantClass>(&state, id, principal.id).await?;
    Ok(Json(deleted.into()))
}
