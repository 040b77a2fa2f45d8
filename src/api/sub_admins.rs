// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sub-admin management. Super-admins only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::accounts;
use crate::{
    auth::{AdminClass, AdminRole, Authorized, SuperAdminOnly},
    error::ApiError,
    mail::MailMessage,
    models::{CreateIdentityRequest, IdentityResponse},
    state::AppState,
    storage::Identity,
};

/// Load a sub-admin; other admin rows are invisible here.
async fn load_sub_admin(state: &AppState, id: Uuid) -> Result<Identity<AdminRole>, ApiError> {
    let identity = accounts::load::<AdminClass>(state, id).await?;
    if identity.role != AdminRole::SubAdmin {
        return Err(ApiError::not_found("Account not found"));
    }
    Ok(identity)
}

/// Create a sub-admin.
#[utoipa::path(
    post,
    path = "/v1/admin/sub-admins",
    tag = "Sub-admins",
    security(("bearer" = [])),
    request_body = CreateIdentityRequest,
    responses(
        (status = 201, description = "Sub-admin created", body = IdentityResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 403, description = "Super-admin required", body = crate::error::ErrorBody),
        (status = 409, description = "Contact already registered", body = crate::error::ErrorBody)
    )
)]
pub async fn create_sub_admin(
    Authorized(principal): Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Json(request): Json<CreateIdentityRequest>,
) -> Result<(StatusCode, Json<IdentityResponse>), ApiError> {
    let new = accounts::prepare(&request.name, &request.contact, &request.secret, None).await?;
    let identity = Identity::new(
        new.name,
        &new.contact,
        new.secret_hash,
        AdminRole::SubAdmin,
        Some(principal.id),
    );
    let identity = accounts::insert::<AdminClass>(&state, identity).await?;

    accounts::notify(
        &state,
        MailMessage::account_created(&identity.contact, &identity.name, "sub_admin"),
    )
    .await;

    Ok((StatusCode::CREATED, Json(identity.into())))
}

/// Deactivate a sub-admin and end their session.
#[utoipa::path(
    put,
    path = "/v1/admin/sub-admins/{id}/deactivate",
    tag = "Sub-admins",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Sub-admin id")),
    responses(
        (status = 200, description = "Sub-admin deactivated", body = IdentityResponse),
        (status = 404, description = "No such sub-admin", body = crate::error::ErrorBody)
    )
)]
pub async fn deactivate_sub_admin(
    Authorized(principal): Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    load_sub_admin(&state, id).await?;
    let updated = accounts::set_active::<AdminClass>(&state, id, false, principal.id).await?;
    Ok(Json(updated.into()))
}

/// Reactivate a sub-admin. They must log in again.
#[utoipa::path(
    put,
    path = "/v1/admin/sub-admins/{id}/activate",
    tag = "Sub-admins",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Sub-admin id")),
    responses(
        (status = 200, description = "Sub-admin activated", body = IdentityResponse),
        (status = 404, description = "No such sub-admin", body = crate::error::ErrorBody)
    )
)]
pub async fn activate_sub_admin(
    Authorized(principal): Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    load_sub_admin(&state, id).await?;
    let updated = accounts::set_active::<AdminClass>(&state, id, true, principal.id).await?;
    Ok(Json(updated.into()))
}

/// Soft-delete a sub-admin and end their session.
#[utoipa::path(
    delete,
    path = "/v1/admin/sub-admins/{id}",
    tag = "Sub-admins",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Sub-admin id")),
    responses(
        (status = 200, description = "Sub-admin deleted", body = IdentityResponse),
        (status = 404, description = "No such sub-admin", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_sub_admin(
    Authorized(principal): Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityResponse>, ApiError> {
    load_sub_admin(&state, id).await?;
    let deleted = accounts::soft_delete::<AdminClass>(&state, id, principal.id).await?;
    Ok(Json(deleted.into()))
}
