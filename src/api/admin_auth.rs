// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Administrator session endpoints.

use axum::{extract::State, Json};

use crate::{
    auth::{
        gate::{login, revoke},
        AdminClass, AdminRole, AnyAdmin, Authorized, IdentityClass, RoleName,
    },
    error::ApiError,
    models::{LoginRequest, LoginResponse, MeResponse, MessageResponse},
    state::AppState,
    validation::{validate_contact, validate_login_secret},
};

async fn admin_login(
    state: &AppState,
    request: LoginRequest,
    roles: &[AdminRole],
) -> Result<Json<LoginResponse>, ApiError> {
    let contact = validate_contact(&request.contact)?;
    validate_login_secret(&request.secret)?;

    let (identity, issued) = login::<AdminClass>(state, &contact, &request.secret, roles).await?;
    Ok(Json(LoginResponse {
        id: identity.id,
        contact: identity.contact,
        role: identity.role.as_str().to_string(),
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// Log in as any administrator.
#[utoipa::path(
    post,
    path = "/v1/admin/login",
    tag = "Admin Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Malformed contact or empty secret", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid credentials or account unusable", body = crate::error::ErrorBody)
    )
)]
pub async fn login_any(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    admin_login(&state, request, AdminClass::ROLES).await
}

/// Log in; only super-admins are accepted.
#[utoipa::path(
    post,
    path = "/v1/admin/super-admin/login",
    tag = "Admin Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody)
    )
)]
pub async fn login_super_admin(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    admin_login(&state, request, &[AdminRole::SuperAdmin]).await
}

/// Log in; only sub-admins are accepted.
#[utoipa::path(
    post,
    path = "/v1/admin/sub-admin/login",
    tag = "Admin Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody)
    )
)]
pub async fn login_sub_admin(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    admin_login(&state, request, &[AdminRole::SubAdmin]).await
}

/// End the caller's session.
#[utoipa::path(
    post,
    path = "/v1/admin/logout",
    tag = "Admin Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Session released", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody)
    )
)]
pub async fn logout(
    Authorized(principal): Authorized<AnyAdmin>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    revoke::<AdminClass>(&state, principal.id).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

/// Current administrator, as re-read from the store.
#[utoipa::path(
    get,
    path = "/v1/admin/me",
    tag = "Admin Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current administrator", body = MeResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody)
    )
)]
pub async fn me(Authorized(principal): Authorized<AnyAdmin>) -> Json<MeResponse> {
    Json(principal.into())
}
