// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tenant signup, verification, recovery and session endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use super::accounts;
use crate::{
    auth::{
        gate::{login as open_session, revoke},
        recovery::{request_reset, reset_secret},
        AnyTenant, AuthError, Authorized, IdentityClass, RoleName, TenantClass, TenantRole,
        TokenPurpose,
    },
    error::ApiError,
    mail::MailMessage,
    models::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, MeResponse, MessageResponse,
        ResetPasswordRequest, SignupRequest, SignupResponse, VerifyQuery,
    },
    state::AppState,
    storage::{Identity, StorageError},
    validation::{validate_contact, validate_login_secret, validate_new_secret, SIGNUP_NAME_LEN},
};

/// Register a company owner. Login is refused until the contact is verified.
#[utoipa::path(
    post,
    path = "/v1/users/signup",
    tag = "User Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Owner registered; verification mail sent", body = SignupResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 409, description = "Contact already registered", body = crate::error::ErrorBody)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let new = accounts::prepare(
        &request.name,
        &request.contact,
        &request.secret,
        Some(SIGNUP_NAME_LEN),
    )
    .await?;
    let company_id = Uuid::new_v4();
    let identity = Identity::new(new.name, &new.contact, new.secret_hash, TenantRole::Owner, None)
        .with_company(company_id)
        .unverified();
    let identity = accounts::insert::<TenantClass>(&state, identity).await?;

    let verification = state.tokens.issue_verification::<TenantClass>(&identity)?;
    let link = format!(
        "{}/v1/users/verify?token={}",
        state.public_base_url, verification.token
    );
    accounts::notify(
        &state,
        MailMessage::verification(&identity.contact, &identity.name, &link),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: identity.id,
            contact: identity.contact,
            company_id,
            verification_required: true,
        }),
    ))
}

/// Consume a verification token.
#[utoipa::path(
    get,
    path = "/v1/users/verify",
    tag = "User Auth",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Contact verified", body = MessageResponse),
        (status = 401, description = "Invalid or expired token", body = crate::error::ErrorBody)
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let verified = state
        .tokens
        .verify::<TenantClass>(&query.token, TokenPurpose::Verify)?;

    let changed = state
        .deadline(
            "identity store",
            TenantClass::store(&state).mark_verified(verified.identity_id),
        )
        .await?
        .map_err(|e| match e {
            StorageError::NotFound(_) => ApiError::from(AuthError::IdentityNotFound),
            other => other.into(),
        })?;

    if changed {
        info!(identity_id = %verified.identity_id, "Contact verified");
        Ok(Json(MessageResponse::new("Account verified")))
    } else {
        Ok(Json(MessageResponse::new("Account already verified")))
    }
}

/// Log in as an owner or employee.
#[utoipa::path(
    post,
    path = "/v1/users/login",
    tag = "User Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Malformed contact or empty secret", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid credentials or account unusable", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let contact = validate_contact(&request.contact)?;
    validate_login_secret(&request.secret)?;

    let (identity, issued) =
        open_session::<TenantClass>(&state, &contact, &request.secret, TenantClass::ROLES).await?;
    Ok(Json(LoginResponse {
        id: identity.id,
        contact: identity.contact,
        role: identity.role.as_str().to_string(),
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// Mail a recovery code. The answer is the same for unknown contacts.
#[utoipa::path(
    post,
    path = "/v1/users/forgot-password",
    tag = "User Auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Code sent if the account exists", body = MessageResponse),
        (status = 400, description = "Malformed contact", body = crate::error::ErrorBody)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let contact = validate_contact(&request.contact)?;
    request_reset::<TenantClass>(&state, &contact).await?;
    Ok(Json(MessageResponse::new(
        "If the account exists, a reset code has been sent",
    )))
}

/// Redeem a recovery code, set a new secret and end any live session.
#[utoipa::path(
    post,
    path = "/v1/users/reset-password",
    tag = "User Auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Secret replaced", body = MessageResponse),
        (status = 400, description = "Invalid input or invalid, spent or expired code", body = crate::error::ErrorBody)
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let contact = validate_contact(&request.contact)?;
    validate_new_secret(&request.secret)?;
    reset_secret::<TenantClass>(&state, &contact, request.code.trim(), &request.secret).await?;
    Ok(Json(MessageResponse::new(
        "Password reset successful. Log in with the new password",
    )))
}

/// End the caller's session.
#[utoipa::path(
    post,
    path = "/v1/users/logout",
    tag = "User Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Session released", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody)
    )
)]
pub async fn logout(
    Authorized(principal): Authorized<AnyTenant>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    revoke::<TenantClass>(&state, principal.id).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

/// Current owner or employee, as re-read from the store.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "User Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody)
    )
)]
pub async fn me(Authorized(principal): Authorized<AnyTenant>) -> Json<MeResponse> {
    Json(principal.into())
}
