// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated identities.
//!
//! ```rust,ignore
//! async fn me(Auth(principal): Auth<AdminClass>) -> impl IntoResponse { .. }
//!
//! async fn create_sub_admin(
//!     Authorized(principal): Authorized<SuperAdminOnly>,
//!     State(state): State<AppState>,
//! ) -> Result<Json<SubAdminResponse>, ApiError> { .. }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::claims::Principal;
use super::gate::authenticate_headers;
use super::roles::{allowed, IdentityClass, RoleRequirement};
use super::AuthError;
use crate::state::AppState;

/// Any authenticated identity of class `C`.
///
/// Reuses the principal placed in request extensions by the gate
/// middleware; otherwise runs the gate itself.
pub struct Auth<C: IdentityClass>(pub Principal<C>);

impl<C: IdentityClass> FromRequestParts<AppState> for Auth<C> {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal<C>>().cloned() {
            return Ok(Auth(principal));
        }

        let principal = authenticate_headers::<C>(state, &parts.headers).await?;
        parts.extensions.insert(principal.clone());
        Ok(Auth(principal))
    }
}

/// An authenticated identity whose current role satisfies `P`.
pub struct Authorized<P: RoleRequirement>(pub Principal<P::Class>);

impl<P: RoleRequirement> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(principal) = Auth::<P::Class>::from_request_parts(parts, state).await?;

        if !allowed(principal.role, P::REQUIRED) {
            warn!(
                class = <P::Class as IdentityClass>::NAME,
                identity_id = %principal.id,
                role = %principal.role,
                "Role not permitted for route"
            );
            return Err(AuthError::Forbidden);
        }

        Ok(Authorized(principal))
    }
}
