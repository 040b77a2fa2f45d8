// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Gate
//!
//! Per-request pipeline that turns a bearer assertion into a trusted
//! [`Principal`]. Each step either advances or rejects:
//!
//! | Step | Rejection |
//! |------|-----------|
//! | 1. extract `Authorization: Bearer <token>` | `MissingAssertion` |
//! | 2. verify signature, expiry, issuer, class, purpose | `InvalidOrExpiredToken` |
//! | 3. ledger record present and equal to the token's `sid` | `SessionExpiredOrRevoked` |
//! | 4. identity row exists, active and not deleted | `IdentityNotFound` |
//! | 5. principal built from the fresh row | |
//!
//! Role and contact always come from step 4, never from the token. A ledger
//! or store failure at steps 3-4 is `AuthorityUnavailable`: the gate fails
//! closed. Role checks happen after the gate, in the extractors.
//!
//! The session lifecycle lives here too: [`login`] writes the ledger record
//! the gate later reads, and [`revoke`] removes it.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::claims::{Principal, TokenPurpose};
use super::credentials::verify_credentials;
use super::roles::IdentityClass;
use super::token::IssuedToken;
use super::AuthError;
use crate::session::{new_session_id, SessionKey};
use crate::state::AppState;
use crate::storage::Identity;

/// Step 1: pull the bearer token out of the request headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAssertion)?
        .to_str()
        .map_err(|_| AuthError::MissingAssertion)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MissingAssertion)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingAssertion);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingAssertion);
    }
    Ok(token)
}

/// Run steps 1-5 against the request headers.
pub async fn authenticate_headers<C: IdentityClass>(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Principal<C>, AuthError> {
    let token = bearer_token(headers)?;
    authenticate::<C>(state, token).await
}

/// Run steps 2-5 against a raw token.
pub async fn authenticate<C: IdentityClass>(
    state: &AppState,
    token: &str,
) -> Result<Principal<C>, AuthError> {
    let verified = state.tokens.verify::<C>(token, TokenPurpose::Access)?;
    let identity_id = verified.identity_id;
    let presented_sid = verified
        .claims
        .sid
        .as_deref()
        .ok_or(AuthError::InvalidOrExpiredToken)?;

    let key = SessionKey::new::<C>(identity_id);
    let recorded = state.bounded("session ledger", state.ledger.get(&key)).await?;
    match recorded {
        Some(sid) if sid == presented_sid => {}
        Some(_) => {
            debug!(class = C::NAME, %identity_id, "Session superseded");
            return Err(AuthError::SessionExpiredOrRevoked);
        }
        None => {
            debug!(class = C::NAME, %identity_id, "No live session");
            return Err(AuthError::SessionExpiredOrRevoked);
        }
    }

    let identity = state
        .bounded(
            "identity store",
            C::store(state).find_active_by_id(identity_id),
        )
        .await?
        .ok_or_else(|| {
            warn!(class = C::NAME, %identity_id, "Live session for unresolvable identity");
            AuthError::IdentityNotFound
        })?;

    Ok(Principal::from_identity(
        &identity,
        presented_sid.to_string(),
        verified.claims.exp,
    ))
}

/// Verify credentials, sign an access token and record its session.
///
/// A previous session of the same identity is overwritten and therefore
/// stops passing the gate.
pub async fn login<C: IdentityClass>(
    state: &AppState,
    contact: &str,
    secret: &str,
    roles: &[C::Role],
) -> Result<(Identity<C::Role>, IssuedToken), AuthError> {
    let identity = verify_credentials::<C>(state, contact, secret, roles).await?;

    let session_id = new_session_id();
    let issued = state.tokens.issue_access::<C>(&identity, &session_id)?;

    let key = SessionKey::new::<C>(identity.id);
    state
        .bounded(
            "session ledger",
            state.ledger.put(&key, &session_id, state.tokens.access_ttl()),
        )
        .await?;

    info!(class = C::NAME, identity_id = %identity.id, role = %identity.role, "Login succeeded");
    Ok((identity, issued))
}

/// Drop the live session of `identity_id`, if any.
pub async fn revoke<C: IdentityClass>(state: &AppState, identity_id: Uuid) -> Result<bool, AuthError> {
    let key = SessionKey::new::<C>(identity_id);
    let removed = state.bounded("session ledger", state.ledger.delete(&key)).await?;
    if removed {
        info!(class = C::NAME, %identity_id, "Session revoked");
    }
    Ok(removed)
}
