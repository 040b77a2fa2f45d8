// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account lifecycle shared by the management endpoints.
//!
//! Deactivation and deletion drop the target's live session right after the
//! store write, so the change takes effect before the token would expire.
//! The store write is the commit point: if the ledger cannot be reached the
//! request still succeeds, and the gate keeps rejecting the identity because
//! it re-reads the row on every request.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{credentials::hash_secret, gate::revoke, IdentityClass},
    error::ApiError,
    mail::MailMessage,
    state::AppState,
    storage::Identity,
    validation::{validate_contact, validate_name, validate_new_secret, MANAGED_NAME_LEN},
};

/// Validated fields of a new account.
pub struct NewAccount {
    pub name: String,
    pub contact: String,
    pub secret_hash: String,
}

/// Validate and hash a new account's fields.
pub async fn prepare(
    name: &str,
    contact: &str,
    secret: &str,
    name_len: Option<(usize, usize)>,
) -> Result<NewAccount, ApiError> {
    let name = validate_name(name, name_len.unwrap_or(MANAGED_NAME_LEN))?;
    let contact = validate_contact(contact)?;
    validate_new_secret(secret)?;
    let secret_hash = hash_secret(secret).await.map_err(|e| {
        tracing::error!(error = %e, "Secret hashing failed");
        ApiError::internal("Could not create account")
    })?;
    Ok(NewAccount {
        name,
        contact,
        secret_hash,
    })
}

/// Persist a new identity of class `C`.
pub async fn insert<C: IdentityClass>(
    state: &AppState,
    identity: Identity<C::Role>,
) -> Result<Identity<C::Role>, ApiError> {
    state
        .deadline("identity store", C::store(state).insert(identity.clone()))
        .await??;
    info!(
        class = C::NAME,
        identity_id = %identity.id,
        role = %identity.role,
        created_by = ?identity.audit.created_by,
        "Identity created"
    );
    Ok(identity)
}

/// Load a non-deleted identity or 404.
pub async fn load<C: IdentityClass>(state: &AppState, id: Uuid) -> Result<Identity<C::Role>, ApiError> {
    state
        .deadline("identity store", C::store(state).find_by_id(id))
        .await??
        .ok_or_else(|| ApiError::not_found("Account not found"))
}

pub async fn set_active<C: IdentityClass>(
    state: &AppState,
    id: Uuid,
    active: bool,
    actor: Uuid,
) -> Result<Identity<C::Role>, ApiError> {
    let updated = state
        .deadline("identity store", C::store(state).set_active(id, active, Some(actor)))
        .await??;
    if !active {
        release_session::<C>(state, id).await;
    }
    info!(class = C::NAME, identity_id = %id, %actor, active, "Identity status changed");
    Ok(updated)
}

pub async fn soft_delete<C: IdentityClass>(
    state: &AppState,
    id: Uuid,
    actor: Uuid,
) -> Result<Identity<C::Role>, ApiError> {
    let deleted = state
        .deadline("identity store", C::store(state).soft_delete(id, Some(actor)))
        .await??;
    release_session::<C>(state, id).await;
    info!(class = C::NAME, identity_id = %id, %actor, "Identity deleted");
    Ok(deleted)
}

/// Revoke after a committed store write. Failure is logged, not returned.
async fn release_session<C: IdentityClass>(state: &AppState, id: Uuid) {
    if let Err(e) = revoke::<C>(state, id).await {
        warn!(
            class = C::NAME,
            identity_id = %id,
            error = %e,
            "Session not released; gate re-resolution still rejects the identity"
        );
    }
}

/// Best-effort mail; a delivery failure never fails the request.
pub async fn notify(state: &AppState, message: MailMessage) {
    let to = message.to.clone();
    match state.deadline("mailer", state.mailer.send(message)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(%to, error = %e, "Mail not sent"),
        Err(_) => warn!(%to, "Mail not sent: mailer timed out"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::{TenantClass, TenantRole};
    use crate::testing::{seed_user, test_state, DownLedger};

    #[tokio::test]
    async fn deactivation_commits_when_ledger_is_down() {
        let mut state = test_state();
        let target = seed_user(&state, "emp@corp.io", TenantRole::Employee).await;
        let actor = Uuid::new_v4();
        state.ledger = Arc::new(DownLedger);

        let updated = set_active::<TenantClass>(&state, target.id, false, actor)
            .await
            .unwrap();
        assert!(!updated.is_active);

        let deleted = soft_delete::<TenantClass>(&state, target.id, actor)
            .await
            .unwrap();
        assert!(deleted.is_deleted);
        assert!(state.users.find_by_id(target.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let state = test_state();
        let err = load::<TenantClass>(&state, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    }
}
