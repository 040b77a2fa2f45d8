// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verification and secret hashing.
//!
//! Secrets are stored as argon2id PHC strings. Hashing and verification are
//! CPU-bound and run on the blocking pool.
//!
//! ## Outcomes
//!
//! | Situation | Error |
//! |-----------|-------|
//! | no row for contact, or wrong secret | `InvalidCredentials` |
//! | row soft-deleted | `AccountNotFound` |
//! | row inactive | `AccountInactive` |
//! | self-signup never verified | `AccountNotVerified` |
//!
//! The secret is checked before any account state is reported, and a
//! missing row is still verified against a fixed dummy hash, so neither the
//! response nor its timing reveals whether a contact is registered.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use super::roles::IdentityClass;
use super::AuthError;
use crate::state::AppState;
use crate::storage::Identity;

/// Secret hashing failure.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("salt generation failed: {0}")]
    Salt(String),
    #[error("hashing failed: {0}")]
    Hash(String),
    #[error("hashing task failed: {0}")]
    Join(String),
}

pub(crate) fn hash_secret_blocking(secret: &str) -> Result<String, CredentialError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Salt(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Salt(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_secret_blocking(secret: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

/// Hash compared against when a contact has no row, so the miss costs a
/// full argon2 verification. Never matches a real secret.
///
/// Built once on the blocking pool. A failure is returned, never cached.
pub async fn dummy_hash() -> Result<&'static str, CredentialError> {
    DUMMY_HASH
        .get_or_try_init(|| hash_secret("unregistered-contact-placeholder"))
        .await
        .map(String::as_str)
}

/// Unknown contacts get the dummy hash; a failure to build it fails closed.
pub(crate) async fn stored_or_dummy_hash(found: Option<&str>) -> Result<String, AuthError> {
    match found {
        Some(hash) => Ok(hash.to_owned()),
        None => dummy_hash().await.map(str::to_owned).map_err(|e| {
            error!(error = %e, "Dummy hash unavailable");
            AuthError::AuthorityUnavailable
        }),
    }
}

/// Hash a plaintext secret for storage.
pub async fn hash_secret(secret: &str) -> Result<String, CredentialError> {
    let secret = secret.to_owned();
    tokio::task::spawn_blocking(move || hash_secret_blocking(&secret))
        .await
        .map_err(|e| CredentialError::Join(e.to_string()))?
}

/// Compare a plaintext secret against a stored PHC hash.
pub async fn verify_secret(secret: &str, hash: &str) -> bool {
    let (secret, hash) = (secret.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_secret_blocking(&secret, &hash))
        .await
        .unwrap_or(false)
}

/// Resolve `contact` among identities of class `C` with a role in `roles`
/// and check `secret` against it.
pub async fn verify_credentials<C: IdentityClass>(
    state: &AppState,
    contact: &str,
    secret: &str,
    roles: &[C::Role],
) -> Result<Identity<C::Role>, AuthError> {
    let store = C::store(state);
    let found = state
        .bounded("identity store", store.find_by_contact(contact, roles))
        .await?;

    let stored = found.as_ref().map(|identity| identity.secret_hash.as_str());
    let hash = stored_or_dummy_hash(stored).await?;
    let matches = verify_secret(secret, &hash).await;

    let identity = match found {
        Some(identity) if matches => identity,
        _ => {
            debug!(class = C::NAME, "Credential check failed");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if identity.is_deleted {
        info!(class = C::NAME, identity_id = %identity.id, "Login refused: account deleted");
        return Err(AuthError::AccountNotFound);
    }
    if !identity.is_active {
        info!(class = C::NAME, identity_id = %identity.id, "Login refused: account inactive");
        return Err(AuthError::AccountInactive);
    }
    if !identity.is_verified {
        info!(class = C::NAME, identity_id = %identity.id, "Login refused: account not verified");
        return Err(AuthError::AccountNotVerified);
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::{AdminClass, AdminRole, TenantClass, TenantRole};
    use crate::testing::{seed_admin, seed_user, test_state, TEST_SECRET};

    #[tokio::test]
    async fn hash_then_verify_round_trip() {
        let hash = hash_secret("Str0ng@Pass").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_secret("Str0ng@Pass", &hash).await);
        assert!(!verify_secret("Wr0ng@Pass", &hash).await);
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let a = hash_secret("Str0ng@Pass").await.unwrap();
        let b = hash_secret("Str0ng@Pass").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn dummy_hash_is_a_real_phc_string() {
        let dummy = dummy_hash().await.unwrap();
        assert!(PasswordHash::new(dummy).is_ok());
        assert!(!verify_secret(TEST_SECRET, dummy).await);
        assert!(std::ptr::eq(dummy, dummy_hash().await.unwrap()));
    }

    #[tokio::test]
    async fn garbage_hash_never_verifies() {
        assert!(!verify_secret("anything", "not-a-phc-string").await);
    }

    #[tokio::test]
    async fn valid_credentials_resolve_identity() {
        let state = test_state();
        let seeded = seed_admin(&state, "root@corp.io", AdminRole::SuperAdmin).await;

        let identity =
            verify_credentials::<AdminClass>(&state, "ROOT@corp.io", TEST_SECRET, AdminClass::ROLES)
                .await
                .unwrap();
        assert_eq!(identity.id, seeded.id);
    }

    #[tokio::test]
    async fn wrong_secret_and_unknown_contact_are_indistinguishable() {
        let state = test_state();
        seed_admin(&state, "root@corp.io", AdminRole::SuperAdmin).await;

        let wrong = verify_credentials::<AdminClass>(
            &state,
            "root@corp.io",
            "Wr0ng@Pass",
            AdminClass::ROLES,
        )
        .await
        .unwrap_err();
        let unknown = verify_credentials::<AdminClass>(
            &state,
            "nobody@corp.io",
            TEST_SECRET,
            AdminClass::ROLES,
        )
        .await
        .unwrap_err();

        assert_eq!(wrong, AuthError::InvalidCredentials);
        assert_eq!(unknown, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn role_filter_hides_other_roles() {
        let state = test_state();
        seed_admin(&state, "sub@corp.io", AdminRole::SubAdmin).await;

        let err = verify_credentials::<AdminClass>(
            &state,
            "sub@corp.io",
            TEST_SECRET,
            &[AdminRole::SuperAdmin],
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn inactive_and_deleted_accounts_are_refused() {
        let state = test_state();
        let inactive = seed_user(&state, "off@corp.io", TenantRole::Owner).await;
        state.users.set_active(inactive.id, false, None).await.unwrap();
        let deleted = seed_user(&state, "gone@corp.io", TenantRole::Employee).await;
        state.users.soft_delete(deleted.id, None).await.unwrap();

        let err =
            verify_credentials::<TenantClass>(&state, "off@corp.io", TEST_SECRET, TenantClass::ROLES)
                .await
                .unwrap_err();
        assert_eq!(err, AuthError::AccountInactive);

        let err = verify_credentials::<TenantClass>(
            &state,
            "gone@corp.io",
            TEST_SECRET,
            TenantClass::ROLES,
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuthError::AccountNotFound);
    }

    #[tokio::test]
    async fn account_state_is_hidden_behind_wrong_secret() {
        let state = test_state();
        let inactive = seed_user(&state, "off@corp.io", TenantRole::Owner).await;
        state.users.set_active(inactive.id, false, None).await.unwrap();

        let err = verify_credentials::<TenantClass>(
            &state,
            "off@corp.io",
            "Wr0ng@Pass",
            TenantClass::ROLES,
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn admin_contact_does_not_authenticate_as_tenant() {
        let state = test_state();
        seed_admin(&state, "root@corp.io", AdminRole::SuperAdmin).await;

        let err = verify_credentials::<TenantClass>(
            &state,
            "root@corp.io",
            TEST_SECRET,
            TenantClass::ROLES,
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }
}
