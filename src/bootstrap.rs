// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! First-run seeding of the super-admin.
//!
//! Super-admins cannot be created through the API. When the admin store is
//! empty and bootstrap credentials are configured, one is inserted at
//! startup; otherwise nothing happens.

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    auth::{credentials::hash_secret, AdminRole, AuthError},
    config::BootstrapAdmin,
    state::AppState,
    storage::{Identity, StorageError},
    validation::{validate_contact, validate_name, validate_new_secret, MANAGED_NAME_LEN},
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("bootstrap credentials rejected: {0}")]
    Invalid(#[from] AuthError),
    #[error("bootstrap insert failed: {0}")]
    Storage(#[from] StorageError),
    #[error("bootstrap hashing failed: {0}")]
    Hash(String),
}

/// What [`seed_super_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadySeeded,
    NotConfigured,
}

pub async fn seed_super_admin(
    state: &AppState,
    bootstrap: Option<&BootstrapAdmin>,
) -> Result<BootstrapOutcome, BootstrapError> {
    if state.admins.count_live().await? > 0 {
        return Ok(BootstrapOutcome::AlreadySeeded);
    }

    let Some(admin) = bootstrap else {
        warn!("No administrators exist and no bootstrap credentials are configured");
        return Ok(BootstrapOutcome::NotConfigured);
    };

    let name = validate_name(&admin.name, MANAGED_NAME_LEN)?;
    let contact = validate_contact(&admin.email)?;
    validate_new_secret(&admin.password)?;
    let secret_hash = hash_secret(&admin.password)
        .await
        .map_err(|e| BootstrapError::Hash(e.to_string()))?;

    let identity = Identity::new(name, &contact, secret_hash, AdminRole::SuperAdmin, None);
    let id = identity.id;
    state.admins.insert(identity).await?;

    info!(identity_id = %id, contact = %contact, "Seeded super-admin");
    Ok(BootstrapOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_admin, test_state, TEST_SECRET};

    fn credentials(email: &str, password: &str) -> BootstrapAdmin {
        BootstrapAdmin {
            name: "Root".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn seeds_into_empty_store() {
        let state = test_state();
        let creds = credentials("Root@Corp.io", TEST_SECRET);

        let outcome = seed_super_admin(&state, Some(&creds)).await.unwrap();
        assert_eq!(outcome, BootstrapOutcome::Created);

        let root = state
            .admins
            .find_by_contact("root@corp.io", &[AdminRole::SuperAdmin])
            .await
            .unwrap()
            .unwrap();
        assert!(root.is_live());
        assert!(root.is_verified);
    }

    #[tokio::test]
    async fn runs_once() {
        let state = test_state();
        seed_admin(&state, "existing@corp.io", AdminRole::SubAdmin).await;

        let creds = credentials("root@corp.io", TEST_SECRET);
        let outcome = seed_super_admin(&state, Some(&creds)).await.unwrap();
        assert_eq!(outcome, BootstrapOutcome::AlreadySeeded);
        assert_eq!(state.admins.count_live().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_without_credentials() {
        let state = test_state();
        let outcome = seed_super_admin(&state, None).await.unwrap();
        assert_eq!(outcome, BootstrapOutcome::NotConfigured);
        assert_eq!(state.admins.count_live().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn weak_bootstrap_secret_is_refused() {
        let state = test_state();
        let creds = credentials("root@corp.io", "password");
        assert!(matches!(
            seed_super_admin(&state, Some(&creds)).await,
            Err(BootstrapError::Invalid(AuthError::ValidationFailed(_)))
        ));
    }
}
