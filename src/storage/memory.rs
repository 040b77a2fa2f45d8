// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process identity store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    normalize_contact, Identity, IdentityStore, ResetChallenge, StorageError, StorageResult,
};
use crate::auth::roles::RoleName;

/// Identity rows held in a map, keyed by id.
pub struct InMemoryIdentityStore<R> {
    rows: RwLock<HashMap<Uuid, Identity<R>>>,
}

impl<R> Default for InMemoryIdentityStore<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<R: RoleName> InMemoryIdentityStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to a live row and return the updated copy.
    async fn update_live<F>(&self, id: Uuid, f: F) -> StorageResult<Identity<R>>
    where
        F: FnOnce(&mut Identity<R>) + Send,
    {
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(&id)
            .filter(|row| !row.is_deleted)
            .ok_or_else(|| StorageError::NotFound(format!("Identity {id}")))?;
        f(row);
        Ok(row.clone())
    }
}

#[async_trait]
impl<R: RoleName> IdentityStore<R> for InMemoryIdentityStore<R> {
    async fn find_active_by_id(&self, id: Uuid) -> StorageResult<Option<Identity<R>>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|row| row.is_live()).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Identity<R>>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|row| !row.is_deleted).cloned())
    }

    async fn find_by_contact(
        &self,
        contact: &str,
        roles: &[R],
    ) -> StorageResult<Option<Identity<R>>> {
        let contact = normalize_contact(contact);
        let rows = self.rows.read().await;
        let matches = rows
            .values()
            .filter(|row| row.contact == contact && roles.contains(&row.role));

        let mut deleted = None;
        for row in matches {
            if !row.is_deleted {
                return Ok(Some(row.clone()));
            }
            deleted.get_or_insert_with(|| row.clone());
        }
        Ok(deleted)
    }

    async fn insert(&self, identity: Identity<R>) -> StorageResult<()> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&identity.id) {
            return Err(StorageError::AlreadyExists(format!("Identity {}", identity.id)));
        }
        if rows
            .values()
            .any(|row| !row.is_deleted && row.contact == identity.contact)
        {
            return Err(StorageError::AlreadyExists(format!(
                "Contact {}",
                identity.contact
            )));
        }
        rows.insert(identity.id, identity);
        Ok(())
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        actor: Option<Uuid>,
    ) -> StorageResult<Identity<R>> {
        self.update_live(id, |row| {
            row.is_active = active;
            row.audit.touch(actor);
        })
        .await
    }

    async fn soft_delete(&self, id: Uuid, actor: Option<Uuid>) -> StorageResult<Identity<R>> {
        self.update_live(id, |row| {
            row.is_deleted = true;
            row.audit.mark_deleted(actor);
        })
        .await
    }

    async fn mark_verified(&self, id: Uuid) -> StorageResult<bool> {
        let mut changed = false;
        self.update_live(id, |row| {
            changed = !row.is_verified;
            row.is_verified = true;
        })
        .await?;
        Ok(changed)
    }

    async fn set_reset_challenge(&self, id: Uuid, challenge: ResetChallenge) -> StorageResult<()> {
        self.update_live(id, |row| row.reset = Some(challenge)).await?;
        Ok(())
    }

    async fn consume_reset_attempt(&self, id: Uuid) -> StorageResult<()> {
        self.update_live(id, |row| {
            if let Some(challenge) = row.reset.as_mut() {
                challenge.attempts_left = challenge.attempts_left.saturating_sub(1);
                if challenge.attempts_left == 0 {
                    row.reset = None;
                }
            }
        })
        .await?;
        Ok(())
    }

    async fn set_secret_hash(
        &self,
        id: Uuid,
        secret_hash: String,
        actor: Option<Uuid>,
    ) -> StorageResult<Identity<R>> {
        self.update_live(id, |row| {
            row.secret_hash = secret_hash;
            row.reset = None;
            row.audit.touch(actor);
        })
        .await
    }

    async fn count_live(&self) -> StorageResult<usize> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|row| !row.is_deleted).count())
    }
}
