// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Store
//!
//! The relational store owns identity rows; the authority only consumes them
//! through [`IdentityStore`]. One store instance exists per identity class
//! (admins, tenant users), each typed by its own role enum.
//!
//! ## Soft delete
//!
//! Rows are never removed. `is_deleted` hides a row from every lookup except
//! [`IdentityStore::find_by_contact`], which still returns it (after any
//! live row with the same contact) so login can report `AccountNotFound`.
//!
//! [`InMemoryIdentityStore`] is the reference implementation used by the
//! binary and the tests.

pub mod identity;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::roles::RoleName;

pub use identity::{normalize_contact, AuditTrail, Identity, ResetChallenge};
pub use memory::InMemoryIdentityStore;

/// Error type for identity store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No live row with this key
    #[error("Not found: {0}")]
    NotFound(String),
    /// A live row already holds this contact
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Store unreachable or failing
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Narrow view of the identity table used by the authority.
#[async_trait]
pub trait IdentityStore<R: RoleName>: Send + Sync {
    /// Row with this id that is active and not deleted.
    async fn find_active_by_id(&self, id: Uuid) -> StorageResult<Option<Identity<R>>>;

    /// Row with this id that is not deleted, active or not.
    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Identity<R>>>;

    /// Row with this contact (case-insensitive) and a role in `roles`.
    ///
    /// A live row wins over a soft-deleted one.
    async fn find_by_contact(&self, contact: &str, roles: &[R])
        -> StorageResult<Option<Identity<R>>>;

    /// Insert a new row. Fails if a live row already holds the contact.
    async fn insert(&self, identity: Identity<R>) -> StorageResult<()>;

    /// Toggle the active flag of a live row and return the updated row.
    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        actor: Option<Uuid>,
    ) -> StorageResult<Identity<R>>;

    /// Soft-delete a live row and return it.
    async fn soft_delete(&self, id: Uuid, actor: Option<Uuid>) -> StorageResult<Identity<R>>;

    /// Mark a live row verified. Returns `false` if it already was.
    async fn mark_verified(&self, id: Uuid) -> StorageResult<bool>;

    /// Replace any pending recovery challenge of a live row.
    async fn set_reset_challenge(&self, id: Uuid, challenge: ResetChallenge) -> StorageResult<()>;

    /// Spend one attempt of the pending challenge; the last one drops it.
    async fn consume_reset_attempt(&self, id: Uuid) -> StorageResult<()>;

    /// Store a new secret hash and drop any pending challenge.
    async fn set_secret_hash(
        &self,
        id: Uuid,
        secret_hash: String,
        actor: Option<Uuid>,
    ) -> StorageResult<Identity<R>>;

    /// Number of rows that are not soft-deleted.
    async fn count_live(&self) -> StorageResult<usize>;
}
