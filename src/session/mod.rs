// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Ledger
//!
//! A TTL key/value store recording which identities currently hold a live,
//! server-acknowledged session. It is the source of truth for "may this
//! identity use a token right now", independent of the token's own expiry.
//!
//! ## Semantics
//!
//! - One record per identity: `put` overwrites and resets the TTL, which is
//!   how a new login evicts the previous session.
//! - The value is a random session id that is also carried in the access
//!   token (`sid`); the gate compares the two by equality.
//! - A record that expired is indistinguishable from one never written.
//! - `delete` releases a session early (logout, deactivation).
//!
//! ## Backends
//!
//! - [`InMemoryLedger`]: process-local LRU with per-entry expiry, swept by
//!   [`LedgerSweeper`].
//! - `RedisLedger` (feature `redis`): shared across instances.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
pub mod sweeper;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::roles::IdentityClass;

pub use memory::InMemoryLedger;
pub use sweeper::LedgerSweeper;
#[cfg(feature = "redis")]
pub use self::redis::RedisLedger;

/// Ledger failure. Always treated as fail-closed by callers.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Session ledger unavailable: {0}")]
    Unavailable(String),
    #[error("Session lifetime out of range: {0}s")]
    InvalidTtl(u64),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger key for one identity of one class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new<C: IdentityClass>(identity_id: Uuid) -> Self {
        Self(format!("session:{}:{}", C::NAME, identity_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fresh random session id.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Shared TTL store of live sessions.
#[async_trait]
pub trait SessionLedger: Send + Sync {
    /// Unconditionally overwrite the record for `key` and reset its TTL.
    async fn put(&self, key: &SessionKey, value: &str, ttl: Duration) -> LedgerResult<()>;

    /// Current value, or `None` if absent or expired.
    async fn get(&self, key: &SessionKey) -> LedgerResult<Option<String>>;

    /// Remove the record. Returns whether one was live.
    async fn delete(&self, key: &SessionKey) -> LedgerResult<bool>;

    /// Round-trip check used by the readiness check.
    async fn ping(&self) -> LedgerResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::{AdminClass, TenantClass};

    #[test]
    fn keys_are_namespaced_by_class() {
        let id = Uuid::new_v4();
        let admin = SessionKey::new::<AdminClass>(id);
        let user = SessionKey::new::<TenantClass>(id);
        assert_ne!(admin, user);
        assert_eq!(admin.as_str(), format!("session:admin:{id}"));
        assert_eq!(user.to_string(), format!("session:user:{id}"));
    }

    #[test]
    fn session_ids_are_random() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
