// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local session ledger.
//!
//! Entries live in an LRU bounded by `capacity`; each carries its own expiry
//! instant and is dropped lazily when read after it. Under capacity pressure
//! the least recently used session is evicted, which logs that identity out.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;

use super::{LedgerError, LedgerResult, SessionKey, SessionLedger};

/// Default number of sessions held before LRU eviction.
pub const DEFAULT_CAPACITY: usize = 100_000;

struct Entry {
    value: String,
    expires_at: Instant,
}

pub struct InMemoryLedger {
    entries: Mutex<LruCache<String, Entry>>,
}

impl InMemoryLedger {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> LedgerResult<std::sync::MutexGuard<'_, LruCache<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| LedgerError::Unavailable("in-memory ledger lock poisoned".into()))
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> LedgerResult<usize> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        Ok(expired.len())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl SessionLedger for InMemoryLedger {
    async fn put(&self, key: &SessionKey, value: &str, ttl: Duration) -> LedgerResult<()> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| LedgerError::InvalidTtl(ttl.as_secs()))?;
        let mut entries = self.lock()?;
        entries.put(
            key.as_str().to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &SessionKey) -> LedgerResult<Option<String>> {
        let mut entries = self.lock()?;
        let live = match entries.get(key.as_str()) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if live.is_none() {
            entries.pop(key.as_str());
        }
        Ok(live)
    }

    async fn delete(&self, key: &SessionKey) -> LedgerResult<bool> {
        let mut entries = self.lock()?;
        Ok(entries
            .pop(key.as_str())
            .is_some_and(|entry| entry.expires_at > Instant::now()))
    }

    async fn ping(&self) -> LedgerResult<()> {
        self.lock().map(|_| ())
    }
}
