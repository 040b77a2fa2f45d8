// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit and request-level tests.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::credentials::hash_secret_blocking;
use crate::auth::roles::{AdminRole, TenantRole};
use crate::auth::TokenIssuer;
use crate::mail::{MailError, MailMessage, Mailer};
use crate::session::{InMemoryLedger, LedgerError, LedgerResult, SessionKey, SessionLedger};
use crate::state::AppState;
use crate::storage::{Identity, InMemoryIdentityStore};

/// Secret of every seeded identity. Satisfies the creation policy.
pub const TEST_SECRET: &str = "Str0ng@Pass1";

pub const TEST_SIGNING_SECRET: &[u8] = b"test-signing-secret-0123456789abcdef";

pub const TEST_ISSUER: &str = "backoffice-authority";

/// Mailer that keeps every message for inspection.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Ledger whose every call fails.
pub struct DownLedger;

#[async_trait]
impl SessionLedger for DownLedger {
    async fn put(&self, _: &SessionKey, _: &str, _: Duration) -> LedgerResult<()> {
        Err(LedgerError::Unavailable("down".into()))
    }

    async fn get(&self, _: &SessionKey) -> LedgerResult<Option<String>> {
        Err(LedgerError::Unavailable("down".into()))
    }

    async fn delete(&self, _: &SessionKey) -> LedgerResult<bool> {
        Err(LedgerError::Unavailable("down".into()))
    }

    async fn ping(&self) -> LedgerResult<()> {
        Err(LedgerError::Unavailable("down".into()))
    }
}

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(
        TEST_SIGNING_SECRET,
        TEST_ISSUER,
        Duration::from_secs(3600),
        Duration::from_secs(86_400),
    )
}

/// Fresh in-memory state plus a handle on its mailer.
pub fn test_state_with_mailer() -> (AppState, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(
        Arc::new(InMemoryIdentityStore::<AdminRole>::new()),
        Arc::new(InMemoryIdentityStore::<TenantRole>::new()),
        Arc::new(InMemoryLedger::default()),
        test_issuer(),
        mailer.clone(),
    )
    .with_public_base_url("http://authority.test");
    (state, mailer)
}

pub fn test_state() -> AppState {
    test_state_with_mailer().0
}

/// Argon2 hash of [`TEST_SECRET`], computed once per test binary.
pub fn test_secret_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_secret_blocking(TEST_SECRET).unwrap())
        .clone()
}

pub async fn seed_admin(state: &AppState, contact: &str, role: AdminRole) -> Identity<AdminRole> {
    let identity = Identity::new("Admin", contact, test_secret_hash(), role, None);
    state.admins.insert(identity.clone()).await.unwrap();
    identity
}

/// Seed a verified tenant identity in a fresh company.
pub async fn seed_user(state: &AppState, contact: &str, role: TenantRole) -> Identity<TenantRole> {
    seed_user_in(state, contact, role, Uuid::new_v4()).await
}

pub async fn seed_user_in(
    state: &AppState,
    contact: &str,
    role: TenantRole,
    company_id: Uuid,
) -> Identity<TenantRole> {
    let identity =
        Identity::new("User", contact, test_secret_hash(), role, None).with_company(company_id);
    state.users.insert(identity.clone()).await.unwrap();
    identity
}
