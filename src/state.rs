// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::auth::roles::{AdminRole, TenantRole};
use crate::auth::token::TokenIssuer;
use crate::auth::AuthError;
use crate::mail::Mailer;
use crate::session::SessionLedger;
use crate::storage::IdentityStore;

/// Default deadline for a single store or ledger call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default lifetime of a credential-recovery code.
pub const DEFAULT_RESET_CODE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct AppState {
    pub admins: Arc<dyn IdentityStore<AdminRole>>,
    pub users: Arc<dyn IdentityStore<TenantRole>>,
    pub ledger: Arc<dyn SessionLedger>,
    pub tokens: Arc<TokenIssuer>,
    pub mailer: Arc<dyn Mailer>,
    /// Base URL used to build verification links
    pub public_base_url: Arc<str>,
    pub backend_timeout: Duration,
    pub reset_code_ttl: Duration,
}

impl AppState {
    pub fn new(
        admins: Arc<dyn IdentityStore<AdminRole>>,
        users: Arc<dyn IdentityStore<TenantRole>>,
        ledger: Arc<dyn SessionLedger>,
        tokens: TokenIssuer,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            admins,
            users,
            ledger,
            tokens: Arc::new(tokens),
            mailer,
            public_base_url: Arc::from("http://localhost:8080"),
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            reset_code_ttl: DEFAULT_RESET_CODE_TTL,
        }
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn with_reset_code_ttl(mut self, ttl: Duration) -> Self {
        self.reset_code_ttl = ttl;
        self
    }

    pub fn with_public_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.public_base_url = Arc::from(url.as_ref().trim_end_matches('/'));
        self
    }

    /// Run a backend call under the deadline. A timeout fails closed.
    ///
    /// The inner result is handed back untouched so callers can map
    /// domain errors (not found, conflict) themselves.
    pub async fn deadline<F: Future>(
        &self,
        backend: &'static str,
        fut: F,
    ) -> Result<F::Output, AuthError> {
        tokio::time::timeout(self.backend_timeout, fut)
            .await
            .map_err(|_| {
                error!(
                    backend,
                    timeout_ms = self.backend_timeout.as_millis() as u64,
                    "Backend call timed out"
                );
                AuthError::AuthorityUnavailable
            })
    }

    /// Run a backend call under the deadline, collapsing both timeout and
    /// backend error into [`AuthError::AuthorityUnavailable`].
    pub async fn bounded<T, E, F>(&self, backend: &'static str, fut: F) -> Result<T, AuthError>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        self.deadline(backend, fut).await?.map_err(|e| {
            error!(backend, error = %e, "Backend call failed");
            AuthError::AuthorityUnavailable
        })
    }
}
