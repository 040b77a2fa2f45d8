// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Sweeper
//!
//! Background task that periodically drops expired records from the
//! in-memory ledger. Reads already treat expired records as absent; the
//! sweep only reclaims memory held by sessions nobody reads again.
//!
//! Not needed for Redis, which expires keys server-side.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::InMemoryLedger;

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct LedgerSweeper {
    ledger: Arc<InMemoryLedger>,
    interval: Duration,
}

impl LedgerSweeper {
    pub fn new(ledger: Arc<InMemoryLedger>) -> Self {
        Self {
            ledger,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Session ledger sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Session ledger sweeper shutting down");
                    return;
                }
            }

            match self.ledger.purge_expired() {
                Ok(0) => {}
                Ok(removed) => debug!(removed, remaining = self.ledger.len(), "Swept expired sessions"),
                Err(e) => warn!(error = %e, "Session sweep failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::TenantClass;
    use crate::session::{SessionKey, SessionLedger};
    use uuid::Uuid;

    #[tokio::test]
    async fn sweeps_until_cancelled() {
        let ledger = Arc::new(InMemoryLedger::default());
        let key = SessionKey::new::<TenantClass>(Uuid::new_v4());
        ledger.put(&key, "sid", Duration::from_millis(1)).await.unwrap();

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(
            LedgerSweeper::new(ledger.clone())
                .with_interval(Duration::from_millis(10))
                .run(shutdown.clone()),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(ledger.is_empty());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
