// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use backoffice_authority::{
    api::router,
    auth::{credentials::dummy_hash, AdminRole, TenantRole, TokenIssuer},
    bootstrap::seed_super_admin,
    config::{AuthorityConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    mail::LogMailer,
    session::{InMemoryLedger, LedgerSweeper, SessionLedger},
    state::AppState,
    storage::InMemoryIdentityStore,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

async fn build_ledger(
    config: &AuthorityConfig,
    shutdown: &CancellationToken,
) -> Result<Arc<dyn SessionLedger>, String> {
    #[cfg(feature = "redis")]
    {
        if let Some(url) = &config.redis_url {
            let ledger = backoffice_authority::session::RedisLedger::connect(url)
                .await
                .map_err(|e| e.to_string())?;
            info!("Session ledger: redis");
            return Ok(Arc::new(ledger));
        }
    }

    #[cfg(not(feature = "redis"))]
    {
        if config.redis_url.is_some() {
            warn!("REDIS_URL is set but the redis feature is disabled; using in-memory ledger");
        }
    }

    let ledger = Arc::new(InMemoryLedger::new(config.session_capacity));
    tokio::spawn(LedgerSweeper::new(ledger.clone()).run(shutdown.clone()));
    info!(capacity = config.session_capacity, "Session ledger: in-memory");
    Ok(ledger)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match AuthorityConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if config.weak_secret() {
        warn!("JWT_SECRET is shorter than 32 bytes");
    }

    if let Err(e) = dummy_hash().await {
        error!(error = %e, "Could not prepare credential hashing");
        return ExitCode::FAILURE;
    }

    let shutdown = CancellationToken::new();
    let ledger = match build_ledger(&config, &shutdown).await {
        Ok(ledger) => ledger,
        Err(e) => {
            error!(error = %e, "Session ledger unavailable");
            return ExitCode::FAILURE;
        }
    };

    let tokens = TokenIssuer::new(
        config.jwt_secret.as_bytes(),
        &config.token_issuer,
        config.token_ttl,
        config.verification_ttl,
    );
    let state = AppState::new(
        Arc::new(InMemoryIdentityStore::<AdminRole>::new()),
        Arc::new(InMemoryIdentityStore::<TenantRole>::new()),
        ledger,
        tokens,
        Arc::new(LogMailer),
    )
    .with_backend_timeout(config.backend_timeout)
    .with_reset_code_ttl(config.reset_code_ttl)
    .with_public_base_url(&config.public_base_url);

    if let Err(e) = seed_super_admin(&state, config.bootstrap.as_ref()).await {
        error!(error = %e, "Super-admin bootstrap failed");
        return ExitCode::FAILURE;
    }

    let app = router(state);

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(%addr, "Back-office authority listening (docs at /docs)");

    tokio::spawn(shutdown_signal(shutdown.clone()));
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;

    match served {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
