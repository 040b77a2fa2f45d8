// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential recovery by one-time code.
//!
//! A recovery request stores an argon2 hash of a six-digit code with an
//! expiry and a small attempt budget, then mails the code. Redeeming it
//! replaces the secret, clears the challenge and revokes the live session.
//!
//! Unknown contacts get the same response as known ones and cost the same
//! hashing work, so neither endpoint reveals whether a contact is
//! registered.

use chrono::Utc;
use tracing::{debug, error, info};

use super::credentials::{hash_secret, stored_or_dummy_hash, verify_secret};
use super::gate::revoke;
use super::roles::IdentityClass;
use super::AuthError;
use crate::api::accounts::notify;
use crate::mail::MailMessage;
use crate::state::AppState;
use crate::storage::{Identity, ResetChallenge};

/// Wrong codes accepted before the challenge is dropped.
pub const RESET_ATTEMPTS: u8 = 5;

/// Digits in a recovery code.
const CODE_DIGITS: usize = 6;

fn generate_code() -> Result<String, AuthError> {
    let mut bytes = [0u8; 4];
    getrandom::getrandom(&mut bytes).map_err(|e| {
        error!(error = %e, "Recovery code generation failed");
        AuthError::AuthorityUnavailable
    })?;
    let value = u32::from_le_bytes(bytes) % 1_000_000;
    Ok(format!("{value:0width$}", width = CODE_DIGITS))
}

async fn hash_code(code: &str) -> Result<String, AuthError> {
    hash_secret(code).await.map_err(|e| {
        error!(error = %e, "Recovery code hashing failed");
        AuthError::AuthorityUnavailable
    })
}

async fn find_recoverable<C: IdentityClass>(
    state: &AppState,
    contact: &str,
) -> Result<Option<Identity<C::Role>>, AuthError> {
    let found = state
        .bounded(
            "identity store",
            C::store(state).find_by_contact(contact, C::ROLES),
        )
        .await?;
    Ok(found.filter(|identity| !identity.is_deleted))
}

/// Start recovery for `contact`.
///
/// Returns `Ok(())` whether or not the contact exists; the caller answers
/// with the same message either way.
pub async fn request_reset<C: IdentityClass>(
    state: &AppState,
    contact: &str,
) -> Result<(), AuthError> {
    let code = generate_code()?;
    let code_hash = hash_code(&code).await?;

    let Some(identity) = find_recoverable::<C>(state, contact).await? else {
        debug!(class = C::NAME, "Recovery requested for unknown contact");
        return Ok(());
    };

    let ttl = chrono::Duration::from_std(state.reset_code_ttl).map_err(|e| {
        error!(error = %e, "Recovery code lifetime out of range");
        AuthError::AuthorityUnavailable
    })?;
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(AuthError::AuthorityUnavailable)?;
    let challenge = ResetChallenge {
        code_hash,
        expires_at,
        attempts_left: RESET_ATTEMPTS,
    };
    state
        .bounded(
            "identity store",
            C::store(state).set_reset_challenge(identity.id, challenge),
        )
        .await?;

    let minutes = state.reset_code_ttl.as_secs().div_ceil(60);
    notify(
        state,
        MailMessage::reset_code(&identity.contact, &identity.name, &code, minutes),
    )
    .await;
    info!(class = C::NAME, identity_id = %identity.id, "Recovery code issued");
    Ok(())
}

/// Redeem a recovery code and set `new_secret`.
///
/// A missing account, a missing or expired challenge and a wrong code all
/// fail with [`AuthError::InvalidResetCode`]. A wrong code spends one
/// attempt.
pub async fn reset_secret<C: IdentityClass>(
    state: &AppState,
    contact: &str,
    code: &str,
    new_secret: &str,
) -> Result<Identity<C::Role>, AuthError> {
    let found = find_recoverable::<C>(state, contact).await?;
    let challenge = found.as_ref().and_then(|identity| identity.reset.clone());

    let stored = challenge.as_ref().map(|c| c.code_hash.as_str());
    let hash = stored_or_dummy_hash(stored).await?;
    let matches = verify_secret(code, &hash).await;

    let (identity, challenge) = match (found, challenge) {
        (Some(identity), Some(challenge)) => (identity, challenge),
        _ => {
            debug!(class = C::NAME, "Recovery code presented without a challenge");
            return Err(AuthError::InvalidResetCode);
        }
    };

    if challenge.is_expired(Utc::now()) {
        info!(class = C::NAME, identity_id = %identity.id, "Recovery refused: code expired");
        return Err(AuthError::InvalidResetCode);
    }
    if !matches {
        state
            .bounded(
                "identity store",
                C::store(state).consume_reset_attempt(identity.id),
            )
            .await?;
        info!(
            class = C::NAME,
            identity_id = %identity.id,
            attempts_left = challenge.attempts_left.saturating_sub(1),
            "Recovery refused: wrong code"
        );
        return Err(AuthError::InvalidResetCode);
    }

    let secret_hash = hash_secret(new_secret).await.map_err(|e| {
        error!(error = %e, "Secret hashing failed");
        AuthError::AuthorityUnavailable
    })?;
    let updated = state
        .bounded(
            "identity store",
            C::store(state).set_secret_hash(identity.id, secret_hash, Some(identity.id)),
        )
        .await?;

    revoke::<C>(state, identity.id).await?;
    info!(class = C::NAME, identity_id = %identity.id, "Secret reset");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::gate::login;
    use crate::auth::roles::{TenantClass, TenantRole};
    use crate::session::SessionKey;
    use crate::testing::{seed_user, test_state_with_mailer, TEST_SECRET};

    const NEW_SECRET: &str = "N3w@Secret9";

    fn code_from(body: &str) -> String {
        body.split(|c: char| !c.is_ascii_digit())
            .find(|part| part.len() == CODE_DIGITS)
            .unwrap()
            .to_string()
    }

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_code().unwrap();
            assert_eq!(code.len(), CODE_DIGITS);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn challenge_stores_only_a_hash() {
        let (state, mailer) = test_state_with_mailer();
        let seeded = seed_user(&state, "ann@corp.io", TenantRole::Owner).await;

        request_reset::<TenantClass>(&state, "ann@corp.io").await.unwrap();
        let code = code_from(&mailer.sent()[0].body);
        let row = state.users.find_by_id(seeded.id).await.unwrap().unwrap();
        let challenge = row.reset.unwrap();
        assert_ne!(challenge.code_hash, code);
        assert!(challenge.code_hash.starts_with("$argon2"));
        assert_eq!(challenge.attempts_left, RESET_ATTEMPTS);
    }

    #[tokio::test]
    async fn unknown_contact_sends_nothing() {
        let (state, mailer) = test_state_with_mailer();
        request_reset::<TenantClass>(&state, "nobody@corp.io").await.unwrap();
        assert!(mailer.sent().is_empty());

        let err = reset_secret::<TenantClass>(&state, "nobody@corp.io", "123456", NEW_SECRET)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidResetCode);
    }

    #[tokio::test]
    async fn wrong_code_spends_an_attempt() {
        let (state, mailer) = test_state_with_mailer();
        let seeded = seed_user(&state, "ann@corp.io", TenantRole::Owner).await;
        request_reset::<TenantClass>(&state, "ann@corp.io").await.unwrap();
        let code = code_from(&mailer.sent()[0].body);
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let err = reset_secret::<TenantClass>(&state, "ann@corp.io", wrong, NEW_SECRET)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidResetCode);

        let row = state.users.find_by_id(seeded.id).await.unwrap().unwrap();
        assert_eq!(row.reset.unwrap().attempts_left, RESET_ATTEMPTS - 1);
        assert_eq!(row.secret_hash, seeded.secret_hash);
    }

    #[tokio::test]
    async fn exhausted_attempts_void_the_code() {
        let (state, mailer) = test_state_with_mailer();
        seed_user(&state, "ann@corp.io", TenantRole::Owner).await;
        request_reset::<TenantClass>(&state, "ann@corp.io").await.unwrap();
        let code = code_from(&mailer.sent()[0].body);
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..RESET_ATTEMPTS {
            reset_secret::<TenantClass>(&state, "ann@corp.io", wrong, NEW_SECRET)
                .await
                .unwrap_err();
        }
        let err = reset_secret::<TenantClass>(&state, "ann@corp.io", &code, NEW_SECRET)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidResetCode);
    }

    #[tokio::test]
    async fn expired_code_is_refused() {
        let (state, mailer) = test_state_with_mailer();
        let state = state.with_reset_code_ttl(Duration::from_millis(1));
        seed_user(&state, "ann@corp.io", TenantRole::Owner).await;
        request_reset::<TenantClass>(&state, "ann@corp.io").await.unwrap();
        let code = code_from(&mailer.sent()[0].body);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let err = reset_secret::<TenantClass>(&state, "ann@corp.io", &code, NEW_SECRET)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidResetCode);
    }

    #[tokio::test]
    async fn reset_replaces_secret_and_ends_session() {
        let (state, mailer) = test_state_with_mailer();
        let seeded = seed_user(&state, "ann@corp.io", TenantRole::Owner).await;
        login::<TenantClass>(&state, "ann@corp.io", TEST_SECRET, TenantClass::ROLES)
            .await
            .unwrap();
        let key = SessionKey::new::<TenantClass>(seeded.id);
        assert!(state.ledger.get(&key).await.unwrap().is_some());

        request_reset::<TenantClass>(&state, "ann@corp.io").await.unwrap();
        let code = code_from(&mailer.sent()[0].body);
        let updated = reset_secret::<TenantClass>(&state, "ann@corp.io", &code, NEW_SECRET)
            .await
            .unwrap();

        assert!(updated.reset.is_none());
        assert!(state.ledger.get(&key).await.unwrap().is_none());
        assert!(login::<TenantClass>(&state, "ann@corp.io", NEW_SECRET, TenantClass::ROLES)
            .await
            .is_ok());
        let err = login::<TenantClass>(&state, "ann@corp.io", TEST_SECRET, TenantClass::ROLES)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);

        let err = reset_secret::<TenantClass>(&state, "ann@corp.io", &code, NEW_SECRET)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidResetCode);
    }
}
