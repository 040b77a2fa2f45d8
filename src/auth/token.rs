// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the single process-wide secret. Each
//! token names its identity class and purpose; decoding for one class or
//! purpose rejects tokens minted for another.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error};
use uuid::Uuid;

use super::claims::{TokenClaims, TokenPurpose};
use super::roles::{IdentityClass, RoleName};
use super::AuthError;
use crate::storage::Identity;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Expiration (Unix timestamp)
    pub expires_at: i64,
}

/// A token that passed signature, expiry, issuer, class and purpose checks.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub identity_id: Uuid,
    pub claims: TokenClaims,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    verification_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        access_ttl: Duration,
        verification_ttl: Duration,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            access_ttl,
            verification_ttl,
        }
    }

    /// Validity window of access tokens; also the ledger TTL.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Sign an access token bound to `session_id`.
    pub fn issue_access<C: IdentityClass>(
        &self,
        identity: &Identity<C::Role>,
        session_id: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.issue::<C>(
            identity,
            TokenPurpose::Access,
            Some(session_id.to_string()),
            self.access_ttl,
        )
    }

    /// Sign a contact-verification token.
    pub fn issue_verification<C: IdentityClass>(
        &self,
        identity: &Identity<C::Role>,
    ) -> Result<IssuedToken, AuthError> {
        self.issue::<C>(identity, TokenPurpose::Verify, None, self.verification_ttl)
    }

    fn issue<C: IdentityClass>(
        &self,
        identity: &Identity<C::Role>,
        purpose: TokenPurpose,
        sid: Option<String>,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let iat = Utc::now().timestamp();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| {
                error!(ttl_secs = ttl.as_secs(), "Token lifetime out of range");
                AuthError::TokenIssuanceFailed
            })?;
        let claims = TokenClaims {
            sub: identity.id.to_string(),
            email: identity.contact.clone(),
            role: identity.role.as_str().to_string(),
            cls: C::NAME.to_string(),
            sid,
            purpose,
            iss: self.issuer.clone(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            error!(identity_id = %identity.id, error = %e, "Token signing failed");
            AuthError::TokenIssuanceFailed
        })?;

        Ok(IssuedToken {
            token,
            expires_at: exp,
        })
    }

    /// Verify signature, expiry and issuer, then class and purpose.
    pub fn verify<C: IdentityClass>(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<VerifiedToken, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!(error = ?e.kind(), "Token rejected");
                AuthError::InvalidOrExpiredToken
            })?
            .claims;

        if claims.cls != C::NAME || claims.purpose != purpose {
            debug!(
                expected_class = C::NAME,
                class = %claims.cls,
                purpose = ?claims.purpose,
                "Token rejected: wrong class or purpose"
            );
            return Err(AuthError::InvalidOrExpiredToken);
        }
        if C::Role::parse(&claims.role).is_none() {
            return Err(AuthError::InvalidOrExpiredToken);
        }
        if purpose == TokenPurpose::Access && claims.sid.is_none() {
            return Err(AuthError::InvalidOrExpiredToken);
        }
        let identity_id = claims
            .identity_id()
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        Ok(VerifiedToken {
            identity_id,
            claims,
        })
    }
}
