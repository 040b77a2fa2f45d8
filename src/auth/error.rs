// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authority errors.
//!
//! Every failure of login, token issuance or the per-request gate maps onto
//! one of these variants. Messages are deliberately generic: they never say
//! whether an account exists, how far a token decoded, or what a backend
//! reported. Detail belongs in the server log at the point where a lower
//! level error is collapsed into one of these.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Malformed request input
    #[error("Invalid input: {0}")]
    ValidationFailed(String),
    /// Unknown contact or wrong secret (indistinguishable on purpose)
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Identity exists but has been deactivated
    #[error("Account is inactive")]
    AccountInactive,
    /// Identity has been soft-deleted
    #[error("Account not found")]
    AccountNotFound,
    /// Self-service signup that never confirmed its contact address
    #[error("Account not verified")]
    AccountNotVerified,
    /// No bearer assertion on the request
    #[error("Authorization header is required")]
    MissingAssertion,
    /// Bad signature, bad structure, wrong class or purpose, or expired
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,
    /// Ledger has no record, or a different one, for this identity
    #[error("Session expired or revoked")]
    SessionExpiredOrRevoked,
    /// Identity no longer resolves as active and non-deleted
    #[error("Identity not found")]
    IdentityNotFound,
    /// Recovery code unknown, wrong, spent or expired
    #[error("Invalid or expired reset code")]
    InvalidResetCode,
    /// Role or ownership mismatch
    #[error("Insufficient permissions for this operation")]
    Forbidden,
    /// Signing failed; no token is returned
    #[error("Token issuance failed")]
    TokenIssuanceFailed,
    /// Ledger or identity store unreachable, slow or failing
    #[error("Authority unavailable")]
    AuthorityUnavailable,
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::ValidationFailed(_) => "validation_failed",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountInactive => "account_inactive",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::AccountNotVerified => "account_not_verified",
            AuthError::MissingAssertion => "missing_assertion",
            AuthError::InvalidOrExpiredToken => "invalid_or_expired_token",
            AuthError::SessionExpiredOrRevoked => "session_expired_or_revoked",
            AuthError::IdentityNotFound => "identity_not_found",
            AuthError::InvalidResetCode => "invalid_reset_code",
            AuthError::Forbidden => "forbidden",
            AuthError::TokenIssuanceFailed => "token_issuance_failed",
            AuthError::AuthorityUnavailable => "authority_unavailable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationFailed(_) | AuthError::InvalidResetCode => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::AccountNotFound
            | AuthError::AccountNotVerified
            | AuthError::MissingAssertion
            | AuthError::InvalidOrExpiredToken
            | AuthError::SessionExpiredOrRevoked
            | AuthError::IdentityNotFound => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::TokenIssuanceFailed | AuthError::AuthorityUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            message: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_assertion_returns_401() {
        let response = AuthError::MissingAssertion.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_assertion");
        assert_eq!(body["message"], "Authorization header is required");
    }

    #[tokio::test]
    async fn forbidden_returns_403() {
        let response = AuthError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn backend_failures_fail_closed_as_500() {
        assert_eq!(
            AuthError::AuthorityUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::TokenIssuanceFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn invalid_reset_code_is_400() {
        let response = AuthError::InvalidResetCode.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "invalid_reset_code");
    }

    #[test]
    fn validation_failure_is_400() {
        let err = AuthError::ValidationFailed("contact is required".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid input: contact is required");
    }
}
