// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Secrets only ever appear in request bodies; no response type carries a
//! secret or its hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{IdentityClass, Principal, RoleName};
use crate::storage::Identity;

// =============================================================================
// Login
// =============================================================================

/// Credentials presented at login.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Contact address (email)
    pub contact: String,
    pub secret: String,
}

/// Successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub id: Uuid,
    pub contact: String,
    pub role: String,
    /// Bearer token for subsequent requests
    pub token: String,
    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

// =============================================================================
// Current principal
// =============================================================================

/// The authenticated caller as the server currently sees it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub id: Uuid,
    pub contact: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl<C: IdentityClass> From<Principal<C>> for MeResponse {
    fn from(principal: Principal<C>) -> Self {
        Self {
            id: principal.id,
            contact: principal.contact,
            role: principal.role.as_str().to_string(),
            company_id: principal.company_id,
            expires_at: principal.expires_at,
        }
    }
}

// =============================================================================
// Identity management
// =============================================================================

/// New account created by an administrator or owner.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateIdentityRequest {
    pub name: String,
    pub contact: String,
    /// Initial secret; must satisfy the secret policy
    pub secret: String,
}

/// Owner self-service signup.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub contact: String,
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub id: Uuid,
    pub contact: String,
    pub company_id: Uuid,
    /// Always true: login is refused until the contact is verified
    pub verification_required: bool,
}

/// Query of the verification link.
#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyQuery {
    /// Verification token from the mail
    pub token: String,
}

// =============================================================================
// Credential recovery
// =============================================================================

/// Ask for a recovery code.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub contact: String,
}

/// Redeem a recovery code.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub contact: String,
    /// Six-digit code from the recovery mail
    pub code: String,
    /// New secret; must satisfy the secret policy
    pub secret: String,
}

/// Public view of an identity row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentityResponse {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl<R: RoleName> From<Identity<R>> for IdentityResponse {
    fn from(identity: Identity<R>) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            contact: identity.contact,
            role: identity.role.as_str().to_string(),
            company_id: identity.company_id,
            is_active: identity.is_active,
            is_deleted: identity.is_deleted,
            is_verified: identity.is_verified,
            created_at: identity.audit.created_at,
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AdminClass, AdminRole, TenantRole};

    #[test]
    fn identity_response_never_carries_hash() {
        let identity = Identity::new("Ann", "ann@corp.io", "$argon2id$secret", TenantRole::Owner, None);
        let json = serde_json::to_string(&IdentityResponse::from(identity)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"owner\""));
    }

    #[test]
    fn me_response_from_principal() {
        let identity = Identity::new("Root", "root@corp.io", "h", AdminRole::SuperAdmin, None);
        let principal = Principal::<AdminClass>::from_identity(&identity, "sid".into(), 42);
        let me = MeResponse::from(principal);
        assert_eq!(me.id, identity.id);
        assert_eq!(me.role, "super_admin");
        assert_eq!(me.company_id, None);
        assert_eq!(me.expires_at, 42);
    }

    #[test]
    fn login_request_parses() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"contact":"a@b.io","secret":"x"}"#).unwrap();
        assert_eq!(req.contact, "a@b.io");
    }
}
