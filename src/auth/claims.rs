// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the trusted principal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::roles::{IdentityClass, RoleName};
use crate::storage::Identity;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    /// Bearer assertion accepted by the gate
    Access,
    /// Contact verification link; never accepted by the gate
    Verify,
}

/// Claims carried by every token this service signs.
///
/// `email` and `role` are informational. The gate re-reads both from the
/// identity store and never trusts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identity id
    pub sub: String,
    /// Contact address at issuance
    pub email: String,
    /// Role at issuance
    pub role: String,
    /// Identity class (`admin` / `user`)
    pub cls: String,
    /// Session id, matched against the ledger (access tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub purpose: TokenPurpose,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn identity_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// The authenticated caller, built from the freshly read identity row.
#[derive(Debug)]
pub struct Principal<C: IdentityClass> {
    pub id: Uuid,
    pub role: C::Role,
    pub contact: String,
    /// Company of a tenant identity
    pub company_id: Option<Uuid>,
    /// Ledger session this request is running under
    pub session_id: String,
    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl<C: IdentityClass> Clone for Principal<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            role: self.role,
            contact: self.contact.clone(),
            company_id: self.company_id,
            session_id: self.session_id.clone(),
            expires_at: self.expires_at,
        }
    }
}

impl<C: IdentityClass> Principal<C> {
    pub fn from_identity(identity: &Identity<C::Role>, session_id: String, expires_at: i64) -> Self {
        Self {
            id: identity.id,
            role: identity.role,
            contact: identity.contact.clone(),
            company_id: identity.company_id,
            session_id,
            expires_at,
        }
    }

    /// Role policy check against an explicit role set.
    pub fn has_any_role(&self, required: &[C::Role]) -> bool {
        super::roles::allowed(self.role, required)
    }

    pub fn role_name(&self) -> &'static str {
        self.role.as_str()
    }
}
