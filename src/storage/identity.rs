// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity rows as seen by the authority.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Canonical form of a contact address for storage and comparison.
///
/// Trims, applies NFKC and lowercases, so `" Alice@Example.COM"` and
/// `"alice@example.com"` are the same contact.
pub fn normalize_contact(contact: &str) -> String {
    contact.trim().nfkc().collect::<String>().to_lowercase()
}

/// Who touched a row, and when.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditTrail {
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<Uuid>,
}

impl AuditTrail {
    pub fn created(by: Option<Uuid>) -> Self {
        Self {
            created_at: Utc::now(),
            created_by: by,
            updated_at: None,
            updated_by: None,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn touch(&mut self, by: Option<Uuid>) {
        self.updated_at = Some(Utc::now());
        self.updated_by = by;
    }

    pub fn mark_deleted(&mut self, by: Option<Uuid>) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.deleted_by = by;
        self.updated_at = Some(now);
        self.updated_by = by;
    }
}

/// Pending credential-recovery code for one identity.
///
/// Only the argon2 hash of the code is kept. The challenge is dropped after
/// a successful reset or once `attempts_left` reaches zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetChallenge {
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts_left: u8,
}

impl ResetChallenge {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// An identity row, generic over its role universe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity<R> {
    pub id: Uuid,
    pub name: String,
    /// Normalized contact address (see [`normalize_contact`])
    pub contact: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub secret_hash: String,
    pub role: R,
    /// Company the identity belongs to (tenant identities only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub is_verified: bool,
    pub audit: AuditTrail,
    #[serde(skip)]
    pub reset: Option<ResetChallenge>,
}

impl<R> Identity<R> {
    /// A new active, verified identity with a fresh id.
    pub fn new(
        name: impl Into<String>,
        contact: &str,
        secret_hash: impl Into<String>,
        role: R,
        created_by: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            contact: normalize_contact(contact),
            secret_hash: secret_hash.into(),
            role,
            company_id: None,
            is_active: true,
            is_deleted: false,
            is_verified: true,
            audit: AuditTrail::created(created_by),
            reset: None,
        }
    }

    pub fn with_company(mut self, company_id: Uuid) -> Self {
        self.company_id = Some(company_id);
        self
    }

    /// Require contact verification before the first login.
    pub fn unverified(mut self) -> Self {
        self.is_verified = false;
        self
    }

    /// Active and not soft-deleted.
    pub fn is_live(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::TenantRole;

    #[test]
    fn normalize_contact_folds_case_and_whitespace() {
        assert_eq!(normalize_contact("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn normalize_contact_applies_nfkc() {
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(normalize_contact("ＡＢＣ@example.com"), "abc@example.com");
    }

    #[test]
    fn new_identity_is_live_and_verified() {
        let identity = Identity::new("Ann", "Ann@Corp.io", "hash", TenantRole::Owner, None);
        assert_eq!(identity.contact, "ann@corp.io");
        assert!(identity.is_live());
        assert!(identity.is_verified);
        assert!(identity.company_id.is_none());
    }

    #[test]
    fn secret_hash_is_never_serialized() {
        let identity = Identity::new("Ann", "ann@corp.io", "secret-hash", TenantRole::Owner, None);
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn mark_deleted_records_actor() {
        let actor = Uuid::new_v4();
        let mut audit = AuditTrail::created(None);
        audit.mark_deleted(Some(actor));
        assert_eq!(audit.deleted_by, Some(actor));
        assert!(audit.deleted_at.is_some());
        assert_eq!(audit.updated_by, Some(actor));
    }
}
