// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Roles, identity classes and the role policy.
//!
//! ## Two universes
//!
//! Administrative identities (`AdminRole`) and tenant identities
//! (`TenantRole`) live in separate stores and carry separate role types.
//! Code that is generic over an [`IdentityClass`] only ever sees one of the
//! two role types, so an owner can never be compared against a super-admin
//! requirement: the comparison does not type-check.
//!
//! ## Policy
//!
//! [`allowed`] is the only role predicate. Route-level requirements are
//! expressed as [`RoleRequirement`] marker types whose required set is a
//! constant drawn from a single universe.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;
use crate::storage::IdentityStore;

/// Common behaviour of both role enums.
pub trait RoleName:
    Copy + Eq + Hash + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Wire name used in tokens and responses.
    fn as_str(&self) -> &'static str;

    /// Parse a wire name (case-insensitive).
    fn parse(s: &str) -> Option<Self>;
}

/// Administrative roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Manages sub-admins and everything they manage
    SuperAdmin,
    /// Manages catalog taxonomy and tenant accounts
    SubAdmin,
}

/// Tenant (end-user) roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TenantRole {
    /// Owns a company and its employees
    Owner,
    /// Works for exactly one company
    Employee,
}

impl RoleName for AdminRole {
    fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::SubAdmin => "sub_admin",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "super_admin" => Some(AdminRole::SuperAdmin),
            "sub_admin" => Some(AdminRole::SubAdmin),
            _ => None,
        }
    }
}

impl RoleName for TenantRole {
    fn as_str(&self) -> &'static str {
        match self {
            TenantRole::Owner => "owner",
            TenantRole::Employee => "employee",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "owner" => Some(TenantRole::Owner),
            "employee" => Some(TenantRole::Employee),
            _ => None,
        }
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for TenantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role policy: is `role` one of `required`?
pub fn allowed<R: PartialEq>(role: R, required: &[R]) -> bool {
    required.contains(&role)
}

/// An identity class: one store, one role universe, one token audience.
pub trait IdentityClass: Send + Sync + 'static {
    type Role: RoleName;

    /// Class name embedded in tokens (`cls`) and ledger keys.
    const NAME: &'static str;

    /// Every role of this class.
    const ROLES: &'static [Self::Role];

    /// The identity store backing this class.
    fn store(state: &AppState) -> &Arc<dyn IdentityStore<Self::Role>>;
}

/// Super-admins and sub-admins.
#[derive(Debug, Clone, Copy)]
pub struct AdminClass;

/// Owners and employees.
#[derive(Debug, Clone, Copy)]
pub struct TenantClass;

impl IdentityClass for AdminClass {
    type Role = AdminRole;
    const NAME: &'static str = "admin";
    const ROLES: &'static [AdminRole] = &[AdminRole::SuperAdmin, AdminRole::SubAdmin];

    fn store(state: &AppState) -> &Arc<dyn IdentityStore<AdminRole>> {
        &state.admins
    }
}

impl IdentityClass for TenantClass {
    type Role = TenantRole;
    const NAME: &'static str = "user";
    const ROLES: &'static [TenantRole] = &[TenantRole::Owner, TenantRole::Employee];

    fn store(state: &AppState) -> &Arc<dyn IdentityStore<TenantRole>> {
        &state.users
    }
}

/// A route's required role set, fixed at compile time.
pub trait RoleRequirement: Send + Sync + 'static {
    type Class: IdentityClass;

    const REQUIRED: &'static [<Self::Class as IdentityClass>::Role];
}

/// Only super-admins.
pub struct SuperAdminOnly;

/// Any administrative role.
pub struct AnyAdmin;

/// Only company owners.
pub struct OwnerOnly;

/// Any tenant role.
pub struct AnyTenant;

impl RoleRequirement for SuperAdminOnly {
    type Class = AdminClass;
    const REQUIRED: &'static [AdminRole] = &[AdminRole::SuperAdmin];
}

impl RoleRequirement for AnyAdmin {
    type Class = AdminClass;
    const REQUIRED: &'static [AdminRole] = AdminClass::ROLES;
}

impl RoleRequirement for OwnerOnly {
    type Class = TenantClass;
    const REQUIRED: &'static [TenantRole] = &[TenantRole::Owner];
}

impl RoleRequirement for AnyTenant {
    type Class = TenantClass;
    const REQUIRED: &'static [TenantRole] = TenantClass::ROLES;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_requirement_rejects_sub_admin() {
        assert!(allowed(AdminRole::SuperAdmin, SuperAdminOnly::REQUIRED));
        assert!(!allowed(AdminRole::SubAdmin, SuperAdminOnly::REQUIRED));
    }

    #[test]
    fn any_admin_accepts_both_admin_roles() {
        for role in AdminClass::ROLES {
            assert!(allowed(*role, AnyAdmin::REQUIRED));
        }
    }

    #[test]
    fn owner_requirement_rejects_employee() {
        assert!(allowed(TenantRole::Owner, OwnerOnly::REQUIRED));
        assert!(!allowed(TenantRole::Employee, OwnerOnly::REQUIRED));
        assert!(allowed(TenantRole::Employee, AnyTenant::REQUIRED));
    }

    #[test]
    fn empty_requirement_denies_everyone() {
        assert!(!allowed(AdminRole::SuperAdmin, &[]));
        assert!(!allowed(TenantRole::Owner, &[]));
    }

    #[test]
    fn parse_is_case_insensitive_and_closed() {
        assert_eq!(AdminRole::parse("SUPER_ADMIN"), Some(AdminRole::SuperAdmin));
        assert_eq!(AdminRole::parse("owner"), None);
        assert_eq!(TenantRole::parse("Employee"), Some(TenantRole::Employee));
        assert_eq!(TenantRole::parse("sub_admin"), None);
    }

    #[test]
    fn wire_names_match_serde() {
        let json = serde_json::to_string(&AdminRole::SubAdmin).unwrap();
        assert_eq!(json, format!("\"{}\"", AdminRole::SubAdmin.as_str()));
        let json = serde_json::to_string(&TenantRole::Owner).unwrap();
        assert_eq!(json, "\"owner\"");
    }

    #[test]
    fn class_names_differ() {
        assert_ne!(AdminClass::NAME, TenantClass::NAME);
    }
}
