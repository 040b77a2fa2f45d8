// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resource-scoped tenant checks.
//!
//! The gate answers "who is calling and in what role". Whether an owner may
//! act on a particular employee depends on the employee, so handlers check
//! it after loading the target.

use uuid::Uuid;

use super::claims::Principal;
use super::roles::{TenantClass, TenantRole};
use super::AuthError;
use crate::storage::Identity;

/// A resource that belongs to a company.
pub trait CompanyScoped {
    fn company_id(&self) -> Option<Uuid>;
}

impl CompanyScoped for Identity<TenantRole> {
    fn company_id(&self) -> Option<Uuid> {
        self.company_id
    }
}

/// Same-company enforcement.
pub trait CompanyGuard {
    /// `Forbidden` unless the resource belongs to the principal's company.
    fn verify_company(&self, principal: &Principal<TenantClass>) -> Result<(), AuthError>;
}

impl<T: CompanyScoped> CompanyGuard for T {
    fn verify_company(&self, principal: &Principal<TenantClass>) -> Result<(), AuthError> {
        match (self.company_id(), principal.company_id) {
            (Some(resource), Some(caller)) if resource == caller => Ok(()),
            _ => Err(AuthError::Forbidden),
        }
    }
}

/// An employee record the calling owner may manage.
///
/// The target must be an employee (never another owner or the caller) in
/// the caller's company.
pub fn managed_employee(
    principal: &Principal<TenantClass>,
    target: &Identity<TenantRole>,
) -> Result<(), AuthError> {
    if target.id == principal.id || target.role != TenantRole::Employee {
        return Err(AuthError::Forbidden);
    }
    target.verify_company(principal)
}
