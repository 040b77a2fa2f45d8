// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Identity & session authority for both identity classes.
//!
//! ## Flow
//!
//! 1. Login: [`credentials`] checks the secret, [`token`] signs an access
//!    token carrying a fresh session id, and the session ledger records that
//!    id under the identity's key.
//! 2. Every protected request: the [`gate`] verifies the token, compares its
//!    session id with the ledger, re-reads the identity row and hands a
//!    [`Principal`] to the handler.
//! 3. Role checks run on the fresh role via [`Authorized`]; tenant
//!    cross-company checks run in handlers via [`ownership`].
//! 4. Tenants who lost their secret redeem a mailed one-time code through
//!    [`recovery`], which also ends their live session.
//!
//! ## Security
//!
//! - HS256 with a single process secret; clock skew tolerance is 60 seconds
//! - A later login, a logout or a deactivation ends the previous session
//! - Ledger or store outages reject the request

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod ownership;
pub mod recovery;
pub mod roles;
pub mod token;

pub use claims::{Principal, TokenClaims, TokenPurpose};
pub use error::AuthError;
pub use extractor::{Auth, Authorized};
pub use roles::{
    AdminClass, AdminRole, AnyAdmin, AnyTenant, IdentityClass, OwnerOnly, RoleName,
    SuperAdminOnly, TenantClass, TenantRole,
};
pub use token::TokenIssuer;
