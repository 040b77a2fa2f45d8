// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Back-office Authority - Identity & Session Service
//!
//! Verifies credentials, issues signed access tokens, records live sessions
//! in a server-side ledger and authorizes every protected request for two
//! disjoint identity classes: administrators and tenant users.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credentials, tokens, the per-request gate and role checks
//! - `session` - Session ledger (in-memory LRU or Redis)
//! - `storage` - Identity store seam and in-memory implementation
//! - `bootstrap` - First-run super-admin seeding

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub mod testing;
