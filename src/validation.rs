// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request field validation.
//!
//! Failures carry a short, client-safe reason and map to
//! `AuthError::ValidationFailed` (400).

use crate::auth::AuthError;
use crate::storage::normalize_contact;

/// Maximum length of a contact address.
const MAX_CONTACT_LEN: usize = 254;

/// Secret length bounds (inclusive), counted in characters.
const SECRET_MIN_LEN: usize = 8;
const SECRET_MAX_LEN: usize = 16;

/// Specials accepted in secrets.
const SECRET_SPECIALS: &str = "@$!%*?&";

/// Display name bounds for self-service signup.
pub const SIGNUP_NAME_LEN: (usize, usize) = (3, 30);

/// Display name bounds for accounts created by someone else.
pub const MANAGED_NAME_LEN: (usize, usize) = (1, 64);

fn invalid(reason: &str) -> AuthError {
    AuthError::ValidationFailed(reason.to_string())
}

/// Check a contact address and return it normalized.
pub fn validate_contact(contact: &str) -> Result<String, AuthError> {
    let contact = normalize_contact(contact);
    if contact.is_empty() {
        return Err(invalid("contact is required"));
    }
    if contact.len() > MAX_CONTACT_LEN || contact.chars().any(char::is_whitespace) {
        return Err(invalid("contact is not a valid email address"));
    }

    let (local, domain) = contact
        .split_once('@')
        .ok_or_else(|| invalid("contact is not a valid email address"))?;
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..");
    if local.is_empty() || !domain_ok {
        return Err(invalid("contact is not a valid email address"));
    }
    Ok(contact)
}

/// A presented login secret only has to be non-empty.
pub fn validate_login_secret(secret: &str) -> Result<(), AuthError> {
    if secret.is_empty() {
        return Err(invalid("secret is required"));
    }
    Ok(())
}

/// Policy for newly chosen secrets.
pub fn validate_new_secret(secret: &str) -> Result<(), AuthError> {
    let len = secret.chars().count();
    let allowed = secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || SECRET_SPECIALS.contains(c));
    let upper = secret.chars().any(|c| c.is_ascii_uppercase());
    let digit = secret.chars().any(|c| c.is_ascii_digit());
    let special = secret.chars().any(|c| SECRET_SPECIALS.contains(c));

    if !(SECRET_MIN_LEN..=SECRET_MAX_LEN).contains(&len) || !allowed || !upper || !digit || !special
    {
        return Err(invalid(
            "secret must be 8-16 characters with an uppercase letter, a digit and one of @$!%*?&",
        ));
    }
    Ok(())
}

/// Check a display name and return it trimmed.
pub fn validate_name(name: &str, (min, max): (usize, usize)) -> Result<String, AuthError> {
    let name = name.trim();
    let len = name.chars().count();
    if len < min || len > max {
        return Err(AuthError::ValidationFailed(format!(
            "name must be between {min} and {max} characters"
        )));
    }
    Ok(name.to_string())
}
