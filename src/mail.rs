// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound mail.
//!
//! Templated delivery is an external collaborator; the service only needs
//! to hand a message off. [`LogMailer`] is the default sender and writes
//! messages to the log.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Contact verification for a self-service signup.
    pub fn verification(to: &str, name: &str, link: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verify your account".to_string(),
            body: format!(
                "Hello {name},\n\nConfirm your address by opening the link below. \
                 It expires in 24 hours.\n\n{link}\n"
            ),
        }
    }

    /// Notice that someone else created an account for `to`.
    pub fn account_created(to: &str, name: &str, role: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your account is ready".to_string(),
            body: format!(
                "Hello {name},\n\nAn account with role {role} was created for you. \
                 Your administrator will share your initial password.\n"
            ),
        }
    }

    /// One-time code for credential recovery.
    pub fn reset_code(to: &str, name: &str, code: &str, valid_minutes: u64) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your password reset code".to_string(),
            body: format!(
                "Hello {name},\n\nUse the code below to choose a new password. \
                 It expires in {valid_minutes} minutes.\n\n{code}\n\n\
                 If you did not ask for this, ignore this message.\n"
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "Mail queued");
        debug!(body = %message.body, "Mail body");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_mail_carries_link() {
        let msg = MailMessage::verification("ann@corp.io", "Ann", "https://x/verify?token=t");
        assert_eq!(msg.to, "ann@corp.io");
        assert!(msg.body.contains("https://x/verify?token=t"));
        assert!(msg.body.contains("Ann"));
    }

    #[test]
    fn account_created_mail_never_contains_a_secret() {
        let msg = MailMessage::account_created("emp@corp.io", "Emp", "employee");
        assert!(msg.body.contains("employee"));
        assert!(!msg.body.to_lowercase().contains("password:"));
    }

    #[test]
    fn reset_mail_carries_code_and_lifetime() {
        let msg = MailMessage::reset_code("ann@corp.io", "Ann", "042917", 5);
        assert!(msg.body.contains("042917"));
        assert!(msg.body.contains("5 minutes"));
    }

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let msg = MailMessage::account_created("a@b.io", "A", "sub_admin");
        assert!(LogMailer.send(msg).await.is_ok());
    }
}
