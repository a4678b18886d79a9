//! Delivery of password reset links.
//!
//! Sending mail is not the gateway's job. Whatever delivers the link
//! implements [`ResetLinkSender`]; the default implementation only records
//! that a link was requested.

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait ResetLinkSender: Send + Sync {
    /// Delivers `token` to `email`. The token is valid for `validity`.
    async fn send_reset_link(&self, email: &str, token: &str, validity: Duration)
    -> anyhow::Result<()>;
}

/// Logs the request without the token.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogResetLinkSender;

#[async_trait]
impl ResetLinkSender for LogResetLinkSender {
    async fn send_reset_link(
        &self,
        email: &str,
        _token: &str,
        validity: Duration,
    ) -> anyhow::Result<()> {
        tracing::info!(
            email = %email,
            valid_for_minutes = validity.as_secs() / 60,
            "Password reset link ready for delivery"
        );
        Ok(())
    }
}
