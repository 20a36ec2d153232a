//! Outbound notifications.

use async_trait::async_trait;

/// Template used for the activation email sent after onboarding.
pub const WELCOME_TEMPLATE: &str = "user_welcome";

/// Delivers templated messages to a recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        template: &str,
        data: serde_json::Value,
    ) -> anyhow::Result<()>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        recipient: &str,
        template: &str,
        data: serde_json::Value,
    ) -> anyhow::Result<()> {
        tracing::info!(%recipient, %template, %data, "notification");
        Ok(())
    }
}
