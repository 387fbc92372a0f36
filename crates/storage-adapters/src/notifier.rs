//! Outbound announcement of new listings.

use async_trait::async_trait;
use domains::{ChannelNotifier, Result};
use uuid::Uuid;

/// Used when no channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl ChannelNotifier for NoopNotifier {
    async fn notify_item_created(&self, item_id: Uuid) -> Result<()> {
        tracing::debug!(%item_id, "no channel configured, skipping notification");
        Ok(())
    }
}

#[cfg(feature = "notify-http")]
pub use webhook::WebhookNotifier;

#[cfg(feature = "notify-http")]
mod webhook {
    use std::time::Duration;

    use async_trait::async_trait;
    use domains::{ChannelNotifier, DomainError, Result};
    use serde::Serialize;
    use uuid::Uuid;

    #[derive(Serialize)]
    struct ItemCreated {
        item_id: Uuid,
    }

    /// POSTs `{"item_id": ...}` to a webhook. The client timeout bounds how
    /// long a submission can wait on the channel.
    pub struct WebhookNotifier {
        client: reqwest::Client,
        url: String,
    }

    impl WebhookNotifier {
        pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|err| DomainError::Notify(err.to_string()))?;
            Ok(Self { client, url: url.into() })
        }
    }

    #[async_trait]
    impl ChannelNotifier for WebhookNotifier {
        async fn notify_item_created(&self, item_id: Uuid) -> Result<()> {
            let response = self
                .client
                .post(&self.url)
                .json(&ItemCreated { item_id })
                .send()
                .await
                .map_err(|err| DomainError::Notify(err.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(DomainError::Notify(format!("channel responded with {status}")));
            }
            tracing::debug!(%item_id, "channel notified");
            Ok(())
        }
    }

}
