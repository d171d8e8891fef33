//! Relay transport implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::MailConfig;
use crate::{PostmaskError, Result};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// User agent string for relay submissions.
const USER_AGENT: &str = "Postmask/1.0 (Mail Relay Client)";

/// One message handed to the relay for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    /// Visible sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
    /// Optional HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Reply-To header value.
    #[serde(rename = "replyTo")]
    pub reply_to: String,
}

/// Receipt returned by the relay for an accepted message.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayReceipt {
    /// Transport message identifier assigned by the relay.
    pub transport_id: String,
}

/// Narrow interface over the external mail relay.
///
/// The single operation may fail transiently; callers treat failure as
/// terminal for that delivery attempt.
#[async_trait]
pub trait MailRelay: Send + Sync {
    /// Submit one message for delivery.
    async fn send(&self, message: &OutboundMessage) -> Result<RelayReceipt>;
}

/// HTTP client for the relay submission endpoint.
pub struct HttpMailRelay {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpMailRelay {
    /// Create a new relay client from mail configuration.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.relay_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                PostmaskError::Transport(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: config.relay_endpoint.clone(),
            api_key: config.relay_api_key.clone(),
        })
    }
}

#[async_trait]
impl MailRelay for HttpMailRelay {
    async fn send(&self, message: &OutboundMessage) -> Result<RelayReceipt> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| PostmaskError::Transport(format!("relay request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PostmaskError::Transport(format!(
                "relay rejected message: {status} {body}"
            )));
        }

        response
            .json::<RelayReceipt>()
            .await
            .map_err(|e| PostmaskError::Transport(format!("bad relay response: {e}")))
    }
}

/// In-memory relay that records submitted messages.
///
/// Used in development when no relay provider is configured, and by the
/// test suites to observe fan-out behavior.
#[derive(Default)]
pub struct MemoryRelay {
    sent: std::sync::Mutex<Vec<OutboundMessage>>,
    fail_recipients: std::sync::Mutex<Vec<String>>,
}

impl MemoryRelay {
    /// Create an empty recording relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deliveries to the given recipient fail.
    pub fn fail_for(&self, recipient: &str) {
        self.fail_recipients
            .lock()
            .unwrap()
            .push(recipient.to_string());
    }

    /// Messages accepted so far, in submission order.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of accepted messages.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailRelay for MemoryRelay {
    async fn send(&self, message: &OutboundMessage) -> Result<RelayReceipt> {
        if self
            .fail_recipients
            .lock()
            .unwrap()
            .iter()
            .any(|r| r == &message.to)
        {
            return Err(PostmaskError::Transport(format!(
                "delivery to {} refused",
                message.to
            )));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(RelayReceipt {
            transport_id: format!("mem-{}", sent.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message(to: &str) -> OutboundMessage {
        OutboundMessage {
            from: "sales@m.test".to_string(),
            to: to.to_string(),
            subject: "Hello".to_string(),
            text: "Body".to_string(),
            html: None,
            reply_to: "sales@m.test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_relay_records_messages() {
        let relay = MemoryRelay::new();

        let receipt = relay.send(&sample_message("a@ext.com")).await.unwrap();
        assert_eq!(receipt.transport_id, "mem-1");

        let receipt = relay.send(&sample_message("b@ext.com")).await.unwrap();
        assert_eq!(receipt.transport_id, "mem-2");

        let sent = relay.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@ext.com");
    }

    #[tokio::test]
    async fn test_memory_relay_failure_injection() {
        let relay = MemoryRelay::new();
        relay.fail_for("bad@ext.com");

        let result = relay.send(&sample_message("bad@ext.com")).await;
        assert!(matches!(result, Err(PostmaskError::Transport(_))));
        assert_eq!(relay.sent_count(), 0);

        relay.send(&sample_message("good@ext.com")).await.unwrap();
        assert_eq!(relay.sent_count(), 1);
    }

    #[test]
    fn test_outbound_message_serialization() {
        let message = sample_message("a@ext.com");
        let json = serde_json::to_value(&message).unwrap();
        // html is omitted when absent; reply-to uses the relay's field name
        assert!(json.get("html").is_none());
        assert_eq!(json["replyTo"], "sales@m.test");
    }

    #[test]
    fn test_http_relay_construction() {
        let config = MailConfig::default();
        assert!(HttpMailRelay::new(&config).is_ok());
    }
}
