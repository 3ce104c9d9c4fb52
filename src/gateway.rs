//! SMS gateway abstraction
//!
//! Outbound delivery is an external collaborator; the core only needs
//! `send(to, body)`. The webhook/provider plumbing lives outside this crate.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("send to {to} failed: {reason}")]
    SendFailed { to: String, reason: String },
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Trait for outbound SMS delivery backends
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver `body` to the phone number `to`
    async fn send(&self, to: &str, body: &str) -> Result<()>;
}

/// Gateway backend that records outbound traffic instead of delivering it
///
/// Used by the test suite and for local demos. Specific numbers can be made
/// to fail, which is how partial fan-out failure is exercised.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future send to `number` fail
    pub fn fail_number(&self, number: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(number.into());
        }
    }

    /// All `(to, body)` pairs sent so far, in send order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Bodies sent to a specific number
    pub fn sent_to(&self, number: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == number)
            .map(|(_, body)| body)
            .collect()
    }
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        let failing = self
            .failing
            .lock()
            .map(|f| f.contains(to))
            .unwrap_or(false);
        if failing {
            return Err(GatewayError::SendFailed {
                to: to.to_string(),
                reason: "configured to fail".to_string(),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((to.to_string(), body.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_gateway_captures_sends() {
        let gateway = RecordingGateway::new();
        gateway.send("+1", "hello").await.unwrap();
        gateway.send("+2", "world").await.unwrap();

        assert_eq!(gateway.sent().len(), 2);
        assert_eq!(gateway.sent_to("+1"), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_number_errors() {
        let gateway = RecordingGateway::new();
        gateway.fail_number("+1");
        assert!(gateway.send("+1", "hello").await.is_err());
        assert!(gateway.sent().is_empty());
    }
}
