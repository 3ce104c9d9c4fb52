//! Escalation sweep
//!
//! Runs on an external timer. Each sweep finds requests that have stayed
//! open past the deadline and alerts every captain with one body listing the
//! overdue codes. Everything here is best-effort: failures are logged and
//! swallowed, and the next scheduled sweep retries naturally.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::config::AndonConfig;
use crate::gateway::SmsGateway;
use crate::guest::Role;
use crate::message::Message;
use crate::store::RecordStore;

/// Periodic deadline scan over open messages
pub struct EscalationMonitor {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn SmsGateway>,
    deadline: Duration,
}

impl EscalationMonitor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        gateway: Arc<dyn SmsGateway>,
        config: &AndonConfig,
    ) -> Self {
        // Out-of-range std Durations fall back to the default deadline
        let deadline = Duration::from_std(config.escalation_deadline)
            .unwrap_or_else(|_| Duration::minutes(2));
        Self {
            store,
            gateway,
            deadline,
        }
    }

    /// Run one sweep as of `now`
    ///
    /// Never returns an error; the sweep either completes, or logs what went
    /// wrong and leaves the retry to the next invocation. Returns how many
    /// overdue messages were reported, for callers that want to log it.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.deadline;

        let overdue = match self.store.open_messages_before(cutoff).await {
            Ok(overdue) => overdue,
            Err(error) => {
                error!(%error, "sweep: overdue-message query failed");
                return 0;
            }
        };
        if overdue.is_empty() {
            debug!("sweep: nothing overdue");
            return 0;
        }

        let captains = match self.store.guests_with_role(Role::Captain).await {
            Ok(captains) => captains,
            Err(error) => {
                error!(%error, "sweep: captain query failed");
                return 0;
            }
        };
        if captains.is_empty() {
            warn!(overdue = overdue.len(), "sweep: overdue requests but no captains");
            return overdue.len();
        }

        let body = escalation_body(&overdue);
        let sends = captains.iter().map(|captain| {
            let gateway = Arc::clone(&self.gateway);
            let body = body.clone();
            let to = captain.sms_number.clone();
            async move {
                if let Err(error) = gateway.send(&to, &body).await {
                    warn!(to = %to, %error, "escalation send failed");
                }
            }
        });
        join_all(sends).await;

        info!(
            overdue = overdue.len(),
            captains = captains.len(),
            "escalation sweep complete"
        );
        overdue.len()
    }

    /// Run one sweep as of the current wall clock
    pub async fn tick(&self) -> usize {
        self.sweep(Utc::now()).await
    }
}

/// One alert body listing every overdue code
fn escalation_body(overdue: &[Message]) -> String {
    let codes: Vec<&str> = overdue.iter().map(|m| m.id.as_str()).collect();
    format!(
        "Unacknowledged requests need attention: {}",
        codes.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RecordingGateway;
    use crate::guest::Guest;
    use crate::memory::MemoryStore;

    fn monitor(
        store: Arc<MemoryStore>,
        gateway: Arc<RecordingGateway>,
    ) -> EscalationMonitor {
        EscalationMonitor::new(store, gateway, &AndonConfig::default())
    }

    async fn aged_message(store: &MemoryStore, minutes_old: i64) -> Message {
        let mut msg = Message::anonymous("@ old request");
        msg.created_at = Utc::now() - Duration::minutes(minutes_old);
        store.put_message(&msg).await.unwrap();
        msg
    }

    #[tokio::test]
    async fn test_overdue_open_message_alerts_all_captains() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        store
            .put_guest(&Guest::new("+c1", "C1").with_role(Role::Captain))
            .await
            .unwrap();
        store
            .put_guest(&Guest::new("+c2", "C2").with_role(Role::Captain))
            .await
            .unwrap();
        let msg = aged_message(&store, 3).await;

        let reported = monitor(Arc::clone(&store), Arc::clone(&gateway))
            .sweep(Utc::now())
            .await;

        assert_eq!(reported, 1);
        for captain in ["+c1", "+c2"] {
            let bodies = gateway.sent_to(captain);
            assert_eq!(bodies.len(), 1);
            assert!(bodies[0].contains(msg.id.as_str()));
        }
    }

    #[tokio::test]
    async fn test_acknowledged_message_never_escalates() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        store
            .put_guest(&Guest::new("+c1", "C1").with_role(Role::Captain))
            .await
            .unwrap();
        let msg = aged_message(&store, 30).await;
        store.acknowledge_open(&msg.id).await.unwrap();

        let reported = monitor(Arc::clone(&store), Arc::clone(&gateway))
            .sweep(Utc::now())
            .await;

        assert_eq!(reported, 0);
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_message_is_not_overdue() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        store
            .put_guest(&Guest::new("+c1", "C1").with_role(Role::Captain))
            .await
            .unwrap();
        aged_message(&store, 1).await;

        let reported = monitor(Arc::clone(&store), Arc::clone(&gateway))
            .sweep(Utc::now())
            .await;

        assert_eq!(reported, 0);
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed_and_others_still_alerted() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        gateway.fail_number("+c1");
        store
            .put_guest(&Guest::new("+c1", "C1").with_role(Role::Captain))
            .await
            .unwrap();
        store
            .put_guest(&Guest::new("+c2", "C2").with_role(Role::Captain))
            .await
            .unwrap();
        aged_message(&store, 5).await;

        let reported = monitor(Arc::clone(&store), Arc::clone(&gateway))
            .sweep(Utc::now())
            .await;

        assert_eq!(reported, 1);
        assert_eq!(gateway.sent_to("+c2").len(), 1);
    }

    #[tokio::test]
    async fn test_multiple_overdue_codes_in_one_body() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        store
            .put_guest(&Guest::new("+c1", "C1").with_role(Role::Captain))
            .await
            .unwrap();
        let a = aged_message(&store, 4).await;
        let b = aged_message(&store, 7).await;

        monitor(Arc::clone(&store), Arc::clone(&gateway))
            .sweep(Utc::now())
            .await;

        let bodies = gateway.sent_to("+c1");
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains(a.id.as_str()));
        assert!(bodies[0].contains(b.id.as_str()));
    }
}
