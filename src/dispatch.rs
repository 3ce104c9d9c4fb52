//! New-request notification fan-out
//!
//! Every message creation triggers exactly one dispatch attempt: the body is
//! built once and sent to every tyrant. Delivery is best-effort; a failure
//! for one recipient never aborts the others and never rolls back the stored
//! message.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::gateway::SmsGateway;
use crate::guest::Role;
use crate::message::Message;
use crate::store::{RecordStore, Result};

/// Outcome of one fan-out, aggregated for logging only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Recipients a send was attempted for
    pub attempted: usize,
    /// Sends that failed
    pub failed: usize,
}

/// Fans new messages out to tyrant-role guests
pub struct NotificationDispatcher {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn SmsGateway>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn RecordStore>, gateway: Arc<dyn SmsGateway>) -> Self {
        Self { store, gateway }
    }

    /// Notify every tyrant about a newly created message
    ///
    /// Errors only on the tyrant query; individual send failures are
    /// captured per recipient and reported through [`DispatchReport`].
    pub async fn dispatch(&self, message: &Message) -> Result<DispatchReport> {
        let tyrants = self.store.guests_with_role(Role::Tyrant).await?;
        if tyrants.is_empty() {
            info!(code = %message.id, "no tyrants to notify");
            return Ok(DispatchReport {
                attempted: 0,
                failed: 0,
            });
        }

        let body = notification_body(message);
        let sends = tyrants.iter().map(|tyrant| {
            let gateway = Arc::clone(&self.gateway);
            let body = body.clone();
            let to = tyrant.sms_number.clone();
            async move {
                let result = gateway.send(&to, &body).await;
                if let Err(ref error) = result {
                    warn!(to = %to, %error, "notification send failed");
                }
                result
            }
        });

        let results = join_all(sends).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            code = %message.id,
            attempted = results.len(),
            failed,
            "new-request fan-out complete"
        );
        Ok(DispatchReport {
            attempted: results.len(),
            failed,
        })
    }
}

/// One notification body shared by all recipients
fn notification_body(message: &Message) -> String {
    format!(
        "{}:\n{}\n\nReply \"{}\" to acknowledge.",
        message.sender_label(),
        message.body,
        message.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RecordingGateway;
    use crate::guest::Guest;
    use crate::memory::MemoryStore;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .put_guest(&Guest::new("+t1", "T1").with_role(Role::Tyrant))
            .await
            .unwrap();
        store
            .put_guest(&Guest::new("+t2", "T2").with_role(Role::Tyrant))
            .await
            .unwrap();
        store
            .put_guest(&Guest::new("+c1", "C1").with_role(Role::Captain))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_fans_out_to_every_tyrant_only() {
        let store = seeded_store().await;
        let gateway = Arc::new(RecordingGateway::new());
        let dispatcher = NotificationDispatcher::new(store, Arc::clone(&gateway) as _);

        let guest = Guest::new("+g", "Jordan");
        let msg = Message::checkin(&guest, "! need water");
        let report = dispatcher.dispatch(&msg).await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(gateway.sent_to("+t1").len(), 1);
        assert_eq!(gateway.sent_to("+t2").len(), 1);
        assert!(gateway.sent_to("+c1").is_empty());

        let body = &gateway.sent_to("+t1")[0];
        assert!(body.contains("From Jordan"));
        assert!(body.contains("! need water"));
        assert!(body.contains(msg.id.as_str()));
    }

    #[tokio::test]
    async fn test_anonymous_label_hides_sender() {
        let store = seeded_store().await;
        let gateway = Arc::new(RecordingGateway::new());
        let dispatcher = NotificationDispatcher::new(store, Arc::clone(&gateway) as _);

        let msg = Message::anonymous("@ the hall is cold");
        dispatcher.dispatch(&msg).await.unwrap();

        let body = &gateway.sent_to("+t1")[0];
        assert!(body.contains("Anonymous Message"));
        assert!(!body.contains("Jordan"));
    }

    #[tokio::test]
    async fn test_one_failing_recipient_does_not_block_others() {
        let store = seeded_store().await;
        let gateway = Arc::new(RecordingGateway::new());
        gateway.fail_number("+t1");
        let dispatcher = NotificationDispatcher::new(store, Arc::clone(&gateway) as _);

        let msg = Message::anonymous("@ hi");
        let report = dispatcher.dispatch(&msg).await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(gateway.sent_to("+t2").len(), 1);
    }

    #[tokio::test]
    async fn test_no_tyrants_is_a_quiet_noop() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let dispatcher = NotificationDispatcher::new(store, Arc::clone(&gateway) as _);

        let report = dispatcher
            .dispatch(&Message::anonymous("@ hi"))
            .await
            .unwrap();
        assert_eq!(report.attempted, 0);
        assert!(gateway.sent().is_empty());
    }
}
