//! Acknowledgment matching
//!
//! A tyrant closes an open request by replying with its 3-character code.
//! Anything that is not a live open code is a silent no-match so the router
//! can fall through to its generic help reply; only a genuine store failure
//! surfaces as an error.

use tracing::{debug, info};

use crate::guest::Guest;
use crate::message::MessageId;
use crate::store::{CasOutcome, RecordStore, Result};

/// Attempt to resolve free-form reply text as an acknowledgment
///
/// Returns `Ok(Some(reply))` when a code was matched and the message
/// transitioned to Acknowledged, `Ok(None)` when there is nothing to
/// acknowledge. Under concurrent duplicate replies the store's conditional
/// update guarantees exactly one caller gets the confirmation.
pub async fn try_acknowledge(
    store: &dyn RecordStore,
    guest: &Guest,
    text: &str,
) -> Result<Option<String>> {
    if !guest.role.can_acknowledge() {
        return Ok(None);
    }

    let Some(candidate) = MessageId::candidate_from_text(text) else {
        return Ok(None);
    };

    match store.acknowledge_open(&candidate).await? {
        CasOutcome::Applied => {
            info!(code = %candidate, by = %guest.sms_number, "request acknowledged");
            Ok(Some(format!("Acknowledged {}. Thank you!", candidate)))
        }
        CasOutcome::ConditionFailed => {
            debug!(code = %candidate, "no open message for candidate code");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guest::Role;
    use crate::memory::MemoryStore;
    use crate::message::{Message, MessageStatus};

    #[tokio::test]
    async fn test_non_tyrant_never_touches_message_state() {
        let store = MemoryStore::new();
        let msg = Message::anonymous("@ hi");
        store.put_message(&msg).await.unwrap();

        for role in [Role::Guest, Role::Captain] {
            let guest = Guest::new("+1", "A").with_role(role);
            let reply = try_acknowledge(&store, &guest, msg.id.as_str())
                .await
                .unwrap();
            assert!(reply.is_none());
        }
        let stored = store.get_message(&msg.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MessageStatus::Open);
    }

    #[tokio::test]
    async fn test_tyrant_ack_matches_lowercase_with_trailing_text() {
        let store = MemoryStore::new();
        let msg = Message::anonymous("@ hi");
        store.put_message(&msg).await.unwrap();
        let tyrant = Guest::new("+1", "T").with_role(Role::Tyrant);

        let text = format!("  {} on my way", msg.id.as_str().to_lowercase());
        let reply = try_acknowledge(&store, &tyrant, &text).await.unwrap();
        assert!(reply.unwrap().contains(msg.id.as_str()));
    }

    #[tokio::test]
    async fn test_second_ack_is_no_match_not_error() {
        let store = MemoryStore::new();
        let msg = Message::anonymous("@ hi");
        store.put_message(&msg).await.unwrap();
        let tyrant = Guest::new("+1", "T").with_role(Role::Tyrant);

        assert!(try_acknowledge(&store, &tyrant, msg.id.as_str())
            .await
            .unwrap()
            .is_some());
        assert!(try_acknowledge(&store, &tyrant, msg.id.as_str())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_code_and_short_text_are_no_match() {
        let store = MemoryStore::new();
        let tyrant = Guest::new("+1", "T").with_role(Role::Tyrant);

        assert!(try_acknowledge(&store, &tyrant, "ZZZ")
            .await
            .unwrap()
            .is_none());
        assert!(try_acknowledge(&store, &tyrant, "hm")
            .await
            .unwrap()
            .is_none());
    }
}
