//! Stored messages and acknowledgment codes
//!
//! A message is either a check-in request (carries the originating guest's
//! identity) or an anonymous note (carries none). Its key is a short
//! human-speakable code that tyrants reply with to acknowledge it.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::guest::Guest;

/// Code alphabet: 32 symbols, visually ambiguous glyphs excluded
/// (no I/O to avoid 1/I and 0/O confusion when read aloud or typed).
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Code length in symbols
pub const CODE_LEN: usize = 3;

/// Short message identifier, the acknowledgment code
///
/// Three symbols drawn from [`CODE_ALPHABET`]. Generation samples
/// independently with replacement and performs no uniqueness check against
/// stored messages; the code space is small by design (spoken over SMS) and
/// the accepted collision rate at event scale is negligible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh random code
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code: String = (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Create from an existing string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Extract a candidate code from free-form reply text: the first
    /// [`CODE_LEN`] characters of the trimmed text, uppercased. Returns
    /// `None` when the text is too short to hold a code.
    pub fn candidate_from_text(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.chars().count() < CODE_LEN {
            return None;
        }
        let code: String = trimmed.chars().take(CODE_LEN).collect();
        Some(Self(code.to_uppercase()))
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of message this is, and who (if anyone) sent it
///
/// Anonymity is structural: the `Anonymous` variant has no identity fields,
/// so the originating number can never be persisted for an anonymous note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum MessageKind {
    /// A check-in request, linked to the guest who sent it
    Checkin {
        /// Originating guest's phone number
        sms_number: String,
        /// Originating guest's display name at send time
        guest_name: String,
    },

    /// An anonymous note, no linkage to the sender
    Anonymous,
}

/// Open/acknowledged lifecycle
///
/// The only legal transition is `Open -> Acknowledged`, exactly once,
/// enforced by the store's conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageStatus {
    Open,
    Acknowledged,
}

/// A stored request or anonymous note
///
/// Never deleted; acknowledged messages remain as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Acknowledgment code, the storage key
    pub id: MessageId,

    /// Kind and (for check-ins) originating identity
    pub kind: MessageKind,

    /// Full raw inbound text, sigil included
    pub body: String,

    /// Lifecycle status, initially [`MessageStatus::Open`]
    pub status: MessageStatus,

    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a check-in request linked to the sending guest
    pub fn checkin(guest: &Guest, body: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            kind: MessageKind::Checkin {
                sms_number: guest.sms_number.clone(),
                guest_name: guest.name.clone(),
            },
            body: body.into(),
            status: MessageStatus::Open,
            created_at: Utc::now(),
        }
    }

    /// Create an anonymous note; no sender identity is taken or stored
    pub fn anonymous(body: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            kind: MessageKind::Anonymous,
            body: body.into(),
            status: MessageStatus::Open,
            created_at: Utc::now(),
        }
    }

    /// Label used when presenting the sender to notification recipients
    pub fn sender_label(&self) -> String {
        match &self.kind {
            MessageKind::Checkin { guest_name, .. } => format!("From {}", guest_name),
            MessageKind::Anonymous => "Anonymous Message".to_string(),
        }
    }
}
