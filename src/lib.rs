//! Andon - SMS coordination core for event staff
//!
//! Guests text single-character commands: `!` requests a check-in, `@` sends
//! an anonymous note, `$` renames the sender, `?` asks for help. Tyrant-role
//! guests are notified of every new request and acknowledge one by replying
//! with its 3-character code; captain-role guests are alerted when a request
//! stays unacknowledged past the deadline.
//!
//! The inbound webhook, the SMS provider, and the durable store are external
//! collaborators: embedders implement [`store::RecordStore`] and
//! [`gateway::SmsGateway`], feed inbound texts to [`router::CommandRouter::handle`],
//! and drive [`escalate::EscalationMonitor::sweep`] from a timer.
//!
//! # Architecture
//!
//! - **guest** / **message**: records and the acknowledgment-code type
//! - **store**: record store contract (get / put / compare-and-set / query)
//! - **memory**: in-process store backend for tests and demos
//! - **gateway**: outbound SMS contract + recording backend
//! - **router**: leading-sigil command interpretation, reply copy
//! - **ack**: acknowledgment-code matching over the store's CAS
//! - **dispatch**: new-request fan-out to tyrants
//! - **escalate**: deadline sweep alerting captains

pub mod ack;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod escalate;
pub mod gateway;
pub mod guest;
pub mod logging;
pub mod memory;
pub mod message;
pub mod router;
pub mod store;

// Re-exports
pub use config::AndonConfig;
pub use dispatch::NotificationDispatcher;
pub use error::{AndonError, Result};
pub use escalate::EscalationMonitor;
pub use gateway::SmsGateway;
pub use guest::{Guest, Role};
pub use memory::MemoryStore;
pub use message::{Message, MessageId, MessageKind, MessageStatus};
pub use router::CommandRouter;
pub use store::{CasOutcome, RecordStore};
