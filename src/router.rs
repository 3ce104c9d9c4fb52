//! Inbound command routing
//!
//! Classifies one inbound (sender, text) pair into an action and produces
//! the reply text. Dispatch is a one-character lexer on the leading sigil:
//! any text is always classifiable, and unparseable input degrades to the
//! fallback path instead of an error. The first message from an unseen
//! number is always a registration, never a command.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::ack;
use crate::dispatch::NotificationDispatcher;
use crate::guest::Guest;
use crate::message::Message;
use crate::store::RecordStore;
use crate::Result;

/// Short command list, appended to the fallback reply
pub const HELP_SHORT: &str = "Request a Checkin with\n\"! some optional message\"\n\nAnonymous Message with\n\"@ some message\"\n\nChange your name with\n\"$ your name\"\n\nAndon Help with\n\"?\"";

/// Long usage text, sent on registration and on `?`
pub const HELP_LONG: &str = "You can send me \"!\" at any point and I'll let the hosts know to check in with you; if you include a message, I'll pass it along too.\n\nYou can also send me \"@\" with a message and I'll pass the message along anonymously.\n\nIf you want to change your name, send me \"$\" with the name that you want.\n\n";

/// Fixed reply for a store failure inside a command branch
pub const RETRY_REPLY: &str = "Something went wrong, please wait a moment and try again.";

/// Fixed reply when the top-level flow fails unexpectedly
pub const APOLOGY_REPLY: &str =
    "Oh no, something went wrong, please wait a moment and try again.";

/// Routes inbound texts to commands and produces replies
pub struct CommandRouter {
    store: Arc<dyn RecordStore>,
    dispatcher: NotificationDispatcher,
}

impl CommandRouter {
    pub fn new(store: Arc<dyn RecordStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Handle one inbound message and always produce a reply
    ///
    /// This is the infallible entry point for the inbound transport: any
    /// error escaping the routing flow is logged and mapped to a fixed
    /// apology, never surfaced as a hard failure for the sender.
    pub async fn handle(&self, from: &str, body: &str) -> String {
        match self.route(from, body).await {
            Ok(reply) => reply,
            Err(error) => {
                error!(%from, %error, "inbound routing failed");
                APOLOGY_REPLY.to_string()
            }
        }
    }

    /// Route one inbound message
    async fn route(&self, from: &str, body: &str) -> Result<String> {
        let Some(guest) = self.store.get_guest(from).await? else {
            return Ok(self.register(from, body).await);
        };

        let trimmed = body.trim();
        match trimmed.chars().next() {
            Some('$') => Ok(self.rename(guest, trimmed).await),
            Some('?') => Ok(help_reply(&guest)),
            Some('@') => Ok(self.relay_anonymous(body).await),
            Some('!') => Ok(self.checkin(&guest, body).await),
            _ => self.fallback(&guest, trimmed).await,
        }
    }

    /// First contact: the whole text is the desired display name
    async fn register(&self, from: &str, body: &str) -> String {
        let guest = Guest::new(from, body.trim());
        match self.store.put_guest(&guest).await {
            Ok(()) => {
                info!(sms = %from, name = %guest.name, "guest registered");
                format!("Hi {}. You're all set.\n\n{}", guest.name, HELP_LONG)
            }
            Err(error) => {
                error!(sms = %from, %error, "guest registration failed");
                RETRY_REPLY.to_string()
            }
        }
    }

    /// `$ new name` — everything after the first `$`, trimmed
    async fn rename(&self, mut guest: Guest, trimmed: &str) -> String {
        let new_name = trimmed
            .splitn(2, '$')
            .nth(1)
            .unwrap_or_default()
            .trim()
            .to_string();
        guest.name = new_name;
        match self.store.put_guest(&guest).await {
            Ok(()) => format!("Got it, I'll call you {} from now on.", guest.name),
            Err(error) => {
                error!(sms = %guest.sms_number, %error, "rename failed");
                RETRY_REPLY.to_string()
            }
        }
    }

    /// `@ message` — store an anonymous note, no sender linkage
    async fn relay_anonymous(&self, body: &str) -> String {
        let message = Message::anonymous(body);
        match self.store.put_message(&message).await {
            Ok(()) => {
                self.notify(&message).await;
                "Got it, passing that along now anonymously.".to_string()
            }
            Err(error) => {
                error!(%error, "anonymous message store failed");
                RETRY_REPLY.to_string()
            }
        }
    }

    /// `! message` — store a check-in request linked to the sender
    async fn checkin(&self, guest: &Guest, body: &str) -> String {
        let message = Message::checkin(guest, body);
        match self.store.put_message(&message).await {
            Ok(()) => {
                self.notify(&message).await;
                "Got it, sending the request.".to_string()
            }
            Err(error) => {
                error!(sms = %guest.sms_number, %error, "check-in store failed");
                RETRY_REPLY.to_string()
            }
        }
    }

    /// Exactly one dispatch attempt per created message; best-effort
    async fn notify(&self, message: &Message) {
        if let Err(error) = self.dispatcher.dispatch(message).await {
            warn!(code = %message.id, %error, "notification dispatch failed");
        }
    }

    /// Unrecognized text: maybe an acknowledgment code, otherwise help
    async fn fallback(&self, guest: &Guest, trimmed: &str) -> Result<String> {
        if let Some(reply) = ack::try_acknowledge(self.store.as_ref(), guest, trimmed).await? {
            return Ok(reply);
        }
        Ok(fallback_reply(guest))
    }
}

fn help_reply(guest: &Guest) -> String {
    format!("Hi {}, hopefully this helps you.\n\n{}", guest.name, HELP_LONG)
}

fn fallback_reply(guest: &Guest) -> String {
    format!("Hi {}! How can I help you?\n\n{}", guest.name, HELP_SHORT)
}
