//! In-process record store backend
//!
//! Backs the [`RecordStore`] trait with hash maps behind a single mutex.
//! Used by the test suite and as a demo backend; the mutex is never held
//! across an await point, and the acknowledgment compare-and-set is atomic
//! under it.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::guest::{Guest, Role};
use crate::message::{Message, MessageId, MessageStatus};
use crate::store::{CasOutcome, RecordStore, Result, StoreError};

#[derive(Default)]
struct Tables {
    guests: HashMap<String, Guest>,
    messages: HashMap<MessageId, Message>,
}

/// In-memory [`RecordStore`] implementation
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::result::Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_guest(&self, sms_number: &str) -> Result<Option<Guest>> {
        Ok(self.lock()?.guests.get(sms_number).cloned())
    }

    async fn put_guest(&self, guest: &Guest) -> Result<()> {
        self.lock()?
            .guests
            .insert(guest.sms_number.clone(), guest.clone());
        Ok(())
    }

    async fn put_message(&self, message: &Message) -> Result<()> {
        self.lock()?
            .messages
            .insert(message.id.clone(), message.clone());
        Ok(())
    }

    async fn get_message(&self, id: &MessageId) -> Result<Option<Message>> {
        Ok(self.lock()?.messages.get(id).cloned())
    }

    async fn acknowledge_open(&self, id: &MessageId) -> Result<CasOutcome> {
        let mut tables = self.lock()?;
        match tables.messages.get_mut(id) {
            Some(message) if message.status == MessageStatus::Open => {
                message.status = MessageStatus::Acknowledged;
                Ok(CasOutcome::Applied)
            }
            _ => Ok(CasOutcome::ConditionFailed),
        }
    }

    async fn guests_with_role(&self, role: Role) -> Result<Vec<Guest>> {
        Ok(self
            .lock()?
            .guests
            .values()
            .filter(|g| g.role == role)
            .cloned()
            .collect())
    }

    async fn open_messages_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Message>> {
        Ok(self
            .lock()?
            .messages
            .values()
            .filter(|m| m.status == MessageStatus::Open && m.created_at < cutoff)
            .cloned()
            .collect())
    }
}
