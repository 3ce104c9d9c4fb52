//! Guest records and roles
//!
//! A guest is identified by phone number and carries a role that determines
//! privileges. Roles are provisioned out-of-band; guest-initiated commands
//! can only change the display name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Privilege level for a guest
///
/// - `Guest`: can check in, send anonymous notes, rename themselves.
/// - `Tyrant`: additionally receives new-request notifications and may
///   acknowledge them by replying with the request's code.
/// - `Captain`: receives escalation alerts for requests that stay
///   unacknowledged past the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Guest,
    Captain,
    Tyrant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "GUEST",
            Role::Captain => "CAPTAIN",
            Role::Tyrant => "TYRANT",
        }
    }

    /// May this role acknowledge open messages?
    pub fn can_acknowledge(&self) -> bool {
        matches!(self, Role::Tyrant)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Guest
    }
}

/// A phone-number-identified participant
///
/// Exactly one record exists per phone number; the number is the storage key
/// and is used verbatim (E.164-ish, no normalization beyond what the inbound
/// transport provides).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    /// Phone number, unique key
    pub sms_number: String,

    /// Display name, set at registration and mutable via the rename command
    pub name: String,

    /// Privilege level, never mutated by guest commands
    #[serde(default)]
    pub role: Role,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl Guest {
    /// Create a new guest with the default role
    pub fn new(sms_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sms_number: sms_number.into(),
            name: name.into(),
            role: Role::Guest,
            created_at: Utc::now(),
        }
    }

    /// Set the role (out-of-band provisioning, not reachable from commands)
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
