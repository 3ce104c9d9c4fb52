//! Runtime configuration
//!
//! Plain struct with defaults and builder-style setters; loading values from
//! the environment is left to the embedding process.

use std::time::Duration;

/// Default escalation deadline: an open request older than this is overdue
pub const DEFAULT_ESCALATION_DEADLINE: Duration = Duration::from_secs(120);

/// Andon configuration
#[derive(Debug, Clone)]
pub struct AndonConfig {
    /// How long a message may stay open before the sweep alerts captains
    pub escalation_deadline: Duration,
}

impl Default for AndonConfig {
    fn default() -> Self {
        Self {
            escalation_deadline: DEFAULT_ESCALATION_DEADLINE,
        }
    }
}

impl AndonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the escalation deadline
    pub fn with_escalation_deadline(mut self, deadline: Duration) -> Self {
        self.escalation_deadline = deadline;
        self
    }
}
