//! Error types for andon
//!
//! Boundary errors (store, gateway) are defined next to their traits; this
//! module folds them into one crate-level enum with a `Result` alias.
//! Uses thiserror for ergonomic error handling.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::store::StoreError;

/// Result type alias for andon operations
pub type Result<T> = std::result::Result<T, AndonError>;

/// Crate-level error type
#[derive(Error, Debug)]
pub enum AndonError {
    /// Record store failures
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Outbound SMS delivery failures
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}
