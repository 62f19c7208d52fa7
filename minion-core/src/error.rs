//! Error types for the minion control core.
//!
//! The per-tick control loop has no fault paths; these cover configuration
//! loading and host entry points that look creatures up by id.

use thiserror::Error;

/// Top-level error type for fallible minion operations.
#[derive(Error, Debug)]
pub enum MinionError {
    /// The creature is not known to the host.
    #[error("Creature not found: {0}")]
    CreatureNotFound(crate::CreatureId),

    /// The creature exists but is not under minion control.
    #[error("Creature is not a minion: {0}")]
    NotAMinion(crate::CreatureId),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, MinionError>;
