//! # Minion Core Library
//!
//! Host-agnostic control layer for player-directed companion creatures.
//!
//! Every minion gets a [`MinionRecord`] held by a [`MinionRegistry`]. Each
//! simulation tick the registry:
//!
//! - **Resumes** due cooperative tasks (push clears, reposition steps)
//! - **Sweeps loyalty** (excess-capacity strain, recovery or renegade rolls)
//! - **Guides** each surviving minion (follow policy, push hold, equipment,
//!   quest-target unlocks, audio)
//! - **Regenerates** health, magic and stamina on a slow timer
//!
//! The host world is reached only through the [`World`] trait family, so
//! the same core runs against a game engine or the in-memory reference host.
//!
//! ## Performance Contract
//!
//! Designed for real-time use on the simulation thread:
//! - `guide_all` over 20 minions: well under one frame
//! - No allocation on the follow path beyond host queries
//! - No locks; counters are relaxed atomics

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod controller;
pub mod equipment;
pub mod error;
pub mod events;
pub mod host;
pub mod inventory;
pub mod loyalty;
pub mod metrics;
pub mod oracle;
pub mod registry;
pub mod scheduler;
pub mod tag;
pub mod types;

pub use config::MinionConfig;
pub use controller::{MinionRecord, ProxyTarget};
pub use error::MinionError;
pub use events::MinionEvent;
pub use host::World;
pub use registry::MinionRegistry;
pub use types::*;
