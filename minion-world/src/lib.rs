//! # minion-world: Reference Host for minion-core
//!
//! This crate provides an in-memory world that implements the host seams of
//! `minion-core`, plus the glue a real game would write: hooks for game
//! events, a per-frame system and HUD rendering.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Host game loop              │
//! │  ┌───────────────────────────────────┐  │
//! │  │          minion-world             │  │
//! │  │  ┌─────────────┐ ┌─────────────┐  │  │
//! │  │  │    Hooks    │ │   Systems   │  │  │
//! │  │  └──────┬──────┘ └──────┬──────┘  │  │
//! │  │         │               │         │  │
//! │  │         ▼               ▼         │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │      minion-core        │    │  │
//! │  │    └────────────┬────────────┘    │  │
//! │  │                 ▼                 │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │   SimWorld (World impl) │    │  │
//! │  │    └─────────────────────────┘    │  │
//! │  └───────────────────────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components`: box geometry, creature bodies, loot piles
//! - `sim`: `SimWorld`, the `World` implementation
//! - `bridge`: host mobile ids and spawn descriptions to core types
//! - `config`: `WorldConfig` and audio profiles
//! - `events`: HUD text for notifications
//! - `hooks`: entry points for game events
//! - `systems`: the per-frame `MinionSystem`
//! - `telemetry`: tracing subscriber setup

pub mod bridge;
pub mod components;
pub mod config;
pub mod events;
pub mod hooks;
pub mod sim;
pub mod systems;
pub mod telemetry;

pub use config::WorldConfig;
pub use sim::SimWorld;
pub use systems::MinionSystem;
