//! Core type definitions for the minion control system.
//!
//! Identity handles for host-owned objects, simulation time, and the small
//! enums that the state machine branches on.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use glam::Vec3;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Handle to a creature simulated by the host. Never owned by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(pub Uuid);

impl CreatureId {
    /// Create a new random creature ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CreatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to an invisible marker entity in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub Uuid);

impl MarkerId {
    /// Create a new random marker ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Create a new random item ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a loot container lying in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LootId(pub Uuid);

impl LootId {
    /// Create a new random loot container ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LootId {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Monotonic simulation time in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SimTime(pub f32);

impl SimTime {
    /// Time zero (world load).
    pub const ZERO: Self = Self(0.0);

    /// Seconds elapsed since `earlier`. Negative if `earlier` lies in the future.
    #[must_use]
    pub fn since(self, earlier: Self) -> f32 {
        self.0 - earlier.0
    }

    /// This time shifted forward by `seconds`.
    #[must_use]
    pub fn after(self, seconds: f32) -> Self {
        Self(self.0 + seconds)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s", self.0)
    }
}

/// Time and frame counter of the tick being processed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickClock {
    /// Current simulation time.
    pub now: SimTime,
    /// Number of frames simulated since world load.
    pub frame: u64,
}

impl TickClock {
    /// Create a clock reading.
    #[must_use]
    pub fn new(now: SimTime, frame: u64) -> Self {
        Self { now, frame }
    }
}

// ---------------------------------------------------------------------------
// Allegiance & control
// ---------------------------------------------------------------------------

/// Team / alliance flag of a creature. `PlayerAlly` is the sole source of
/// truth for whether a minion record may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Fights on the player's side.
    PlayerAlly,
    /// Hostile toward the player.
    Hostile,
    /// Neither.
    Neutral,
}

/// Movement mode of a minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Holds position.
    Staying,
    /// Actively pursues the player.
    Following,
}

impl Mode {
    /// Whether this is [`Mode::Following`].
    #[must_use]
    pub fn is_following(self) -> bool {
        matches!(self, Self::Following)
    }
}

/// Creature archetype as far as equipment decisions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Shield-bearing skeletal warrior.
    SkeletalWarrior,
    /// Lich.
    Lich,
    /// Ancient lich.
    AncientLich,
    /// Any other host archetype, by host id.
    Other(u16),
}

impl Archetype {
    /// Lich and ancient lich share their equipment preferences.
    #[must_use]
    pub fn is_lich(self) -> bool {
        matches!(self, Self::Lich | Self::AncientLich)
    }
}

/// Interaction mode the player used when activating a minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Talk / converse: toggles follow and stay.
    Converse,
    /// Grab: shoves the minion aside.
    Grab,
    /// Any other activation mode; never consumed here.
    Other,
}

/// Something an autonomous AI can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRef {
    /// The player character.
    Player,
    /// Another creature.
    Creature(CreatureId),
    /// An invisible marker entity.
    Marker(MarkerId),
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Current and maximum pools of a creature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Current health.
    pub health: i32,
    /// Maximum health.
    pub max_health: i32,
    /// Current magic.
    pub magicka: i32,
    /// Maximum magic.
    pub max_magicka: i32,
    /// Current stamina.
    pub stamina: i32,
    /// Maximum stamina.
    pub max_stamina: i32,
}

impl Resources {
    /// Full pools with the given maxima.
    #[must_use]
    pub fn full(max_health: i32, max_magicka: i32, max_stamina: i32) -> Self {
        Self {
            health: max_health,
            max_health,
            magicka: max_magicka,
            max_magicka,
            stamina: max_stamina,
            max_stamina,
        }
    }

    /// Restore every pool to its maximum.
    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.magicka = self.max_magicka;
        self.stamina = self.max_stamina;
    }

    /// Add `amount` to every pool, capped at the maxima.
    pub fn regenerate(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
        self.magicka = (self.magicka + amount).min(self.max_magicka);
        self.stamina = (self.stamina + amount).min(self.max_stamina);
    }
}
