//! The seams to the host world.
//!
//! The controller never owns a creature. It reads and writes the small set
//! of AI handles below, and asks the host for physics, markers and loot.
//! Anything missing on the host side (a creature without a motor, a marker
//! that was already cleaned up) is treated as "not applicable" by callers.

use crate::inventory::{Inventory, Item, LootContainer};
use crate::types::{
    Archetype, CreatureId, ItemId, LootId, MarkerId, Resources, TargetRef, Team, Vec3,
};

// ---------------------------------------------------------------------------
// Creature handles
// ---------------------------------------------------------------------------

/// Autonomous perception state of a creature.
#[derive(Debug, Clone, PartialEq)]
pub struct Senses {
    /// Independent sensing enabled. When disabled the creature keeps its
    /// current target and does not pick new ones.
    pub enabled: bool,
    /// Primary target.
    pub target: Option<TargetRef>,
    /// Secondary target.
    pub secondary_target: Option<TargetRef>,
    /// Whether the primary target is currently in line of sight.
    pub target_in_sight: bool,
    /// Forces the current target to count as perceived, even if the
    /// perception gate would reject it (used for the invisible proxy).
    pub target_detected: bool,
    /// Makes other AI treat this creature as a normal combatant.
    pub draws_aggression: bool,
    /// Previous last-known target position.
    pub old_last_known_target_pos: Option<Vec3>,
    /// Last-known target position.
    pub last_known_target_pos: Option<Vec3>,
    /// Predicted target position.
    pub predicted_target_pos: Option<Vec3>,
    /// Sight range.
    pub sight_radius: f32,
    /// Hearing range.
    pub hearing_radius: f32,
}

impl Default for Senses {
    fn default() -> Self {
        Self {
            enabled: true,
            target: None,
            secondary_target: None,
            target_in_sight: false,
            target_detected: false,
            draws_aggression: true,
            old_last_known_target_pos: None,
            last_known_target_pos: None,
            predicted_target_pos: None,
            sight_radius: 50.0,
            hearing_radius: 25.0,
        }
    }
}

impl Senses {
    /// Forget every target and last-known position.
    pub fn clear_targets(&mut self) {
        self.target = None;
        self.secondary_target = None;
        self.old_last_known_target_pos = None;
        self.last_known_target_pos = None;
        self.predicted_target_pos = None;
    }
}

/// Locomotion state of a creature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motor {
    /// Whether the creature is aggressive.
    pub is_hostile: bool,
    /// Remaining patience before the AI abandons an unreachable target.
    pub give_up_timer: f32,
}

impl Default for Motor {
    fn default() -> Self {
        Self {
            is_hostile: true,
            give_up_timer: 0.0,
        }
    }
}

/// Audio output setting of a creature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioOutput {
    /// Silenced.
    Muted,
    /// Playing at the given absolute volume.
    Volume(f32),
}

/// Scripted quest flags on a creature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestTarget {
    /// Whether AI creatures may attack it.
    pub attackable_by_ai: bool,
}

/// Everything the core reads or writes on a creature.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureState {
    /// Localized creature name, used in notifications and tags.
    pub name: String,
    /// Free-form display tag; the persistence boundary.
    pub tag: String,
    /// World position (feet).
    pub position: Vec3,
    /// Facing direction.
    pub forward: Vec3,
    /// Loyalty flag.
    pub team: Team,
    /// Archetype.
    pub archetype: Archetype,
    /// Health / magic / stamina.
    pub resources: Resources,
    /// Perception; absent on creatures without an AI.
    pub senses: Option<Senses>,
    /// Locomotion; absent on creatures without an AI.
    pub motor: Option<Motor>,
    /// Carried and equipped items.
    pub inventory: Inventory,
    /// Audio output.
    pub audio: AudioOutput,
    /// Quest flags, if this is a scripted target.
    pub quest: Option<QuestTarget>,
}

impl CreatureState {
    /// A creature with default AI handles and no items.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Vec3, team: Team, archetype: Archetype) -> Self {
        Self {
            name: name.into(),
            tag: String::new(),
            position,
            forward: Vec3::Z,
            team,
            archetype,
            resources: Resources::full(20, 10, 10),
            senses: Some(Senses::default()),
            motor: Some(Motor::default()),
            inventory: Inventory::new(),
            audio: AudioOutput::Volume(1.0),
            quest: None,
        }
    }

    /// Whether the loyalty flag is player-ally.
    #[must_use]
    pub fn is_ally(&self) -> bool {
        self.team == Team::PlayerAlly
    }

    /// Whether the motor (if any) reports the creature as hostile.
    /// Creatures without a motor count as hostile.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        self.motor.is_none_or(|m| m.is_hostile)
    }
}

/// Read-only view of the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// World position (feet).
    pub position: Vec3,
    /// Facing direction.
    pub forward: Vec3,
    /// The stat used for capacity and loyalty math.
    pub willpower: i32,
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

/// Which colliders a ray considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayLayers {
    /// Level geometry only (terrain, static meshes, doors).
    Terrain,
    /// Everything, creatures included.
    All,
}

/// What a ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Terrain heightfield.
    Terrain,
    /// Static level mesh.
    Mesh,
    /// A passable barrier (door).
    Door,
    /// Anything else (creatures, props).
    Other,
}

impl Surface {
    /// Solid static geometry a push cannot go through.
    #[must_use]
    pub fn is_solid_static(self) -> bool {
        matches!(self, Self::Terrain | Self::Mesh)
    }
}

/// Result of a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit point.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Kind of collider hit.
    pub surface: Surface,
}

/// Physics / geometry query service.
pub trait Physics {
    /// First hit along `direction` (unit length) within `max_distance`.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: RayLayers,
    ) -> Option<RayHit>;

    /// Whether a capsule between `top` and `bottom` with `radius` overlaps
    /// any collider.
    fn capsule_blocked(&self, top: Vec3, bottom: Vec3, radius: f32) -> bool;

    /// Whether a sphere overlaps any collider.
    fn sphere_blocked(&self, center: Vec3, radius: f32) -> bool;
}

// ---------------------------------------------------------------------------
// Creatures, markers, loot
// ---------------------------------------------------------------------------

/// Creature simulation service.
pub trait Creatures {
    /// Every creature in the current area.
    fn creatures(&self) -> Vec<CreatureId>;

    /// Creatures whose position lies within `radius` of `center`.
    fn creatures_near(&self, center: Vec3, radius: f32) -> Vec<CreatureId>;

    /// Whether the creature still exists and is active.
    fn is_active(&self, id: CreatureId) -> bool;

    /// Creature state.
    fn creature(&self, id: CreatureId) -> Option<&CreatureState>;

    /// Mutable creature state.
    fn creature_mut(&mut self, id: CreatureId) -> Option<&mut CreatureState>;

    /// Relocate a creature, facing `forward`, snapped to the ground below.
    fn teleport(&mut self, id: CreatureId, position: Vec3, forward: Vec3);

    /// The player.
    fn player(&self) -> PlayerState;

    /// Spawn an invisible, inert marker entity.
    fn spawn_marker(&mut self, position: Vec3) -> MarkerId;

    /// Move a marker. Returns `false` if it no longer exists.
    fn move_marker(&mut self, id: MarkerId, position: Vec3) -> bool;

    /// Marker position.
    fn marker_position(&self, id: MarkerId) -> Option<Vec3>;

    /// Destroy a marker. Returns `false` if it did not exist.
    fn destroy_marker(&mut self, id: MarkerId) -> bool;

    /// Global ambient sound volume.
    fn ambient_volume(&self) -> f32;
}

/// Loot container service.
pub trait Loot {
    /// Containers within `radius` of `center`.
    fn loot_near(&self, center: Vec3, radius: f32) -> Vec<LootId>;

    /// Container contents.
    fn container(&self, id: LootId) -> Option<&LootContainer>;

    /// Remove an item from a container and hand it over.
    fn take_item(&mut self, id: LootId, item: ItemId) -> Option<Item>;

    /// Remove a container from the world.
    fn remove_container(&mut self, id: LootId);
}

/// Everything the core needs from the host.
pub trait World: Creatures + Physics + Loot {}

impl<T: Creatures + Physics + Loot> World for T {}

/// Position of a target, if it still exists.
#[must_use]
pub fn target_position<W: Creatures + ?Sized>(world: &W, target: TargetRef) -> Option<Vec3> {
    match target {
        TargetRef::Player => Some(world.player().position),
        TargetRef::Creature(id) => world.creature(id).map(|c| c.position),
        TargetRef::Marker(id) => world.marker_position(id),
    }
}
