//! Integration hooks for the host's existing systems.
//!
//! Each function is the single call a host makes from the matching game
//! event: area load, a creature becoming an ally, the player activating a
//! creature, a long rest and a fast travel.

use minion_core::error::Result;
use minion_core::{CreatureId, InteractionMode, MinionRegistry, Mode, SimTime, World};
use tracing::info;

/// Area or save loaded: rebuild the registry from creature tags.
pub fn on_world_load<W: World + ?Sized>(registry: &mut MinionRegistry, world: &mut W, now: SimTime) {
    registry.initialize(world, now);
}

/// A creature was just turned into a player ally (e.g. by a spell).
///
/// # Errors
/// Propagates `add_new` errors: unknown creature, or not an ally.
pub fn on_creature_allied<W: World + ?Sized>(
    registry: &mut MinionRegistry,
    world: &mut W,
    creature: CreatureId,
    now: SimTime,
) -> Result<Mode> {
    registry.add_new(world, creature, now)
}

/// The player activated a creature. Returns whether minion control
/// consumed the activation; `false` means the host should handle it.
pub fn on_activate<W: World + ?Sized>(
    registry: &mut MinionRegistry,
    world: &mut W,
    creature: CreatureId,
    mode: InteractionMode,
    now: SimTime,
) -> bool {
    if !registry.contains(creature) {
        return false;
    }
    registry.activate(world, creature, mode, now).unwrap_or(false)
}

/// The player finished a long rest: heal minions and gather followers.
pub fn on_long_rest<W: World + ?Sized>(registry: &mut MinionRegistry, world: &mut W) {
    registry.rest(world);
    registry.reposition_all();
    info!(minions = registry.len(), "minions rested");
}

/// The player fast-travelled: gather followers at the destination.
pub fn on_fast_travel(registry: &mut MinionRegistry) {
    registry.reposition_all();
}

/// The area is about to unload: release every proxy marker.
pub fn on_world_unload<W: World + ?Sized>(registry: &mut MinionRegistry, world: &mut W) {
    registry.clear(world);
}
