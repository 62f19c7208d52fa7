//! In-memory world implementing the host seams.
//!
//! Good enough to drive the control core end to end: box geometry with
//! terrain, mesh and door surfaces, upright creature bodies, invisible
//! markers and loot piles. Locomotion is a straight walk toward the
//! current target.

use std::collections::HashMap;

use minion_core::host::{
    CreatureState, Creatures, Loot, Physics, PlayerState, RayHit, RayLayers, Surface,
    target_position,
};
use minion_core::inventory::{Item, LootContainer};
use minion_core::{CreatureId, ItemId, LootId, MarkerId, Vec3};
use tracing::trace;

use crate::components::{BODY_HALF_HEIGHT, Block, Body, LootPile, STAND_HEIGHT, body_overlaps_sphere};
use crate::config::WorldConfig;

/// Samples per capsule when testing it as a chain of spheres.
const CAPSULE_SAMPLES: usize = 5;

/// Distance at which a walking creature stops short of its target.
const ARRIVAL_RADIUS: f32 = 1.0;

/// The reference world.
#[derive(Debug)]
pub struct SimWorld {
    blocks: Vec<Block>,
    bodies: Vec<Body>,
    markers: HashMap<MarkerId, Vec3>,
    loot: HashMap<LootId, LootPile>,
    player: PlayerState,
    ambient_volume: f32,
    markers_spawned: u64,
    markers_destroyed: u64,
}

impl SimWorld {
    /// An empty void with the player at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            bodies: Vec::new(),
            markers: HashMap::new(),
            loot: HashMap::new(),
            player: PlayerState {
                position: Vec3::new(0.0, STAND_HEIGHT, 0.0),
                forward: Vec3::Z,
                willpower: 50,
            },
            ambient_volume: 1.0,
            markers_spawned: 0,
            markers_destroyed: 0,
        }
    }

    /// A flat square floor of half-extent `half` with its top at `y = 0`.
    #[must_use]
    pub fn with_floor(half: f32) -> Self {
        let mut world = Self::new();
        world.add_block(Block::new(
            Vec3::new(-half, -1.0, -half),
            Vec3::new(half, 0.0, half),
            Surface::Terrain,
        ));
        world
    }

    /// Apply host settings from `config`.
    pub fn configure(&mut self, config: &WorldConfig) {
        self.ambient_volume = config.ambient_volume;
    }

    /// Add geometry.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// A wall slab across x at `x`, spanning `z` from `-half` to `half`.
    pub fn add_wall_x(&mut self, x: f32, half: f32, surface: Surface) {
        self.add_block(Block::new(
            Vec3::new(x - 0.1, 0.0, -half),
            Vec3::new(x + 0.1, 4.0, half),
            surface,
        ));
    }

    /// Add a creature.
    pub fn spawn(&mut self, state: CreatureState) -> CreatureId {
        let id = CreatureId::new();
        self.bodies.push(Body {
            id,
            state,
            active: true,
        });
        id
    }

    /// Remove a creature entirely.
    pub fn despawn(&mut self, id: CreatureId) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|b| b.id != id);
        self.bodies.len() != before
    }

    /// Hide or show a creature without removing it.
    pub fn set_active(&mut self, id: CreatureId, active: bool) {
        if let Some(body) = self.bodies.iter_mut().find(|b| b.id == id) {
            body.active = active;
        }
    }

    /// Mutable player state.
    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    /// Set the ambient volume.
    pub fn set_ambient_volume(&mut self, volume: f32) {
        self.ambient_volume = volume;
    }

    /// Drop a loot pile.
    pub fn add_loot(&mut self, position: Vec3, player_owned: bool, items: Vec<Item>) -> LootId {
        let id = LootId::new();
        self.loot.insert(
            id,
            LootPile {
                position,
                container: LootContainer {
                    id,
                    player_owned,
                    items,
                },
            },
        );
        id
    }

    /// Markers currently alive.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Markers spawned and destroyed over the world's lifetime.
    #[must_use]
    pub fn marker_totals(&self) -> (u64, u64) {
        (self.markers_spawned, self.markers_destroyed)
    }

    /// Walk every active creature with a target toward it.
    pub fn step_locomotion(&mut self, dt: f32, speed: f32) {
        let goals: Vec<(usize, Vec3)> = self
            .bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.active)
            .filter_map(|(i, b)| {
                let target = b.state.senses.as_ref()?.target?;
                target_position(self, target).map(|goal| (i, goal))
            })
            .collect();

        for (index, goal) in goals {
            let state = &mut self.bodies[index].state;
            let flat = Vec3::new(goal.x - state.position.x, 0.0, goal.z - state.position.z);
            let distance = flat.length();
            if distance <= ARRIVAL_RADIUS {
                continue;
            }
            let step = (speed * dt).min(distance - ARRIVAL_RADIUS);
            let heading = flat / distance;
            state.position += heading * step;
            state.forward = heading;
            if let Some(motor) = state.motor.as_mut() {
                motor.give_up_timer = (motor.give_up_timer - dt).max(0.0);
            }
        }
    }

    fn body(&self, id: CreatureId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    fn occupied(&self, center: Vec3, radius: f32) -> bool {
        self.blocks.iter().any(|b| b.overlaps_sphere(center, radius))
            || self
                .bodies
                .iter()
                .filter(|b| b.active)
                .any(|b| b.overlaps_sphere(center, radius))
            || body_overlaps_sphere(self.player.position, center, radius)
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Physics for SimWorld {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: RayLayers,
    ) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        self.blocks
            .iter()
            .filter(|b| layers == RayLayers::All || b.surface != Surface::Other)
            .filter_map(|b| {
                b.ray_entry(origin, direction, max_distance)
                    .map(|t| (t, b.surface))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, surface)| RayHit {
                point: origin + direction * distance,
                distance,
                surface,
            })
    }

    fn capsule_blocked(&self, top: Vec3, bottom: Vec3, radius: f32) -> bool {
        (0..CAPSULE_SAMPLES).any(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / (CAPSULE_SAMPLES - 1) as f32;
            self.occupied(bottom.lerp(top, t), radius)
        })
    }

    fn sphere_blocked(&self, center: Vec3, radius: f32) -> bool {
        self.occupied(center, radius)
    }
}

impl Creatures for SimWorld {
    fn creatures(&self) -> Vec<CreatureId> {
        self.bodies.iter().filter(|b| b.active).map(|b| b.id).collect()
    }

    fn creatures_near(&self, center: Vec3, radius: f32) -> Vec<CreatureId> {
        self.bodies
            .iter()
            .filter(|b| b.active && b.state.position.distance(center) <= radius)
            .map(|b| b.id)
            .collect()
    }

    fn is_active(&self, id: CreatureId) -> bool {
        self.body(id).is_some_and(|b| b.active)
    }

    fn creature(&self, id: CreatureId) -> Option<&CreatureState> {
        self.body(id).map(|b| &b.state)
    }

    fn creature_mut(&mut self, id: CreatureId) -> Option<&mut CreatureState> {
        self.bodies
            .iter_mut()
            .find(|b| b.id == id)
            .map(|b| &mut b.state)
    }

    fn teleport(&mut self, id: CreatureId, position: Vec3, forward: Vec3) {
        let floor = self
            .raycast(position, Vec3::NEG_Y, 4.0 + BODY_HALF_HEIGHT, RayLayers::All)
            .map(|hit| hit.point.y + STAND_HEIGHT);
        if let Some(state) = self.creature_mut(id) {
            state.position = Vec3::new(position.x, floor.unwrap_or(position.y), position.z);
            state.forward = forward;
            trace!(creature = %id, ?position, "teleported");
        }
    }

    fn player(&self) -> PlayerState {
        self.player
    }

    fn spawn_marker(&mut self, position: Vec3) -> MarkerId {
        let id = MarkerId::new();
        self.markers.insert(id, position);
        self.markers_spawned += 1;
        id
    }

    fn move_marker(&mut self, id: MarkerId, position: Vec3) -> bool {
        match self.markers.get_mut(&id) {
            Some(at) => {
                *at = position;
                true
            }
            None => false,
        }
    }

    fn marker_position(&self, id: MarkerId) -> Option<Vec3> {
        self.markers.get(&id).copied()
    }

    fn destroy_marker(&mut self, id: MarkerId) -> bool {
        let removed = self.markers.remove(&id).is_some();
        if removed {
            self.markers_destroyed += 1;
        }
        removed
    }

    fn ambient_volume(&self) -> f32 {
        self.ambient_volume
    }
}

impl Loot for SimWorld {
    fn loot_near(&self, center: Vec3, radius: f32) -> Vec<LootId> {
        self.loot
            .values()
            .filter(|pile| pile.position.distance(center) <= radius)
            .map(|pile| pile.container.id)
            .collect()
    }

    fn container(&self, id: LootId) -> Option<&LootContainer> {
        self.loot.get(&id).map(|pile| &pile.container)
    }

    fn take_item(&mut self, id: LootId, item: ItemId) -> Option<Item> {
        let items = &mut self.loot.get_mut(&id)?.container.items;
        let index = items.iter().position(|i| i.id == item)?;
        Some(items.remove(index))
    }

    fn remove_container(&mut self, id: LootId) {
        self.loot.remove(&id);
    }
}
