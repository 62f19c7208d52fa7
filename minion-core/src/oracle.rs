//! Path visibility oracle: thin line-of-sight and free-space queries over
//! the host physics service.
//!
//! This is not a pathfinder: "has path" means a straight, unobstructed line
//! through level geometry, optionally looking through doors.

use crate::host::{Physics, RayLayers, Surface};
use crate::types::Vec3;

/// Height of a creature's eyes above its feet.
pub const EYE_HEIGHT: f32 = 0.7;

/// Half-height of the capsule used for free-space checks.
const CAPSULE_HALF_HEIGHT: f32 = 0.4;

/// Radius of the capsule used for free-space checks.
const CAPSULE_RADIUS: f32 = 0.4;

/// How far below a candidate point the floor may be.
const FLOOR_PROBE: f32 = 4.0;

/// Line-of-sight and placement queries.
#[derive(Debug, Clone, Copy)]
pub struct PathOracle<'a, P: Physics + ?Sized> {
    physics: &'a P,
}

impl<'a, P: Physics + ?Sized> PathOracle<'a, P> {
    /// Wrap a physics service.
    #[must_use]
    pub fn new(physics: &'a P) -> Self {
        Self { physics }
    }

    /// Whether the straight line from `from` to `to` is free of level
    /// geometry. With `ignore_doors`, a door as the first obstruction does
    /// not block.
    #[must_use]
    pub fn has_path(&self, from: Vec3, to: Vec3, ignore_doors: bool) -> bool {
        let delta = to - from;
        let distance = delta.length();
        let Some(direction) = delta.try_normalize() else {
            return true;
        };

        match self
            .physics
            .raycast(from, direction, distance, RayLayers::Terrain)
        {
            Some(hit) => ignore_doors && hit.surface == Surface::Door,
            None => true,
        }
    }

    /// Whether a creature standing at `feet` can see `destination`.
    #[must_use]
    pub fn can_see(&self, feet: Vec3, destination: Vec3, ignore_doors: bool) -> bool {
        self.has_path(feet + Vec3::Y * EYE_HEIGHT, destination, ignore_doors)
    }

    /// Whether there is any floor within `depth` below `point`.
    #[must_use]
    pub fn has_floor(&self, point: Vec3, depth: f32) -> bool {
        self.physics
            .raycast(point, Vec3::NEG_Y, depth, RayLayers::All)
            .is_some()
    }

    /// Whether a creature-sized capsule centred on `point` fits and stands on
    /// a floor.
    #[must_use]
    pub fn is_standable(&self, point: Vec3) -> bool {
        if !self.has_floor(point, FLOOR_PROBE) {
            return false;
        }
        let top = point + Vec3::Y * CAPSULE_HALF_HEIGHT;
        let bottom = point - Vec3::Y * CAPSULE_HALF_HEIGHT;
        !self.physics.capsule_blocked(top, bottom, CAPSULE_RADIUS)
    }
}
