//! Components of the in-memory reference world.
//!
//! Geometry is a list of axis-aligned boxes tagged with a surface kind.
//! Creature positions are body centres, standing `STAND_HEIGHT` above the
//! floor they rest on.

use minion_core::host::{CreatureState, Surface};
use minion_core::inventory::LootContainer;
use minion_core::{CreatureId, Vec3};

/// Height of a standing body's centre above its floor.
pub const STAND_HEIGHT: f32 = 0.9;

/// Horizontal radius of a creature body.
pub const BODY_RADIUS: f32 = 0.4;

/// Half the height of a creature body.
pub const BODY_HALF_HEIGHT: f32 = 0.9;

/// A solid axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
    /// What a ray reports when it hits this box.
    pub surface: Surface,
}

impl Block {
    /// A box spanning two corners in any order.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3, surface: Surface) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            surface,
        }
    }

    /// Entry distance of a ray, using the slab method.
    #[must_use]
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;
        for axis in 0..3 {
            let (o, d, lo, hi) = (origin[axis], direction[axis], self.min[axis], self.max[axis]);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }

    /// Squared distance from a point to the box (zero inside).
    #[must_use]
    pub fn distance_squared(&self, point: Vec3) -> f32 {
        let clamped = point.clamp(self.min, self.max);
        clamped.distance_squared(point)
    }

    /// Whether a sphere overlaps the box.
    #[must_use]
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.distance_squared(center) < radius * radius
    }
}

/// A creature living in the reference world.
#[derive(Debug, Clone)]
pub struct Body {
    /// Identity.
    pub id: CreatureId,
    /// Everything the controller reads and writes.
    pub state: CreatureState,
    /// Inactive bodies are kept but hidden from queries.
    pub active: bool,
}

impl Body {
    /// Whether a sphere overlaps this body's upright cylinder.
    #[must_use]
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        body_overlaps_sphere(self.state.position, center, radius)
    }
}

/// Whether a sphere overlaps an upright body centred at `body`.
#[must_use]
pub fn body_overlaps_sphere(body: Vec3, center: Vec3, radius: f32) -> bool {
    let flat = Vec3::new(center.x - body.x, 0.0, center.z - body.z).length();
    let vertical = (center.y - body.y).abs();
    flat < BODY_RADIUS + radius && vertical < BODY_HALF_HEIGHT + radius
}

/// A loot container lying in the world.
#[derive(Debug, Clone)]
pub struct LootPile {
    /// Where it lies.
    pub position: Vec3,
    /// Contents.
    pub container: LootContainer,
}
