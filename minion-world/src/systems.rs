//! The per-frame minion system.
//!
//! Owns the registry and the simulation clock. A host calls [`MinionSystem::tick`]
//! once per frame; everything minion-related for that frame happens inside.
//!
//! ## Frame Budget:
//!
//! | Step             | Frequency          |
//! |------------------|--------------------|
//! | Task resumption  | Every frame        |
//! | Loyalty sweep    | Every frame        |
//! | Guide            | Every frame        |
//! | Ambush scan      | Every 20 frames    |
//! | Equipment check  | Every 2 s          |
//! | Quest unlock     | Every 1 s          |
//! | Regeneration     | Every 10 s         |

use minion_core::metrics::CounterSnapshot;
use minion_core::{MinionRegistry, SimTime, TickClock};

use crate::config::WorldConfig;
use crate::events::HudFeed;
use crate::sim::SimWorld;

/// Drives minion control against a [`SimWorld`].
#[derive(Debug)]
pub struct MinionSystem {
    registry: MinionRegistry,
    clock: TickClock,
    hud: HudFeed,
    walk_speed: f32,
}

impl MinionSystem {
    /// A system configured from `config`, starting at time zero.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            registry: MinionRegistry::new(config.effective_minion_config()),
            clock: TickClock::new(SimTime::ZERO, 0),
            hud: HudFeed::new(config.hud_lines),
            walk_speed: config.walk_speed,
        }
    }

    /// The registry.
    #[must_use]
    pub fn registry(&self) -> &MinionRegistry {
        &self.registry
    }

    /// The registry, for hooks.
    pub fn registry_mut(&mut self) -> &mut MinionRegistry {
        &mut self.registry
    }

    /// Current clock.
    #[must_use]
    pub fn clock(&self) -> TickClock {
        self.clock
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.clock.now
    }

    /// Rendered notifications.
    #[must_use]
    pub fn hud(&self) -> &HudFeed {
        &self.hud
    }

    /// Counter snapshot for dashboards.
    #[must_use]
    pub fn stats(&self) -> CounterSnapshot {
        self.registry.counters().snapshot()
    }

    /// Advance one frame of `dt` seconds.
    pub fn tick(&mut self, world: &mut SimWorld, dt: f32) {
        self.clock.now = self.clock.now.after(dt);
        self.clock.frame += 1;

        self.registry.guide_all(world, self.clock);
        if self.walk_speed > 0.0 {
            world.step_locomotion(dt, self.walk_speed);
        }

        let events = self.registry.drain_events();
        self.hud.extend(&events);
    }

    /// Advance `frames` frames of `dt` seconds each.
    pub fn run(&mut self, world: &mut SimWorld, frames: u32, dt: f32) {
        for _ in 0..frames {
            self.tick(world, dt);
        }
    }
}
