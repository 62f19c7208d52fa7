//! Bridge module: maps host creature data onto minion-core types.
//!
//! Hosts identify creature kinds by a numeric mobile id. The core only cares
//! about three archetypes (the ones with special equipment rules) and
//! treats everything else as `Archetype::Other(id)`.

use minion_core::host::{CreatureState, Senses};
use minion_core::tag::{self, MinionStatus};
use minion_core::{Archetype, Resources, Team, Vec3};

use crate::components::STAND_HEIGHT;

/// Mobile id of the shield-bearing skeletal warrior.
pub const MOBILE_SKELETAL_WARRIOR: u16 = 15;
/// Mobile id of the lich.
pub const MOBILE_LICH: u16 = 32;
/// Mobile id of the ancient lich.
pub const MOBILE_ANCIENT_LICH: u16 = 33;

/// Map a host mobile id to the core archetype.
#[must_use]
pub fn archetype_for_mobile(mobile_id: u16) -> Archetype {
    match mobile_id {
        MOBILE_SKELETAL_WARRIOR => Archetype::SkeletalWarrior,
        MOBILE_LICH => Archetype::Lich,
        MOBILE_ANCIENT_LICH => Archetype::AncientLich,
        other => Archetype::Other(other),
    }
}

/// Map a core archetype back to its host mobile id.
#[must_use]
pub fn mobile_for_archetype(archetype: Archetype) -> u16 {
    match archetype {
        Archetype::SkeletalWarrior => MOBILE_SKELETAL_WARRIOR,
        Archetype::Lich => MOBILE_LICH,
        Archetype::AncientLich => MOBILE_ANCIENT_LICH,
        Archetype::Other(id) => id,
    }
}

/// Description of a creature as the host spawns it.
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    /// Localized name.
    pub name: String,
    /// Host mobile id.
    pub mobile_id: u16,
    /// Floor position the creature stands on.
    pub feet: Vec3,
    /// Allegiance.
    pub team: Team,
    /// Maximum health; magic and stamina are derived from it.
    pub max_health: i32,
    /// Tag carried over from a saved game, if any.
    pub saved_tag: Option<String>,
}

impl SpawnSpec {
    /// A hostile creature with default stats.
    #[must_use]
    pub fn hostile(name: impl Into<String>, mobile_id: u16, feet: Vec3) -> Self {
        Self {
            name: name.into(),
            mobile_id,
            feet,
            team: Team::Hostile,
            max_health: 20,
            saved_tag: None,
        }
    }

    /// An allied creature with default stats.
    #[must_use]
    pub fn ally(name: impl Into<String>, mobile_id: u16, feet: Vec3) -> Self {
        Self {
            team: Team::PlayerAlly,
            ..Self::hostile(name, mobile_id, feet)
        }
    }

    /// Set maximum health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Carry a saved status tag, as if loaded from a save game.
    #[must_use]
    pub fn with_status(mut self, status: MinionStatus) -> Self {
        self.saved_tag = Some(tag::format_tag(status, &self.name));
        self
    }

    /// Build the creature state the core operates on.
    #[must_use]
    pub fn build(self) -> CreatureState {
        let archetype = archetype_for_mobile(self.mobile_id);
        let position = self.feet + Vec3::Y * STAND_HEIGHT;
        let mut state = CreatureState::new(self.name, position, self.team, archetype);
        state.resources = Resources::full(
            self.max_health,
            self.max_health / 2,
            self.max_health,
        );
        state.senses = Some(Senses::default());
        if let Some(saved) = self.saved_tag {
            state.tag = saved;
        }
        if let Some(motor) = state.motor.as_mut() {
            motor.is_hostile = self.team == Team::Hostile;
        }
        state
    }
}
