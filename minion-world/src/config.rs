//! Host-side configuration for the reference world.
//!
//! Wraps the core `MinionConfig` with host tuning and named audio profiles,
//! the way a settings menu would expose them.

use minion_core::MinionConfig;
use minion_core::config::VolumeLevel;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Audio Profiles
// ---------------------------------------------------------------------------

/// A named minion audio preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioProfile {
    /// Minions make no sound.
    Silent,
    /// Minions are barely audible.
    Quiet,
    /// Minions are noticeably quieter than the world.
    Balanced,
    /// Minions are as loud as everything else.
    #[default]
    Full,
}

impl AudioProfile {
    /// Human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Silent => "Silent: minions are muted",
            Self::Quiet => "Quiet: minions at 20% of ambient volume",
            Self::Balanced => "Balanced: minions at 40% of ambient volume",
            Self::Full => "Full: minions at ambient volume",
        }
    }

    /// The core volume tier for this profile.
    #[must_use]
    pub fn volume(self) -> VolumeLevel {
        match self {
            Self::Silent => VolumeLevel::Mute,
            Self::Quiet => VolumeLevel::Low,
            Self::Balanced => VolumeLevel::Medium,
            Self::Full => VolumeLevel::Normal,
        }
    }
}

// ---------------------------------------------------------------------------
// World Config
// ---------------------------------------------------------------------------

/// Reference-host configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Ambient volume the minion tiers scale.
    #[serde(default = "default_ambient_volume")]
    pub ambient_volume: f32,
    /// Simulation ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Walking speed of creatures, units per second. Zero disables
    /// locomotion.
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f32,
    /// Lines kept in the HUD feed.
    #[serde(default = "default_hud_lines")]
    pub hud_lines: usize,
    /// Audio preset; overrides `minions.behavior.volume` when set.
    #[serde(default)]
    pub audio: Option<AudioProfile>,
    /// Core tuning.
    #[serde(default)]
    pub minions: MinionConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            ambient_volume: default_ambient_volume(),
            tick_rate: default_tick_rate(),
            walk_speed: default_walk_speed(),
            hud_lines: default_hud_lines(),
            audio: None,
            minions: MinionConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Load from a TOML string.
    ///
    /// # Errors
    /// Returns `MinionError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> minion_core::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| minion_core::MinionError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> minion_core::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Seconds per tick.
    #[must_use]
    pub fn tick_seconds(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let rate = self.tick_rate.max(1) as f32;
        1.0 / rate
    }

    /// The core configuration with the audio preset applied.
    #[must_use]
    pub fn effective_minion_config(&self) -> MinionConfig {
        let mut config = self.minions.clone();
        if let Some(profile) = self.audio {
            config.behavior.volume = profile.volume();
        }
        config
    }
}

fn default_ambient_volume() -> f32 { 1.0 }
fn default_tick_rate() -> u32 { 30 }
fn default_walk_speed() -> f32 { 4.0 }
fn default_hud_lines() -> usize { 8 }
