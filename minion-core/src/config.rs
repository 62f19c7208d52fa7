//! Configuration for the minion control core.
//!
//! Maps directly to `minions.toml`. Every field has a default, so an empty
//! document yields the stock tuning.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinionConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// The user-facing behavior switches.
    #[serde(default)]
    pub behavior: BehaviorConfig,
    /// Follow policy tuning.
    #[serde(default)]
    pub follow: FollowConfig,
    /// Periodic work intervals.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Interaction and perception ranges.
    #[serde(default)]
    pub ranges: RangeConfig,
    /// Reposition sampling.
    #[serde(default)]
    pub reposition: RepositionConfig,
    /// Loyalty math.
    #[serde(default)]
    pub loyalty: LoyaltyConfig,
}

impl MinionConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `MinionError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::MinionError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            rng_seed: None,
        }
    }
}

/// Minion audio volume tier, relative to the ambient volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeLevel {
    /// Silenced.
    Mute,
    /// 20 % of ambient.
    Low,
    /// 40 % of ambient.
    Medium,
    /// Full ambient volume.
    #[default]
    Normal,
}

impl VolumeLevel {
    /// Multiplier applied to the ambient volume; `None` means muted.
    #[must_use]
    pub fn scale(self) -> Option<f32> {
        match self {
            Self::Mute => None,
            Self::Low => Some(0.2),
            Self::Medium => Some(0.4),
            Self::Normal => Some(1.0),
        }
    }

    /// Map the 0–3 tier number used by settings menus. Anything above 3 is
    /// treated as normal.
    #[must_use]
    pub fn from_tier(tier: u8) -> Self {
        match tier {
            0 => Self::Mute,
            1 => Self::Low,
            2 => Self::Medium,
            _ => Self::Normal,
        }
    }
}

/// The read-only switches exposed to players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Minion audio tier.
    #[serde(default)]
    pub volume: VolumeLevel,
    /// Slowly regenerate health, magic and stamina.
    #[serde(default = "default_true")]
    pub regenerate: bool,
    /// Teleport far-behind followers to the player.
    #[serde(default = "default_true")]
    pub auto_teleport: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            volume: VolumeLevel::Normal,
            regenerate: true,
            auto_teleport: true,
        }
    }
}

/// Follow policy tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowConfig {
    /// Base follow distance.
    #[serde(default = "default_2_5")]
    pub trigger_distance: f32,
    /// Lower bound of the per-tick follow distance jitter.
    #[serde(default = "default_neg_0_3")]
    pub jitter_min: f32,
    /// Upper bound of the per-tick follow distance jitter.
    #[serde(default = "default_0_7")]
    pub jitter_max: f32,
    /// Frames between ambush scans while sensing is disabled.
    #[serde(default = "default_20_u64")]
    pub ambush_scan_interval_frames: u64,
    /// Radius of the ambush scan.
    #[serde(default = "default_10_0")]
    pub ambush_radius: f32,
    /// Unseen combat targets farther than this are dropped.
    #[serde(default = "default_4_0")]
    pub unseen_drop_distance: f32,
    /// Fights are abandoned when the player is farther than this.
    #[serde(default = "default_12_0")]
    pub abandon_fight_distance: f32,
    /// Teleport recovery kicks in beyond this distance.
    #[serde(default = "default_15_0")]
    pub teleport_distance: f32,
    /// Max angle (degrees) between the player's facing and the direction
    /// from minion to player for a teleport to be allowed.
    #[serde(default = "default_60_0")]
    pub teleport_view_angle: f32,
    /// Give-up timer written when pursuing the proxy.
    #[serde(default = "default_200_0")]
    pub give_up_timer: f32,
    /// Hearing radius forced while pursuing the proxy.
    #[serde(default = "default_20_0")]
    pub proxy_hearing_radius: f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            trigger_distance: 2.5,
            jitter_min: -0.3,
            jitter_max: 0.7,
            ambush_scan_interval_frames: 20,
            ambush_radius: 10.0,
            unseen_drop_distance: 4.0,
            abandon_fight_distance: 12.0,
            teleport_distance: 15.0,
            teleport_view_angle: 60.0,
            give_up_timer: 200.0,
            proxy_hearing_radius: 20.0,
        }
    }
}

/// Periodic work intervals, in simulated seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Between equipment checks.
    #[serde(default = "default_2_0")]
    pub equip_interval: f32,
    /// Before the first equipment check of a new minion.
    #[serde(default = "default_4_0")]
    pub initial_equip_delay: f32,
    /// Between quest-target scans.
    #[serde(default = "default_1_0")]
    pub quest_check_interval: f32,
    /// Between regeneration steps.
    #[serde(default = "default_10_0")]
    pub regen_interval: f32,
    /// Duration of a push impulse.
    #[serde(default = "default_1_5")]
    pub push_duration: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            equip_interval: 2.0,
            initial_equip_delay: 4.0,
            quest_check_interval: 1.0,
            regen_interval: 10.0,
            push_duration: 1.5,
        }
    }
}

/// Interaction and perception ranges, in world units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Max distance for a grab activation to push.
    #[serde(default = "default_2_5")]
    pub push_activate: f32,
    /// Length of the wall probe along the push direction.
    #[serde(default = "default_4_0")]
    pub push_probe: f32,
    /// Proxy distance when the push path is clear.
    #[serde(default = "default_5_0")]
    pub push_distance: f32,
    /// Loot pickup radius.
    #[serde(default = "default_2_0")]
    pub loot_radius: f32,
    /// Quest-target scan radius.
    #[serde(default = "default_5_0")]
    pub quest_radius: f32,
    /// Sight radius given to minions.
    #[serde(default = "default_12_0")]
    pub minion_sight: f32,
    /// Hearing radius given to minions.
    #[serde(default = "default_4_0")]
    pub minion_hearing: f32,
    /// Sight radius restored on renegades.
    #[serde(default = "default_50_0")]
    pub renegade_sight: f32,
    /// Hearing radius restored on renegades.
    #[serde(default = "default_25_0")]
    pub renegade_hearing: f32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            push_activate: 2.5,
            push_probe: 4.0,
            push_distance: 5.0,
            loot_radius: 2.0,
            quest_radius: 5.0,
            minion_sight: 12.0,
            minion_hearing: 4.0,
            renegade_sight: 50.0,
            renegade_hearing: 25.0,
        }
    }
}

/// Reposition sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositionConfig {
    /// Followers closer than this stay put.
    #[serde(default = "default_6_0")]
    pub trigger_distance: f32,
    /// Half-extent of the sampling square around the player.
    #[serde(default = "default_3_0")]
    pub radius: f32,
    /// Samples per follower.
    #[serde(default = "default_20_u32")]
    pub attempts: u32,
}

impl Default for RepositionConfig {
    fn default() -> Self {
        Self {
            trigger_distance: 6.0,
            radius: 3.0,
            attempts: 20,
        }
    }
}

/// Loyalty math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    /// Willpower points per follower slot.
    #[serde(default = "default_30_i32")]
    pub willpower_per_follower: i32,
    /// Percent chance per excess-capacity tick that a follower turns.
    #[serde(default = "default_50_i32")]
    pub strain_chance: i32,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            willpower_per_follower: 30,
            strain_chance: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_neg_0_3() -> f32 { -0.3 }
fn default_0_7() -> f32 { 0.7 }
fn default_1_0() -> f32 { 1.0 }
fn default_1_5() -> f32 { 1.5 }
fn default_2_0() -> f32 { 2.0 }
fn default_2_5() -> f32 { 2.5 }
fn default_3_0() -> f32 { 3.0 }
fn default_4_0() -> f32 { 4.0 }
fn default_5_0() -> f32 { 5.0 }
fn default_6_0() -> f32 { 6.0 }
fn default_10_0() -> f32 { 10.0 }
fn default_12_0() -> f32 { 12.0 }
fn default_15_0() -> f32 { 15.0 }
fn default_20_0() -> f32 { 20.0 }
fn default_25_0() -> f32 { 25.0 }
fn default_50_0() -> f32 { 50.0 }
fn default_60_0() -> f32 { 60.0 }
fn default_200_0() -> f32 { 200.0 }
fn default_20_u32() -> u32 { 20 }
fn default_20_u64() -> u64 { 20 }
fn default_30_i32() -> i32 { 30 }
fn default_50_i32() -> i32 { 50 }
