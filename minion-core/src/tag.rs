//! Display-tag projection of minion status.
//!
//! Status is an explicit field at runtime. The tag is only written for the
//! host's benefit (saved games keep creature names) and read back once, at
//! world load, by prefix matching.

use crate::types::Mode;

const MINION_PREFIX: &str = "Minion";
const FOLLOWER_PREFIX: &str = "Follower";
const RENEGADE_PREFIX: &str = "Renegade";

/// Persisted status of a creature that was once a minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinionStatus {
    /// Minion holding position.
    Staying,
    /// Minion following the player.
    Following,
    /// Former minion that turned on the player.
    Renegade,
}

impl MinionStatus {
    fn prefix(self) -> &'static str {
        match self {
            Self::Staying => MINION_PREFIX,
            Self::Following => FOLLOWER_PREFIX,
            Self::Renegade => RENEGADE_PREFIX,
        }
    }

    /// The mode a record restored from this status starts in. Renegades are
    /// never restored.
    #[must_use]
    pub fn mode(self) -> Option<Mode> {
        match self {
            Self::Staying => Some(Mode::Staying),
            Self::Following => Some(Mode::Following),
            Self::Renegade => None,
        }
    }
}

impl From<Mode> for MinionStatus {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Staying => Self::Staying,
            Mode::Following => Self::Following,
        }
    }
}

/// Render the tag for a creature, e.g. `Follower[Skeletal Warrior]`.
#[must_use]
pub fn format_tag(status: MinionStatus, creature_name: &str) -> String {
    format!("{}[{creature_name}]", status.prefix())
}

/// Recover the status from a tag, if it carries one of the prefixes.
#[must_use]
pub fn parse_tag(tag: &str) -> Option<MinionStatus> {
    [
        MinionStatus::Following,
        MinionStatus::Staying,
        MinionStatus::Renegade,
    ]
    .into_iter()
    .find(|status| tag.starts_with(status.prefix()))
}
