//! User-facing notifications emitted by the control loop.
//!
//! The core never renders text; the host drains these and localizes them.

use crate::types::CreatureId;

/// A notification for the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinionEvent {
    /// A minion started following.
    Following {
        /// The minion.
        creature: CreatureId,
    },
    /// A minion stopped following and now stays.
    Staying {
        /// The minion.
        creature: CreatureId,
    },
    /// A follow request was refused for lack of capacity.
    FollowDenied {
        /// The minion.
        creature: CreatureId,
    },
    /// A minion broke free of control.
    Renegade {
        /// The former minion.
        creature: CreatureId,
        /// Its localized name.
        name: String,
    },
    /// A minion picked up an item from player loot.
    TookItem {
        /// The minion.
        creature: CreatureId,
        /// Its localized name.
        name: String,
        /// The item name.
        item: String,
    },
    /// A minion equipped an item from its inventory.
    EquippedItem {
        /// The minion.
        creature: CreatureId,
        /// Its localized name.
        name: String,
        /// The item name.
        item: String,
    },
}

impl MinionEvent {
    /// The creature this notification is about.
    #[must_use]
    pub fn creature(&self) -> CreatureId {
        match self {
            Self::Following { creature }
            | Self::Staying { creature }
            | Self::FollowDenied { creature }
            | Self::Renegade { creature, .. }
            | Self::TookItem { creature, .. }
            | Self::EquippedItem { creature, .. } => *creature,
        }
    }
}
