//! Items, equip slots and the inventory / loadout view of a creature.
//!
//! Storage mechanics belong to the host; this is only the shape the
//! equipment advisor needs to read and the two mutations it performs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ItemId, LootId};

/// Equip slots the advisor may fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipSlot {
    /// First amulet slot.
    Amulet0,
    /// Second amulet slot.
    Amulet1,
    /// First cloak slot.
    Cloak1,
    /// Second cloak slot.
    Cloak2,
    /// Main hand.
    RightHand,
    /// Off hand.
    LeftHand,
}

/// How many hands a weapon occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemHands {
    /// Wieldable in either hand (one-handed).
    Either,
    /// Needs both hands.
    Both,
    /// Off hand only.
    LeftOnly,
}

/// Weapon family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Plain staff.
    Staff,
    /// Enchanted staff.
    MagicStaff,
    /// Sword, axe, mace and the rest.
    Melee,
    /// Bows.
    Ranged,
}

impl WeaponKind {
    /// Staff of either kind.
    #[must_use]
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Staff | Self::MagicStaff)
    }
}

/// What an item is, which also determines its natural equip slot family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Worn on one of the amulet slots.
    Amulet,
    /// Worn on one of the cloak slots.
    Cloak,
    /// Held in a hand.
    Weapon {
        /// Hands it occupies.
        hands: ItemHands,
        /// Weapon family.
        weapon: WeaponKind,
    },
    /// Held in the off hand.
    Shield,
    /// Anything the advisor never equips (armor pieces, consumables, gold).
    Other,
}

/// Slot family an item naturally belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotFamily {
    /// Amulet slots.
    Amulets,
    /// Cloak slots.
    Cloaks,
    /// Hand slots.
    Hands,
    /// No advisor-managed slot.
    None,
}

/// An item as seen by the equipment advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item identity.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Item kind.
    pub kind: ItemKind,
    /// Trade value; the sole ranking criterion.
    pub value: u32,
    /// Remaining condition; zero means fully depleted.
    pub condition: u32,
}

impl Item {
    /// Create an item with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ItemKind, value: u32, condition: u32) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            value,
            condition,
        }
    }

    /// Slot family this item goes into when equipped.
    #[must_use]
    pub fn slot_family(&self) -> SlotFamily {
        match self.kind {
            ItemKind::Amulet => SlotFamily::Amulets,
            ItemKind::Cloak => SlotFamily::Cloaks,
            ItemKind::Weapon { .. } | ItemKind::Shield => SlotFamily::Hands,
            ItemKind::Other => SlotFamily::None,
        }
    }

    /// Whether this item is a shield.
    #[must_use]
    pub fn is_shield(&self) -> bool {
        matches!(self.kind, ItemKind::Shield)
    }

    /// Whether the item is fully depleted.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.condition == 0
    }
}

/// Carried items plus the current loadout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    equipped: BTreeMap<EquipSlot, ItemId>,
}

impl Inventory {
    /// Empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All carried items in pickup order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of carried items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item to the carried list.
    pub fn add(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Look up a carried item.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Item currently in `slot`, if any.
    #[must_use]
    pub fn equipped_in(&self, slot: EquipSlot) -> Option<&Item> {
        self.equipped.get(&slot).and_then(|id| self.get(*id))
    }

    /// Whether the given item occupies any slot.
    #[must_use]
    pub fn is_equipped(&self, id: ItemId) -> bool {
        self.equipped.values().any(|e| *e == id)
    }

    /// Empty `slot`, returning the previous occupant.
    pub fn unequip(&mut self, slot: EquipSlot) -> Option<ItemId> {
        self.equipped.remove(&slot)
    }

    /// Put a carried item into `slot`, unequipping the current occupant and
    /// any other slot the item was in. Returns `false` if the item is not
    /// carried.
    pub fn equip(&mut self, id: ItemId, slot: EquipSlot) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.equipped.retain(|_, e| *e != id);
        self.equipped.insert(slot, id);
        true
    }
}

/// A container of dropped items lying in the world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootContainer {
    /// Container identity.
    pub id: LootId,
    /// Whether the player dropped or owns it; minions only take player loot.
    pub player_owned: bool,
    /// Contents in listing order.
    pub items: Vec<Item>,
}
