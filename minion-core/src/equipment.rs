//! Equipment advisor: decides whether a minion should pick up or equip an
//! item, and performs at most one such action per check.
//!
//! Every comparison is a strict value upgrade; equal values never swap, so
//! re-running the check on an unchanged loadout is a no-op.

use tracing::debug;

use crate::host::World;
use crate::inventory::{EquipSlot, Inventory, Item, ItemHands, ItemKind, SlotFamily};
use crate::types::{Archetype, CreatureId, ItemId, LootId};

/// What a single equipment check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipAction {
    /// Moved an item from nearby player loot into the minion's inventory.
    TookLoot {
        /// Item name.
        item: String,
    },
    /// Equipped an item already carried.
    Equipped {
        /// Item name.
        item: String,
        /// Slot it went into.
        slot: EquipSlot,
    },
}

fn is_upgrade(item: &Item, occupant: Option<&Item>) -> bool {
    occupant.is_none_or(|current| item.value > current.value)
}

fn first_upgrade(item: &Item, inventory: &Inventory, slots: &[EquipSlot]) -> Option<EquipSlot> {
    slots
        .iter()
        .copied()
        .find(|slot| is_upgrade(item, inventory.equipped_in(*slot)))
}

/// The slot `item` should go into for a creature of `archetype` carrying
/// `inventory`, or `None` if it is not an upgrade anywhere.
#[must_use]
pub fn should_equip(item: &Item, archetype: Archetype, inventory: &Inventory) -> Option<EquipSlot> {
    if inventory.is_equipped(item.id) || item.is_depleted() {
        return None;
    }

    match item.slot_family() {
        SlotFamily::Amulets => first_upgrade(item, inventory, &[EquipSlot::Amulet0, EquipSlot::Amulet1]),
        SlotFamily::Cloaks if archetype.is_lich() => {
            first_upgrade(item, inventory, &[EquipSlot::Cloak1, EquipSlot::Cloak2])
        }
        SlotFamily::Hands => match (archetype, item.kind) {
            (Archetype::SkeletalWarrior, _) if item.is_shield() => {
                first_upgrade(item, inventory, &[EquipSlot::LeftHand])
            }
            (
                Archetype::SkeletalWarrior,
                ItemKind::Weapon {
                    hands: ItemHands::Either,
                    ..
                },
            ) => first_upgrade(item, inventory, &[EquipSlot::RightHand]),
            (archetype, ItemKind::Weapon { weapon, .. })
                if archetype.is_lich() && weapon.is_staff() =>
            {
                first_upgrade(item, inventory, &[EquipSlot::RightHand])
            }
            _ => None,
        },
        SlotFamily::Cloaks | SlotFamily::None => None,
    }
}

/// Run one equipment check for `creature`: first try nearby player loot,
/// then the creature's own inventory. At most one action is taken.
pub fn check_equipment<W: World + ?Sized>(
    world: &mut W,
    creature: CreatureId,
    loot_radius: f32,
) -> Option<EquipAction> {
    if let Some(action) = grab_loot(world, creature, loot_radius) {
        return Some(action);
    }
    equip_from_inventory(world, creature)
}

fn grab_loot<W: World + ?Sized>(
    world: &mut W,
    creature: CreatureId,
    loot_radius: f32,
) -> Option<EquipAction> {
    let (loot_id, item_id) = find_loot_upgrade(world, creature, loot_radius)?;

    let item = world.take_item(loot_id, item_id)?;
    let name = item.name.clone();
    match world.creature_mut(creature) {
        Some(state) => state.inventory.add(item),
        None => return None,
    }

    if world.container(loot_id).is_some_and(|c| c.items.is_empty()) {
        world.remove_container(loot_id);
    }

    debug!(%creature, item = %name, "minion took item from loot");
    Some(EquipAction::TookLoot { item: name })
}

fn find_loot_upgrade<W: World + ?Sized>(
    world: &W,
    creature: CreatureId,
    loot_radius: f32,
) -> Option<(LootId, ItemId)> {
    let state = world.creature(creature)?;
    world
        .loot_near(state.position, loot_radius)
        .into_iter()
        .filter_map(|id| world.container(id))
        .filter(|container| container.player_owned)
        .find_map(|container| {
            container
                .items
                .iter()
                .find(|item| should_equip(item, state.archetype, &state.inventory).is_some())
                .map(|item| (container.id, item.id))
        })
}

fn equip_from_inventory<W: World + ?Sized>(world: &mut W, creature: CreatureId) -> Option<EquipAction> {
    let state = world.creature_mut(creature)?;
    let (item_id, name, slot) = state.inventory.items().iter().find_map(|item| {
        should_equip(item, state.archetype, &state.inventory)
            .map(|slot| (item.id, item.name.clone(), slot))
    })?;

    state.inventory.unequip(slot);
    state.inventory.equip(item_id, slot);

    debug!(%creature, item = %name, ?slot, "minion equipped item");
    Some(EquipAction::Equipped { item: name, slot })
}
