//! Shared fixtures for unit tests.

use astral_common::ItemTypeId;

use crate::catalog::{ItemCatalog, ItemDefinition};
use crate::item_stack::ItemStack;
use crate::recipe::AltarRecipe;
use crate::tier::AltarTier;

pub const PAPER: ItemTypeId = ItemTypeId::new(1);
pub const AQUAMARINE: ItemTypeId = ItemTypeId::new(2);
pub const ROCK_CRYSTAL: ItemTypeId = ItemTypeId::new(3);
pub const INFUSED_PLANKS: ItemTypeId = ItemTypeId::new(4);
pub const CONSTELLATION_PAPER: ItemTypeId = ItemTypeId::new(5);
pub const JOURNAL: ItemTypeId = ItemTypeId::new(6);
pub const STARDUST: ItemTypeId = ItemTypeId::new(7);
pub const DYE: ItemTypeId = ItemTypeId::new(8);

pub fn stack(item: ItemTypeId, count: u32) -> ItemStack {
    ItemStack::new(item, count)
}

pub fn fixture_catalog() -> ItemCatalog {
    let mut catalog = ItemCatalog::new();
    for (id, name) in [
        (PAPER, "paper"),
        (AQUAMARINE, "aquamarine"),
        (ROCK_CRYSTAL, "rock_crystal"),
        (INFUSED_PLANKS, "infused_wood_planks"),
        (CONSTELLATION_PAPER, "constellation_paper"),
        (JOURNAL, "journal"),
        (STARDUST, "stardust"),
    ] {
        catalog.register_item(ItemDefinition::new(id, name));
    }
    catalog.register_item(ItemDefinition::new(DYE, "dye").with_subtypes(true));
    catalog.register_ore("crystal", stack(AQUAMARINE, 1));
    catalog.register_ore("crystal", ItemStack::wildcard(ROCK_CRYSTAL, 1));
    catalog
}

/// Nine-slot array with the given slots filled.
pub fn discovery_slots(filled: &[(usize, ItemStack)]) -> Vec<Option<ItemStack>> {
    let mut slots = vec![None; AltarTier::Discovery.slot_count()];
    for &(index, stack) in filled {
        slots[index] = Some(stack);
    }
    slots
}

/// Shapeless: paper, any crystal, infused planks.
pub fn constellation_paper_recipe() -> AltarRecipe {
    AltarRecipe::shapeless(
        AltarTier::Discovery,
        constellation_paper_slots(),
        stack(CONSTELLATION_PAPER, 1),
    )
    .with_starlight(100)
    .with_duration(40)
}

pub fn constellation_paper_slots() -> Vec<Option<ItemStack>> {
    discovery_slots(&[
        (0, stack(PAPER, 1)),
        (4, stack(AQUAMARINE, 1)),
        (8, stack(INFUSED_PLANKS, 1)),
    ])
}

/// Shaped: stardust over paper over aquamarine down the middle column.
pub fn journal_recipe() -> AltarRecipe {
    AltarRecipe::shaped(AltarTier::Discovery, journal_slots(), 1, 3, stack(JOURNAL, 1))
        .with_starlight(50)
        .with_duration(20)
}

pub fn journal_slots() -> Vec<Option<ItemStack>> {
    discovery_slots(&[
        (1, stack(STARDUST, 1)),
        (4, stack(PAPER, 1)),
        (7, stack(AQUAMARINE, 1)),
    ])
}
