//! Item definitions and the ore dictionary.
//!
//! This module provides:
//! - Item definitions (name, whether sub-variants are meaningful)
//! - An ore dictionary: a many-to-many alias system letting several item
//!   types satisfy the same ingredient
//! - The item identity rule used by recipe matching

use ahash::AHashMap;
use astral_common::ItemTypeId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item_stack::ItemStack;

/// Definition of an item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Item type identifier.
    pub id: ItemTypeId,
    /// Unique registry name.
    pub name: String,
    /// Whether the sub-variant value distinguishes different items.
    #[serde(default)]
    pub has_subtypes: bool,
}

impl ItemDefinition {
    /// Create a definition without sub-variants.
    #[must_use]
    pub fn new(id: ItemTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            has_subtypes: false,
        }
    }

    /// Mark the item as having meaningful sub-variants.
    #[must_use]
    pub const fn with_subtypes(mut self, has_subtypes: bool) -> Self {
        self.has_subtypes = has_subtypes;
        self
    }
}

/// Tag name to member stacks, addressed by a dense ore id.
#[derive(Debug, Clone, Default)]
pub struct OreDictionary {
    /// Ore ids by tag name.
    ids: AHashMap<String, u32>,
    /// Member stacks indexed by ore id.
    members: Vec<Vec<ItemStack>>,
}

impl OreDictionary {
    /// Create an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stack under a tag name, returning the tag's ore id.
    pub fn register(&mut self, name: &str, stack: ItemStack) -> u32 {
        let id = match self.ids.get(name) {
            Some(&id) => id,
            None => {
                let id = self.members.len() as u32;
                self.ids.insert(name.to_string(), id);
                self.members.push(Vec::new());
                id
            },
        };

        let entries = &mut self.members[id as usize];
        let entry = stack.with_count(1);
        if !entries.contains(&entry) {
            entries.push(entry);
        }
        debug!("Ore '{}' ({}) now has {} entries", name, id, entries.len());
        id
    }

    /// Ore id of a tag name.
    #[must_use]
    pub fn ore_id(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Member stacks of a tag name, in registration order.
    #[must_use]
    pub fn ores(&self, name: &str) -> &[ItemStack] {
        self.ore_id(name)
            .and_then(|id| self.members.get(id as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All ore ids a stack belongs to.
    #[must_use]
    pub fn ore_ids_for(&self, stack: &ItemStack) -> Vec<u32> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, entries)| {
                entries.iter().any(|entry| {
                    entry.item == stack.item
                        && (entry.is_wildcard() || entry.damage == stack.damage)
                })
            })
            .map(|(id, _)| id as u32)
            .collect()
    }

    /// Number of tag names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no tags are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Item definitions plus the ore dictionary.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: AHashMap<ItemTypeId, ItemDefinition>,
    by_name: AHashMap<String, ItemTypeId>,
    ore: OreDictionary,
}

impl ItemCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item definition. Rejects duplicate ids and names.
    pub fn register_item(&mut self, definition: ItemDefinition) -> bool {
        if self.items.contains_key(&definition.id) || self.by_name.contains_key(&definition.name) {
            return false;
        }
        self.by_name.insert(definition.name.clone(), definition.id);
        self.items.insert(definition.id, definition);
        true
    }

    /// Add a stack to an ore tag.
    pub fn register_ore(&mut self, name: &str, stack: ItemStack) -> u32 {
        self.ore.register(name, stack)
    }

    /// Look up a definition.
    #[must_use]
    pub fn item(&self, id: ItemTypeId) -> Option<&ItemDefinition> {
        self.items.get(&id)
    }

    /// Look up an item type by registry name.
    #[must_use]
    pub fn item_by_name(&self, name: &str) -> Option<ItemTypeId> {
        self.by_name.get(name).copied()
    }

    /// Whether the item's sub-variant matters. Unknown items are treated
    /// as having sub-variants so their damage values are compared.
    #[must_use]
    pub fn has_subtypes(&self, id: ItemTypeId) -> bool {
        self.items.get(&id).map_or(true, |def| def.has_subtypes)
    }

    /// The ore dictionary.
    #[must_use]
    pub fn ore_dictionary(&self) -> &OreDictionary {
        &self.ore
    }

    /// Number of item definitions.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Item identity rule for ingredient matching.
    ///
    /// Matches when both stacks share an ore tag and the candidate holds at
    /// least the required count, or when they are the same item type with the
    /// same sub-variant (sub-variant ignored for items without subtypes).
    #[must_use]
    pub fn items_match(&self, required: &ItemStack, candidate: &ItemStack) -> bool {
        if candidate.count >= required.count {
            let required_ores = self.ore.ore_ids_for(required);
            if !required_ores.is_empty() {
                let candidate_ores = self.ore.ore_ids_for(candidate);
                if required_ores.iter().any(|id| candidate_ores.contains(id)) {
                    return true;
                }
            }
        }

        required.item == candidate.item
            && (!self.has_subtypes(required.item) || required.damage == candidate.damage)
    }
}
