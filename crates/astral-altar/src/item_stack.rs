//! Item stacks held in altar slots and produced by recipes.
//!
//! A stack is an item type, a sub-variant ("damage") value and a count.
//! Empty slots are represented as `None` in slot arrays rather than by a
//! zero-count stack.

use astral_common::{CompoundTag, ItemTypeId, TagResult};
use serde::{Deserialize, Serialize};

/// Sub-variant value meaning "any sub-variant".
pub const WILDCARD_DAMAGE: u16 = 32767;

/// An item type with sub-variant and quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type.
    pub item: ItemTypeId,
    /// Sub-variant value.
    pub damage: u16,
    /// Number of items.
    pub count: u32,
}

impl ItemStack {
    /// Create a stack with sub-variant 0.
    #[must_use]
    pub const fn new(item: ItemTypeId, count: u32) -> Self {
        Self {
            item,
            damage: 0,
            count,
        }
    }

    /// Create a stack with a sub-variant.
    #[must_use]
    pub const fn with_damage(item: ItemTypeId, damage: u16, count: u32) -> Self {
        Self {
            item,
            damage,
            count,
        }
    }

    /// Create a stack that accepts any sub-variant.
    #[must_use]
    pub const fn wildcard(item: ItemTypeId, count: u32) -> Self {
        Self::with_damage(item, WILDCARD_DAMAGE, count)
    }

    /// Whether the sub-variant is the wildcard sentinel.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        self.damage == WILDCARD_DAMAGE
    }

    /// Whether the stack holds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Same stack with another count.
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Remove up to `amount` items, returning how many were removed.
    pub fn shrink(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.count);
        self.count -= removed;
        removed
    }

    /// Write the stack into a tag document.
    #[must_use]
    pub fn to_tag(&self) -> CompoundTag {
        let mut tag = CompoundTag::new();
        tag.set_u32("item", self.item.raw());
        tag.set_int("damage", i32::from(self.damage));
        tag.set_u32("count", self.count);
        tag
    }

    /// Read a stack written by [`ItemStack::to_tag`].
    pub fn from_tag(tag: &CompoundTag) -> TagResult<Self> {
        let damage = tag.get_u32("damage")?;
        let damage = u16::try_from(damage).map_err(|_| astral_common::TagError::OutOfRange {
            key: "damage".to_string(),
            value: i64::from(damage),
        })?;

        Ok(Self {
            item: ItemTypeId::new(tag.get_u32("item")?),
            damage,
            count: tag.get_u32("count")?,
        })
    }
}

/// Count of non-empty slots in a slot array.
#[must_use]
pub fn occupied_slots(slots: &[Option<ItemStack>]) -> usize {
    slots
        .iter()
        .filter(|slot| slot.is_some_and(|stack| !stack.is_empty()))
        .count()
}
