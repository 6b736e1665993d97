//! Altar recipe definitions and ingredient matching.
//!
//! A recipe holds one optional ingredient per altar slot. Shaped recipes
//! compare slot by slot; shapeless recipes treat the inputs as a bag and
//! assign each requirement to the first candidate slot that can satisfy it.

use astral_common::RecipeUid;

use crate::catalog::ItemCatalog;
use crate::item_stack::{occupied_slots, ItemStack};
use crate::tier::AltarTier;

/// Default craft duration in ticks.
pub const DEFAULT_DURATION: u32 = 100;

/// One craftable altar transformation.
#[derive(Debug, Clone)]
pub struct AltarRecipe {
    uid: RecipeUid,
    tier: AltarTier,
    inputs: Vec<Option<ItemStack>>,
    output: ItemStack,
    required_constellation: Option<String>,
    starlight_cost: u32,
    duration: u32,
    shaped: bool,
    width: u8,
    height: u8,
    registry_index: Option<u32>,
}

impl AltarRecipe {
    /// Create a shaped recipe. `width` and `height` describe the pattern
    /// area and are kept as metadata only.
    #[must_use]
    pub fn shaped(
        tier: AltarTier,
        inputs: Vec<Option<ItemStack>>,
        width: u8,
        height: u8,
        output: ItemStack,
    ) -> Self {
        Self::from_parts(tier, inputs, output, true, width, height)
    }

    /// Create a shapeless recipe.
    #[must_use]
    pub fn shapeless(tier: AltarTier, inputs: Vec<Option<ItemStack>>, output: ItemStack) -> Self {
        Self::from_parts(tier, inputs, output, false, 0, 0)
    }

    fn from_parts(
        tier: AltarTier,
        inputs: Vec<Option<ItemStack>>,
        output: ItemStack,
        shaped: bool,
        width: u8,
        height: u8,
    ) -> Self {
        Self {
            uid: RecipeUid::new(),
            tier,
            inputs: inputs
                .into_iter()
                .map(|slot| slot.filter(|stack| !stack.is_empty()))
                .collect(),
            output,
            required_constellation: None,
            starlight_cost: 0,
            duration: DEFAULT_DURATION,
            shaped,
            width,
            height,
            registry_index: None,
        }
    }

    /// Set the starlight cost.
    #[must_use]
    pub const fn with_starlight(mut self, cost: u32) -> Self {
        self.starlight_cost = cost;
        self
    }

    /// Set the craft duration in ticks (at least one).
    #[must_use]
    pub fn with_duration(mut self, ticks: u32) -> Self {
        self.duration = ticks.max(1);
        self
    }

    /// Set the constellation the craft requires.
    #[must_use]
    pub fn with_constellation(mut self, constellation: impl Into<String>) -> Self {
        self.required_constellation = Some(constellation.into());
        self
    }

    /// Generated identifier.
    #[must_use]
    pub const fn uid(&self) -> RecipeUid {
        self.uid
    }

    /// Tier whose collection holds this recipe.
    #[must_use]
    pub const fn tier(&self) -> AltarTier {
        self.tier
    }

    /// Per-slot ingredient requirements.
    #[must_use]
    pub fn inputs(&self) -> &[Option<ItemStack>] {
        &self.inputs
    }

    /// Produced stack.
    #[must_use]
    pub const fn output(&self) -> ItemStack {
        self.output
    }

    /// Number of produced item kinds (0 when the output stack is empty).
    #[must_use]
    pub const fn output_count(&self) -> usize {
        if self.output.is_empty() {
            0
        } else {
            1
        }
    }

    /// Constellation requirement. Carried but never checked by matching.
    #[must_use]
    pub fn required_constellation(&self) -> Option<&str> {
        self.required_constellation.as_deref()
    }

    /// Starlight consumed on completion and required while running.
    #[must_use]
    pub const fn starlight_cost(&self) -> u32 {
        self.starlight_cost
    }

    /// Duration in ticks at full speed.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.duration
    }

    /// Whether matching is positional.
    #[must_use]
    pub const fn is_shaped(&self) -> bool {
        self.shaped
    }

    /// Pattern width (shaped recipes only).
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Pattern height (shaped recipes only).
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Number of slots with a requirement.
    #[must_use]
    pub fn ingredient_count(&self) -> usize {
        occupied_slots(&self.inputs)
    }

    /// Index assigned by the registry on successful registration.
    #[must_use]
    pub const fn registry_index(&self) -> Option<u32> {
        self.registry_index
    }

    pub(crate) fn set_registry_index(&mut self, index: u32) {
        self.registry_index = Some(index);
    }

    /// Check candidate slot contents against this recipe.
    ///
    /// A slot array of a different length never matches.
    #[must_use]
    pub fn matches(&self, slots: &[Option<ItemStack>], catalog: &ItemCatalog) -> bool {
        if slots.len() != self.inputs.len() {
            return false;
        }

        if self.shaped {
            self.matches_shaped(slots, catalog)
        } else {
            self.matches_shapeless(slots, catalog)
        }
    }

    fn matches_shaped(&self, slots: &[Option<ItemStack>], catalog: &ItemCatalog) -> bool {
        self.inputs.iter().zip(slots).all(|(required, candidate)| {
            let candidate = candidate.filter(|stack| !stack.is_empty());
            match (required, candidate) {
                (None, None) => true,
                (None, Some(_)) | (Some(_), None) => false,
                (Some(required), Some(candidate)) => {
                    candidate.count >= required.count && catalog.items_match(required, &candidate)
                },
            }
        })
    }

    /// First-fit bag matching without backtracking. A layout that only
    /// matches under a different assignment is reported as a mismatch.
    fn matches_shapeless(&self, slots: &[Option<ItemStack>], catalog: &ItemCatalog) -> bool {
        let mut remaining: Vec<Option<ItemStack>> = slots
            .iter()
            .map(|slot| slot.filter(|stack| !stack.is_empty()))
            .collect();

        for required in self.inputs.iter().flatten() {
            let found = remaining.iter_mut().find(|slot| match slot {
                Some(candidate) => {
                    candidate.count >= required.count && catalog.items_match(required, candidate)
                },
                None => false,
            });

            let Some(slot) = found else {
                return false;
            };

            let emptied = slot.as_mut().map_or(true, |stack| {
                stack.shrink(required.count);
                stack.is_empty()
            });
            if emptied {
                *slot = None;
            }
        }

        true
    }

    /// Whether `candidate` is the item this recipe produces.
    #[must_use]
    pub fn is_output(&self, candidate: &ItemStack, catalog: &ItemCatalog) -> bool {
        if self.output.item != candidate.item {
            return false;
        }
        if self.output.is_wildcard() || candidate.is_wildcard() {
            return true;
        }
        !catalog.has_subtypes(self.output.item) || self.output.damage == candidate.damage
    }
}
