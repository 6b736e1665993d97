//! Per-tier recipe collections.

use std::sync::Arc;

use astral_common::ItemTypeId;
use tracing::{debug, warn};

use crate::catalog::ItemCatalog;
use crate::item_stack::{occupied_slots, ItemStack};
use crate::recipe::AltarRecipe;
use crate::tier::AltarTier;

/// Ordered recipes for one altar tier.
#[derive(Debug, Clone)]
pub struct RecipeMap {
    /// Tier served by this collection.
    tier: AltarTier,
    /// Minimum number of non-empty inputs.
    min_inputs: usize,
    /// Maximum number of non-empty inputs (also the slot count).
    max_inputs: usize,
    /// Minimum number of outputs.
    min_outputs: usize,
    /// Maximum number of outputs.
    max_outputs: usize,
    /// Recipes in insertion order.
    recipes: Vec<Arc<AltarRecipe>>,
}

impl RecipeMap {
    /// Create an empty collection accepting between `min_inputs` and
    /// `max_inputs` ingredients and exactly one output.
    #[must_use]
    pub fn new(tier: AltarTier, min_inputs: usize, max_inputs: usize) -> Self {
        Self {
            tier,
            min_inputs,
            max_inputs,
            min_outputs: 1,
            max_outputs: 1,
            recipes: Vec::new(),
        }
    }

    /// Collection for a tier with bounds `[1, slot_count]`.
    #[must_use]
    pub fn for_tier(tier: AltarTier) -> Self {
        Self::new(tier, 1, tier.slot_count())
    }

    /// Tier served by this collection.
    #[must_use]
    pub const fn tier(&self) -> AltarTier {
        self.tier
    }

    /// Number of input slots recipes must describe.
    #[must_use]
    pub const fn slot_count(&self) -> usize {
        self.max_inputs
    }

    /// Input bounds as `(min, max)`.
    #[must_use]
    pub const fn input_bounds(&self) -> (usize, usize) {
        (self.min_inputs, self.max_inputs)
    }

    /// Whether a recipe's shape fits the bounds. Logs the reason when not.
    #[must_use]
    pub fn accepts(&self, recipe: &AltarRecipe) -> bool {
        if recipe.inputs().len() != self.max_inputs {
            warn!(
                "Rejected {} recipe {}: {} input slots, expected {}",
                self.tier.display_name(),
                recipe.uid(),
                recipe.inputs().len(),
                self.max_inputs
            );
            return false;
        }

        let inputs = occupied_slots(recipe.inputs());
        if inputs < self.min_inputs || inputs > self.max_inputs {
            warn!(
                "Rejected {} recipe {}: {} ingredients outside [{}, {}]",
                self.tier.display_name(),
                recipe.uid(),
                inputs,
                self.min_inputs,
                self.max_inputs
            );
            return false;
        }

        let outputs = recipe.output_count();
        if outputs < self.min_outputs || outputs > self.max_outputs {
            warn!(
                "Rejected {} recipe {}: no output",
                self.tier.display_name(),
                recipe.uid()
            );
            return false;
        }
        true
    }

    /// Add a recipe. Returns false when its shape violates the bounds.
    pub fn add_recipe(&mut self, recipe: Arc<AltarRecipe>) -> bool {
        if !self.accepts(&recipe) {
            return false;
        }

        debug!(
            "Added {} recipe {} ({} ingredients)",
            self.tier.display_name(),
            recipe.uid(),
            occupied_slots(recipe.inputs())
        );
        self.recipes.push(recipe);
        true
    }

    /// First recipe, in insertion order, matching the slots.
    #[must_use]
    pub fn find_recipe(
        &self,
        slots: &[Option<ItemStack>],
        catalog: &ItemCatalog,
    ) -> Option<Arc<AltarRecipe>> {
        self.recipes
            .iter()
            .find(|recipe| recipe.matches(slots, catalog))
            .cloned()
    }

    /// All recipes producing the given item.
    #[must_use]
    pub fn find_recipes_by_output(
        &self,
        item: &ItemStack,
        catalog: &ItemCatalog,
    ) -> Vec<Arc<AltarRecipe>> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.is_output(item, catalog))
            .cloned()
            .collect()
    }

    /// Whether any recipe produces the item type, ignoring sub-variants.
    #[must_use]
    pub fn produces(&self, item: ItemTypeId) -> bool {
        self.recipes.iter().any(|recipe| recipe.output().item == item)
    }

    /// Recipes in insertion order.
    #[must_use]
    pub fn recipes(&self) -> &[Arc<AltarRecipe>] {
        &self.recipes
    }

    /// Number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
