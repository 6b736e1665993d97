//! The altar recipe registry.
//!
//! One [`RecipeMap`] per tier plus a flat list of every registered recipe.
//! The registry is an explicit context owned by whoever bootstraps the
//! engine; it also owns the item catalog used for matching.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::ItemCatalog;
use crate::item_stack::ItemStack;
use crate::recipe::AltarRecipe;
use crate::recipe_map::RecipeMap;
use crate::tier::AltarTier;

/// Recipe catalog for every altar tier.
#[derive(Debug, Default)]
pub struct AltarRecipeRegistry {
    initialized: bool,
    maps: BTreeMap<AltarTier, RecipeMap>,
    all_recipes: Vec<Arc<AltarRecipe>>,
    catalog: ItemCatalog,
}

impl AltarRecipeRegistry {
    /// Create an uninitialized registry with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an uninitialized registry around an existing catalog.
    #[must_use]
    pub fn with_catalog(catalog: ItemCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Create the per-tier collections. Later calls do nothing.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }

        for &tier in AltarTier::all() {
            self.maps.insert(tier, RecipeMap::for_tier(tier));
        }
        self.initialized = true;
        info!("Altar recipe registry initialized ({} tiers)", self.maps.len());
    }

    /// Whether [`AltarRecipeRegistry::init`] has run.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Item catalog used for matching.
    #[must_use]
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Mutable access to the catalog, for loading definitions.
    pub fn catalog_mut(&mut self) -> &mut ItemCatalog {
        &mut self.catalog
    }

    /// Whether [`AltarRecipeRegistry::add_recipe`] would take the recipe.
    #[must_use]
    pub fn accepts(&self, recipe: &AltarRecipe) -> bool {
        self.initialized
            && self
                .maps
                .get(&recipe.tier())
                .is_some_and(|map| map.accepts(recipe))
    }

    /// Register a recipe with its tier's collection.
    ///
    /// Returns false, with a warning, when the registry is uninitialized or
    /// the collection rejects the recipe.
    pub fn add_recipe(&mut self, mut recipe: AltarRecipe) -> bool {
        if !self.initialized {
            warn!(
                "Cannot register recipe {}: registry not initialized",
                recipe.uid()
            );
            return false;
        }

        let tier = recipe.tier();
        let Some(map) = self.maps.get_mut(&tier) else {
            warn!(
                "Cannot register recipe {}: no collection for {}",
                recipe.uid(),
                tier.display_name()
            );
            return false;
        };

        let index = self.all_recipes.len() as u32;
        recipe.set_registry_index(index);
        let recipe = Arc::new(recipe);

        if !map.add_recipe(Arc::clone(&recipe)) {
            warn!(
                "Recipe {} rejected by the {} collection",
                recipe.uid(),
                tier.display_name()
            );
            return false;
        }

        debug!("Registered recipe {} as #{}", recipe.uid(), index);
        self.all_recipes.push(recipe);
        true
    }

    /// First recipe of the tier matching the slots.
    #[must_use]
    pub fn find_recipe(
        &self,
        slots: &[Option<ItemStack>],
        tier: AltarTier,
    ) -> Option<Arc<AltarRecipe>> {
        if !self.initialized {
            return None;
        }
        self.maps.get(&tier)?.find_recipe(slots, &self.catalog)
    }

    /// Recipes registered for a tier, in insertion order.
    #[must_use]
    pub fn recipes_for_level(&self, tier: AltarTier) -> Vec<Arc<AltarRecipe>> {
        self.maps
            .get(&tier)
            .map(|map| map.recipes().to_vec())
            .unwrap_or_default()
    }

    /// Recipes producing the item, across all tiers in registration order.
    #[must_use]
    pub fn find_recipes_by_output(&self, item: &ItemStack) -> Vec<Arc<AltarRecipe>> {
        self.all_recipes
            .iter()
            .filter(|recipe| recipe.is_output(item, &self.catalog))
            .cloned()
            .collect()
    }

    /// Collection for a tier.
    #[must_use]
    pub fn recipe_map(&self, tier: AltarTier) -> Option<&RecipeMap> {
        self.maps.get(&tier)
    }

    /// Every registered recipe, indexed by registry index.
    #[must_use]
    pub fn all_recipes(&self) -> &[Arc<AltarRecipe>] {
        &self.all_recipes
    }

    /// Recipe by registry index.
    #[must_use]
    pub fn recipe(&self, index: u32) -> Option<&Arc<AltarRecipe>> {
        self.all_recipes.get(index as usize)
    }

    /// Total number of registered recipes.
    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.all_recipes.len()
    }

    /// Clear every collection and the initialized flag. The catalog is kept.
    #[cfg(test)]
    pub fn reset(&mut self) {
        self.maps.clear();
        self.all_recipes.clear();
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn registry() -> AltarRecipeRegistry {
        let mut registry = AltarRecipeRegistry::with_catalog(fixture_catalog());
        registry.init();
        registry
    }

    #[test]
    fn test_add_before_init_fails() {
        let mut registry = AltarRecipeRegistry::with_catalog(fixture_catalog());
        assert!(!registry.add_recipe(constellation_paper_recipe()));
        assert_eq!(registry.recipe_count(), 0);
        assert!(registry
            .find_recipe(&constellation_paper_slots(), AltarTier::Discovery)
            .is_none());
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut registry = registry();
        assert!(registry.add_recipe(constellation_paper_recipe()));

        registry.init();
        assert_eq!(registry.recipes_for_level(AltarTier::Discovery).len(), 1);
        for &tier in AltarTier::all() {
            let map = registry.recipe_map(tier).expect("collection per tier");
            assert_eq!(map.input_bounds(), (1, tier.slot_count()));
        }
    }

    #[test]
    fn test_registry_index_assigned() {
        let mut registry = registry();
        assert!(registry.add_recipe(constellation_paper_recipe()));
        assert!(registry.add_recipe(journal_recipe()));

        let indices: Vec<_> = registry
            .all_recipes()
            .iter()
            .map(|recipe| recipe.registry_index())
            .collect();
        assert_eq!(indices, vec![Some(0), Some(1)]);
        assert_eq!(
            registry.recipe(1).map(|recipe| recipe.output().item),
            Some(JOURNAL)
        );
    }

    #[test]
    fn test_rejected_recipe_not_listed() {
        let mut registry = registry();
        let wrong_size = AltarRecipe::shapeless(
            AltarTier::Attunement,
            constellation_paper_slots(),
            stack(JOURNAL, 1),
        );
        assert!(!registry.accepts(&wrong_size));
        assert!(!registry.add_recipe(wrong_size));
        assert_eq!(registry.recipe_count(), 0);
        assert!(registry.accepts(&journal_recipe()));

        assert!(registry.add_recipe(journal_recipe()));
        assert_eq!(registry.all_recipes()[0].registry_index(), Some(0));
    }

    #[test]
    fn test_find_recipe_per_tier() {
        let mut registry = registry();
        registry.add_recipe(constellation_paper_recipe());

        assert!(registry
            .find_recipe(&constellation_paper_slots(), AltarTier::Discovery)
            .is_some());
        assert!(registry
            .find_recipe(&constellation_paper_slots(), AltarTier::Attunement)
            .is_none());
    }

    #[test]
    fn test_find_by_output_in_registration_order() {
        let mut registry = registry();
        let mut inputs = journal_slots();
        inputs.resize(AltarTier::Attunement.slot_count(), None);
        assert!(registry.add_recipe(AltarRecipe::shaped(
            AltarTier::Attunement,
            inputs,
            1,
            3,
            stack(JOURNAL, 2),
        )));
        assert!(registry.add_recipe(constellation_paper_recipe()));
        assert!(registry.add_recipe(journal_recipe()));

        let found = registry.find_recipes_by_output(&stack(JOURNAL, 1));
        let tiers: Vec<_> = found.iter().map(|recipe| recipe.tier()).collect();
        assert_eq!(tiers, vec![AltarTier::Attunement, AltarTier::Discovery]);
        let indices: Vec<_> = found.iter().map(|recipe| recipe.registry_index()).collect();
        assert_eq!(indices, vec![Some(0), Some(2)]);
    }

    #[test]
    fn test_reset() {
        let mut registry = registry();
        registry.add_recipe(journal_recipe());
        registry.reset();

        assert!(!registry.is_initialized());
        assert_eq!(registry.recipe_count(), 0);
        assert!(registry.recipe_map(AltarTier::Discovery).is_none());
        assert_eq!(registry.catalog().item_count(), 8);
    }
}
