//! Recipe file loading.
//!
//! This module provides:
//! - TOML recipe files declaring items, ore tags and altar recipes
//! - Validation on load (duplicate names, unknown items, bad patterns)
//! - Registration of everything a file declares into a registry
//!
//! ```toml
//! version = "1.0.0"
//!
//! [[items]]
//! id = 1
//! name = "paper"
//!
//! [ore]
//! crystal = [{ item = "aquamarine" }, { item = "rock_crystal", wildcard = true }]
//!
//! [[recipes]]
//! name = "constellation_paper"
//! tier = "discovery"
//! starlight = 700
//! ingredients = [{ item = "paper" }, { tag = "crystal" }]
//! output = { item = "constellation_paper" }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use astral_common::SchemaVersion;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::builder::{AltarRecipeBuilder, RecipeBuildError};
use crate::catalog::{ItemCatalog, ItemDefinition};
use crate::item_stack::{ItemStack, WILDCARD_DAMAGE};
use crate::recipe::{AltarRecipe, DEFAULT_DURATION};
use crate::registry::AltarRecipeRegistry;
use crate::tier::AltarTier;

/// Errors that can occur during recipe loading.
#[derive(Debug, Error)]
pub enum RecipeLoadError {
    /// File not found.
    #[error("Recipe file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read recipe file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse recipe TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// File version this build cannot read.
    #[error("Unsupported recipe file version: {0}")]
    UnsupportedVersion(String),

    /// Validation error.
    #[error("Recipe validation error: {0}")]
    ValidationError(String),

    /// Two recipes share a name.
    #[error("Duplicate recipe name: {0}")]
    DuplicateName(String),

    /// Item id or name already registered.
    #[error("Duplicate item: {0}")]
    DuplicateItem(String),

    /// Reference to an item the catalog does not know.
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Recipe could not be built.
    #[error("Recipe {recipe}: {source}")]
    Build {
        /// Recipe name.
        recipe: String,
        /// Builder error.
        source: RecipeBuildError,
    },

    /// Registry refused the recipe.
    #[error("Recipe {0} rejected by the registry")]
    Rejected(String),
}

/// Result type for recipe loading operations.
pub type RecipeLoadResult<T> = Result<T, RecipeLoadError>;

/// Reference to an item by catalog name, or to an ore tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Catalog item name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Ore tag name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Sub-variant.
    #[serde(default)]
    pub damage: u16,
    /// Accept any sub-variant.
    #[serde(default)]
    pub wildcard: bool,
    /// Quantity.
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_count() -> u32 {
    1
}

impl ItemRef {
    /// Reference an item by name.
    #[must_use]
    pub fn item(name: impl Into<String>) -> Self {
        Self {
            item: Some(name.into()),
            tag: None,
            damage: 0,
            wildcard: false,
            count: 1,
        }
    }

    /// Reference an ore tag.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            item: None,
            tag: Some(name.into()),
            ..Self::item("")
        }
    }

    /// Set the quantity.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Resolve a plain item reference to a stack.
    fn to_stack(&self, catalog: &ItemCatalog) -> RecipeLoadResult<ItemStack> {
        let name = self.item.as_deref().ok_or_else(|| {
            RecipeLoadError::ValidationError(format!(
                "expected an item name, got tag {:?}",
                self.tag
            ))
        })?;
        let id = catalog
            .item_by_name(name)
            .ok_or_else(|| RecipeLoadError::UnknownItem(name.to_string()))?;
        let damage = if self.wildcard {
            WILDCARD_DAMAGE
        } else {
            self.damage
        };
        Ok(ItemStack::with_damage(id, damage, self.count))
    }

    fn check(&self, context: &str) -> RecipeLoadResult<()> {
        match (&self.item, &self.tag) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(RecipeLoadError::ValidationError(format!(
                "{context}: reference needs exactly one of `item` or `tag`"
            ))),
        }
    }
}

/// An altar recipe definition loaded from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDefinition {
    /// Unique recipe name.
    pub name: String,
    /// Altar tier.
    pub tier: AltarTier,
    /// Positional matching.
    #[serde(default)]
    pub shaped: bool,
    /// Pattern rows (shaped only).
    #[serde(default)]
    pub pattern: Vec<String>,
    /// Pattern keys (shaped only), single-character names.
    #[serde(default)]
    pub key: BTreeMap<String, ItemRef>,
    /// Ingredients (shapeless only).
    #[serde(default)]
    pub ingredients: Vec<ItemRef>,
    /// Produced stack.
    pub output: ItemRef,
    /// Starlight cost.
    #[serde(default)]
    pub starlight: u32,
    /// Duration in ticks.
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Required constellation.
    #[serde(default)]
    pub constellation: Option<String>,
}

const fn default_duration() -> u32 {
    DEFAULT_DURATION
}

impl RecipeDefinition {
    /// Validates the recipe definition.
    pub fn validate(&self) -> RecipeLoadResult<()> {
        if self.name.is_empty() {
            return Err(RecipeLoadError::ValidationError(
                "Recipe has empty name".to_string(),
            ));
        }

        self.output.check(&self.name)?;
        if self.output.tag.is_some() {
            return Err(RecipeLoadError::ValidationError(format!(
                "Recipe {} output must name an item",
                self.name
            )));
        }

        if self.shaped {
            if !self.ingredients.is_empty() {
                return Err(RecipeLoadError::ValidationError(format!(
                    "Shaped recipe {} lists shapeless ingredients",
                    self.name
                )));
            }
            for (symbol, reference) in &self.key {
                if symbol.chars().count() != 1 {
                    return Err(RecipeLoadError::ValidationError(format!(
                        "Recipe {} key {symbol:?} is not a single character",
                        self.name
                    )));
                }
                reference.check(&self.name)?;
            }
        } else {
            if !self.pattern.is_empty() || !self.key.is_empty() {
                return Err(RecipeLoadError::ValidationError(format!(
                    "Shapeless recipe {} has a pattern",
                    self.name
                )));
            }
            for reference in &self.ingredients {
                reference.check(&self.name)?;
            }
        }

        Ok(())
    }

    /// Build the recipe against a catalog.
    pub fn to_altar_recipe(&self, catalog: &ItemCatalog) -> RecipeLoadResult<AltarRecipe> {
        let output = self.output.to_stack(catalog)?;

        let mut builder = if self.shaped {
            let mut builder =
                AltarRecipeBuilder::shaped(self.tier, output).pattern(self.pattern.iter().cloned());
            for (symbol, reference) in &self.key {
                let Some(symbol) = symbol.chars().next() else {
                    continue;
                };
                builder = match &reference.tag {
                    Some(tag) => builder.key_tag(symbol, tag, reference.count),
                    None => builder.key(symbol, reference.to_stack(catalog)?),
                };
            }
            builder
        } else {
            let mut builder = AltarRecipeBuilder::shapeless(self.tier, output);
            for reference in &self.ingredients {
                builder = match &reference.tag {
                    Some(tag) => builder.ingredient_tag(tag, reference.count),
                    None => builder.ingredient(reference.to_stack(catalog)?),
                };
            }
            builder
        };

        builder = builder.starlight(self.starlight).duration(self.duration);
        if let Some(constellation) = &self.constellation {
            builder = builder.constellation(constellation);
        }

        builder
            .build(catalog)
            .map_err(|source| RecipeLoadError::Build {
                recipe: self.name.clone(),
                source,
            })
    }
}

/// Items, ore tags and recipes from a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Item definitions.
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
    /// Ore tag members by tag name.
    #[serde(default)]
    pub ore: BTreeMap<String, Vec<ItemRef>>,
    /// Recipes in this file.
    #[serde(default)]
    pub recipes: Vec<RecipeDefinition>,
}

fn default_version() -> String {
    SchemaVersion::RECIPE_FILE.to_string()
}

impl RecipeFile {
    /// Parse and validate a file's contents.
    pub fn parse(contents: &str) -> RecipeLoadResult<Self> {
        let file: Self = toml::from_str(contents)?;
        file.validate()?;
        Ok(file)
    }

    /// Read, parse and validate a file.
    pub fn load(path: &Path) -> RecipeLoadResult<Self> {
        if !path.exists() {
            return Err(RecipeLoadError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let file = Self::parse(&contents)?;
        debug!(
            "Parsed {}: {} items, {} ore tags, {} recipes",
            path.display(),
            file.items.len(),
            file.ore.len(),
            file.recipes.len()
        );
        Ok(file)
    }

    /// Check the version, recipe names and references.
    pub fn validate(&self) -> RecipeLoadResult<()> {
        let version = SchemaVersion::parse(&self.version)
            .filter(|version| SchemaVersion::RECIPE_FILE.can_read(version))
            .ok_or_else(|| RecipeLoadError::UnsupportedVersion(self.version.clone()))?;
        debug!("Recipe file version {}", version);

        let mut names = HashSet::new();
        for recipe in &self.recipes {
            recipe.validate()?;
            if !names.insert(recipe.name.as_str()) {
                return Err(RecipeLoadError::DuplicateName(recipe.name.clone()));
            }
        }

        for (tag, members) in &self.ore {
            for member in members {
                if member.item.is_none() || member.tag.is_some() {
                    return Err(RecipeLoadError::ValidationError(format!(
                        "Ore tag {tag} members must name items"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Add the file's items and ore tags to a catalog.
    pub fn register_catalog(&self, catalog: &mut ItemCatalog) -> RecipeLoadResult<()> {
        for definition in &self.items {
            if !catalog.register_item(definition.clone()) {
                return Err(RecipeLoadError::DuplicateItem(definition.name.clone()));
            }
        }

        for (tag, members) in &self.ore {
            for member in members {
                let stack = member.to_stack(catalog)?;
                catalog.register_ore(tag, stack);
            }
        }
        Ok(())
    }

    /// Build every recipe against a catalog.
    pub fn build_recipes(&self, catalog: &ItemCatalog) -> RecipeLoadResult<Vec<AltarRecipe>> {
        self.recipes
            .iter()
            .map(|definition| definition.to_altar_recipe(catalog))
            .collect()
    }
}

/// Statistics for the recipe loader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecipeLoaderStats {
    /// Number of files loaded.
    pub files_loaded: u32,
    /// Number of recipes registered.
    pub recipes_loaded: u32,
    /// Number of files that failed to load.
    pub files_failed: u32,
}

/// Loads recipe files into a registry.
#[derive(Debug, Default)]
pub struct RecipeLoader {
    stats: RecipeLoaderStats,
}

impl RecipeLoader {
    /// Creates a new recipe loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns loading statistics.
    #[must_use]
    pub const fn stats(&self) -> RecipeLoaderStats {
        self.stats
    }

    /// Load one file into the registry, initializing it if needed.
    ///
    /// Returns the number of recipes registered.
    pub fn load_file(
        &mut self,
        path: &Path,
        registry: &mut AltarRecipeRegistry,
    ) -> RecipeLoadResult<usize> {
        let result = Self::load_into(path, registry);
        match &result {
            Ok(count) => {
                self.stats.files_loaded += 1;
                self.stats.recipes_loaded += *count as u32;
                info!("Loaded {} recipes from {}", count, path.display());
            },
            Err(e) => {
                self.stats.files_failed += 1;
                warn!("Failed to load {}: {}", path.display(), e);
            },
        }
        result
    }

    /// The registry is only touched once the whole file has been checked.
    fn load_into(path: &Path, registry: &mut AltarRecipeRegistry) -> RecipeLoadResult<usize> {
        let file = RecipeFile::load(path)?;
        registry.init();

        let mut catalog = registry.catalog().clone();
        file.register_catalog(&mut catalog)?;
        let recipes = file.build_recipes(&catalog)?;
        if let Some((_, definition)) = recipes
            .iter()
            .zip(&file.recipes)
            .find(|(recipe, _)| !registry.accepts(recipe))
        {
            return Err(RecipeLoadError::Rejected(definition.name.clone()));
        }

        *registry.catalog_mut() = catalog;
        let count = recipes.len();
        for (recipe, definition) in recipes.into_iter().zip(&file.recipes) {
            if !registry.add_recipe(recipe) {
                return Err(RecipeLoadError::Rejected(definition.name.clone()));
            }
        }
        Ok(count)
    }

    /// Load every file, continuing past failures. Returns the number of
    /// recipes registered.
    pub fn load_all<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        registry: &mut AltarRecipeRegistry,
    ) -> usize {
        paths
            .iter()
            .filter_map(|path| self.load_file(path.as_ref(), registry).ok())
            .sum()
    }
}
