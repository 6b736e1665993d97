//! Fluent construction of altar recipes.
//!
//! Shaped recipes are described by a character pattern, either 3 rows of 3
//! (placed on the inner grid every tier exposes) or 5 rows of 5 (the full
//! grid; cells the tier does not expose must be blank). `_` and space are
//! blank cells. Tag ingredients resolve to the first stack registered under
//! the tag, which then matches any member through the ore dictionary.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::catalog::ItemCatalog;
use crate::item_stack::ItemStack;
use crate::recipe::{AltarRecipe, DEFAULT_DURATION};
use crate::tier::{AltarTier, GridPos};

/// Recipe construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecipeBuildError {
    /// Output stack is empty.
    #[error("Recipe output is empty")]
    EmptyOutput,
    /// Duration of zero ticks.
    #[error("Recipe duration must be positive")]
    ZeroDuration,
    /// Recipe has no ingredients.
    #[error("Recipe has no ingredients")]
    NoIngredients,
    /// An ingredient with a zero count.
    #[error("Ingredient count must be positive")]
    EmptyIngredient,
    /// Tag has no registered members.
    #[error("Unknown ore tag: {0}")]
    UnknownTag(String),
    /// Shaped recipe without a pattern.
    #[error("Shaped recipe has no pattern")]
    MissingPattern,
    /// Pattern is neither 3x3 nor 5x5.
    #[error("Pattern must be 3x3 or 5x5, got {rows} rows of widths {widths:?}")]
    BadPatternSize {
        /// Number of rows.
        rows: usize,
        /// Width of each row.
        widths: Vec<usize>,
    },
    /// Pattern uses a character with no key.
    #[error("Pattern character '{0}' has no key")]
    UndefinedKey(char),
    /// Non-blank cell the tier does not expose.
    #[error("Cell ({x}, {y}) is not available on a {tier} altar")]
    UnusableCell {
        /// Grid column.
        x: u8,
        /// Grid row.
        y: u8,
        /// Tier name.
        tier: &'static str,
    },
    /// More shapeless ingredients than slots.
    #[error("{count} ingredients exceed {slots} slots")]
    TooManyIngredients {
        /// Ingredient count.
        count: usize,
        /// Slot count of the tier.
        slots: usize,
    },
}

#[derive(Debug, Clone)]
enum Ingredient {
    Stack(ItemStack),
    Tag { name: String, count: u32 },
}

impl Ingredient {
    fn resolve(&self, catalog: &ItemCatalog) -> Result<ItemStack, RecipeBuildError> {
        let stack = match self {
            Self::Stack(stack) => *stack,
            Self::Tag { name, count } => catalog
                .ore_dictionary()
                .ores(name)
                .first()
                .map(|stack| stack.with_count(*count))
                .ok_or_else(|| RecipeBuildError::UnknownTag(name.clone()))?,
        };

        if stack.is_empty() {
            return Err(RecipeBuildError::EmptyIngredient);
        }
        Ok(stack)
    }
}

/// Builder for [`AltarRecipe`].
#[derive(Debug, Clone)]
pub struct AltarRecipeBuilder {
    tier: AltarTier,
    output: ItemStack,
    shaped: bool,
    pattern: Vec<String>,
    keys: BTreeMap<char, Ingredient>,
    ingredients: Vec<Ingredient>,
    starlight: u32,
    duration: u32,
    constellation: Option<String>,
}

impl AltarRecipeBuilder {
    fn new(tier: AltarTier, output: ItemStack, shaped: bool) -> Self {
        Self {
            tier,
            output,
            shaped,
            pattern: Vec::new(),
            keys: BTreeMap::new(),
            ingredients: Vec::new(),
            starlight: 0,
            duration: DEFAULT_DURATION,
            constellation: None,
        }
    }

    /// Start a shaped recipe.
    #[must_use]
    pub fn shaped(tier: AltarTier, output: ItemStack) -> Self {
        Self::new(tier, output, true)
    }

    /// Start a shapeless recipe.
    #[must_use]
    pub fn shapeless(tier: AltarTier, output: ItemStack) -> Self {
        Self::new(tier, output, false)
    }

    /// Set the pattern rows.
    #[must_use]
    pub fn pattern<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pattern = rows.into_iter().map(Into::into).collect();
        self
    }

    /// Bind a pattern character to a stack.
    #[must_use]
    pub fn key(mut self, symbol: char, stack: ItemStack) -> Self {
        self.keys.insert(symbol, Ingredient::Stack(stack));
        self
    }

    /// Bind a pattern character to an ore tag.
    #[must_use]
    pub fn key_tag(mut self, symbol: char, tag: impl Into<String>, count: u32) -> Self {
        self.keys.insert(
            symbol,
            Ingredient::Tag {
                name: tag.into(),
                count,
            },
        );
        self
    }

    /// Add a shapeless ingredient.
    #[must_use]
    pub fn ingredient(mut self, stack: ItemStack) -> Self {
        self.ingredients.push(Ingredient::Stack(stack));
        self
    }

    /// Add a shapeless ingredient satisfied by any member of an ore tag.
    #[must_use]
    pub fn ingredient_tag(mut self, tag: impl Into<String>, count: u32) -> Self {
        self.ingredients.push(Ingredient::Tag {
            name: tag.into(),
            count,
        });
        self
    }

    /// Set the starlight cost.
    #[must_use]
    pub const fn starlight(mut self, cost: u32) -> Self {
        self.starlight = cost;
        self
    }

    /// Set the duration in ticks.
    #[must_use]
    pub const fn duration(mut self, ticks: u32) -> Self {
        self.duration = ticks;
        self
    }

    /// Set the required constellation.
    #[must_use]
    pub fn constellation(mut self, name: impl Into<String>) -> Self {
        self.constellation = Some(name.into());
        self
    }

    /// Resolve ingredients against the catalog and build the recipe.
    pub fn build(self, catalog: &ItemCatalog) -> Result<AltarRecipe, RecipeBuildError> {
        if self.output.is_empty() {
            return Err(RecipeBuildError::EmptyOutput);
        }
        if self.duration == 0 {
            return Err(RecipeBuildError::ZeroDuration);
        }

        let mut recipe = if self.shaped {
            let (inputs, width, height) = self.layout_pattern(catalog)?;
            AltarRecipe::shaped(self.tier, inputs, width, height, self.output)
        } else {
            let inputs = self.layout_ingredients(catalog)?;
            AltarRecipe::shapeless(self.tier, inputs, self.output)
        };

        recipe = recipe
            .with_starlight(self.starlight)
            .with_duration(self.duration);
        if let Some(constellation) = self.constellation {
            recipe = recipe.with_constellation(constellation);
        }

        debug!(
            "Built {} recipe {} ({} ingredients)",
            self.tier.display_name(),
            recipe.uid(),
            recipe.ingredient_count()
        );
        Ok(recipe)
    }

    fn layout_ingredients(
        &self,
        catalog: &ItemCatalog,
    ) -> Result<Vec<Option<ItemStack>>, RecipeBuildError> {
        let slots = self.tier.slot_count();
        if self.ingredients.is_empty() {
            return Err(RecipeBuildError::NoIngredients);
        }
        if self.ingredients.len() > slots {
            return Err(RecipeBuildError::TooManyIngredients {
                count: self.ingredients.len(),
                slots,
            });
        }

        let mut inputs = vec![None; slots];
        for (slot, ingredient) in inputs.iter_mut().zip(&self.ingredients) {
            *slot = Some(ingredient.resolve(catalog)?);
        }
        Ok(inputs)
    }

    fn layout_pattern(
        &self,
        catalog: &ItemCatalog,
    ) -> Result<(Vec<Option<ItemStack>>, u8, u8), RecipeBuildError> {
        if self.pattern.is_empty() {
            return Err(RecipeBuildError::MissingPattern);
        }

        let rows: Vec<Vec<char>> = self.pattern.iter().map(|row| row.chars().collect()).collect();
        let size = rows.len();
        if !(size == 3 || size == 5) || rows.iter().any(|row| row.len() != size) {
            return Err(RecipeBuildError::BadPatternSize {
                rows: size,
                widths: rows.iter().map(Vec::len).collect(),
            });
        }
        // 3x3 patterns sit on the inner grid
        let offset = if size == 3 { 1 } else { 0 };

        let mut inputs = vec![None; self.tier.slot_count()];
        let mut min = (u8::MAX, u8::MAX);
        let mut max = (0u8, 0u8);

        for (y, row) in rows.iter().enumerate() {
            for (x, &symbol) in row.iter().enumerate() {
                if symbol == '_' || symbol == ' ' {
                    continue;
                }
                let pos: GridPos = (x as u8 + offset, y as u8 + offset);
                let slot = self
                    .tier
                    .slot_at(pos)
                    .ok_or(RecipeBuildError::UnusableCell {
                        x: pos.0,
                        y: pos.1,
                        tier: self.tier.display_name(),
                    })?;
                let ingredient = self
                    .keys
                    .get(&symbol)
                    .ok_or(RecipeBuildError::UndefinedKey(symbol))?;

                inputs[slot] = Some(ingredient.resolve(catalog)?);
                min = (min.0.min(pos.0), min.1.min(pos.1));
                max = (max.0.max(pos.0), max.1.max(pos.1));
            }
        }

        if min.0 > max.0 {
            return Err(RecipeBuildError::NoIngredients);
        }
        Ok((inputs, max.0 - min.0 + 1, max.1 - min.1 + 1))
    }
}
