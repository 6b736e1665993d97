//! Headless altar simulation.
//!
//! Every registered recipe is crafted once on a fresh reference altar: the
//! altar is stocked with the recipe's own ingredients, collects starlight
//! until the craft can start, and is ticked to completion. Halfway through
//! the craft the altar is saved to bytes and restored, so each run also
//! exercises persistence.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use astral_altar::prelude::*;
use astral_common::{CompoundTag, OwnerId};
use tracing::{debug, info, warn};

/// Upper bound on ticks spent in one simulated craft.
pub const MAX_TICKS: u32 = 100_000;

/// Outcome of one simulated craft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimReport {
    /// Registry index of the recipe.
    pub recipe_index: Option<u32>,
    /// Altar tier.
    pub tier: AltarTier,
    /// Ticks spent collecting starlight before the craft started.
    pub charge_ticks: u32,
    /// Ticks from start to completion.
    pub craft_ticks: u32,
    /// Produced stack.
    pub output: ItemStack,
    /// Starlight left on the altar.
    pub starlight_left: u32,
}

/// Fresh altar stocked with the recipe's ingredients.
fn stocked_altar(recipe: &AltarRecipe, config: &EngineConfig) -> Altar {
    let mut altar = Altar::from_config(recipe.tier(), config);
    for (index, input) in recipe.inputs().iter().enumerate() {
        altar.set_slot(index, *input);
    }
    altar
}

/// Save the altar to the binary tag format and load it back.
fn reload(altar: &Altar, registry: &AltarRecipeRegistry) -> Result<Altar> {
    let bytes = altar.save().to_bytes().context("encoding altar")?;
    let tag = CompoundTag::from_bytes(&bytes).context("decoding altar")?;
    debug!("Altar snapshot is {} bytes", bytes.len());
    Altar::load(&tag, registry).context("loading altar")
}

/// Craft one recipe from scratch.
pub fn simulate(
    recipe: &Arc<AltarRecipe>,
    registry: &AltarRecipeRegistry,
    config: &EngineConfig,
) -> Result<SimReport> {
    if recipe.starlight_cost() > config.starlight_capacity(recipe.tier()) {
        bail!(
            "recipe {} costs {} starlight, more than a {} altar holds",
            recipe.uid(),
            recipe.starlight_cost(),
            recipe.tier().display_name()
        );
    }

    let mut altar = stocked_altar(recipe, config);
    let owner = OwnerId::new();

    let mut charge_ticks = 0;
    while !altar.try_start_craft(owner, registry) {
        if charge_ticks >= MAX_TICKS || config.starlight_per_tick == 0 {
            bail!("recipe {} never started", recipe.uid());
        }
        altar.receive_starlight(config.starlight_per_tick);
        charge_ticks += 1;
    }

    let started = altar.task().context("task missing after start")?;
    let halfway = started.total_ticks() / 2;
    if !Arc::ptr_eq(started.recipe(), recipe) {
        warn!(
            "Altar picked recipe {} instead of {}",
            started.recipe().uid(),
            recipe.uid()
        );
    }

    let mut craft_ticks = 0;
    let output = loop {
        if craft_ticks >= MAX_TICKS {
            bail!("recipe {} did not finish", recipe.uid());
        }
        if craft_ticks == halfway && altar.task().is_some() {
            altar = reload(&altar, registry)?;
        }

        altar.receive_starlight(config.starlight_per_tick);
        craft_ticks += 1;
        match altar.tick(registry) {
            TickOutcome::Crafting | TickOutcome::Paused => {},
            TickOutcome::Completed(stack) => break stack,
            TickOutcome::Aborted => bail!("recipe {} aborted", recipe.uid()),
            TickOutcome::Idle => bail!("recipe {} lost its task", recipe.uid()),
        }
    };

    Ok(SimReport {
        recipe_index: recipe.registry_index(),
        tier: recipe.tier(),
        charge_ticks,
        craft_ticks,
        output,
        starlight_left: altar.stored_starlight(),
    })
}

/// Craft every registered recipe, logging each result.
pub fn run_all(registry: &AltarRecipeRegistry, config: &EngineConfig) -> Vec<SimReport> {
    let mut reports = Vec::new();
    for recipe in registry.all_recipes() {
        match simulate(recipe, registry, config) {
            Ok(report) => {
                let name = registry
                    .catalog()
                    .item(report.output.item)
                    .map_or("<unknown>", |item| item.name.as_str());
                info!(
                    "{} #{:?}: {} x{} after {} charge + {} craft ticks ({} starlight left)",
                    report.tier.display_name(),
                    report.recipe_index,
                    name,
                    report.output.count,
                    report.charge_ticks,
                    report.craft_ticks,
                    report.starlight_left
                );
                reports.push(report);
            },
            Err(e) => warn!("Simulation failed: {e:#}"),
        }
    }
    reports
}
