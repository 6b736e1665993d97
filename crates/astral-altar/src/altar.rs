//! Altar controllers.
//!
//! [`AltarAccess`] is everything a crafting task needs from the block that
//! hosts it. [`Altar`] is a self-contained controller implementing it: slot
//! inventory, starlight storage, one active task and an output slot.

use astral_common::{CompoundTag, OwnerId, TagError, TagResult, TagValue};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::item_stack::ItemStack;
use crate::registry::AltarRecipeRegistry;
use crate::task::{ActiveCraftingTask, CraftingState};
use crate::tier::AltarTier;

/// Access to an altar's tier, starlight pool and input slots.
pub trait AltarAccess {
    /// Altar tier.
    fn tier(&self) -> AltarTier;

    /// Starlight currently stored.
    fn stored_starlight(&self) -> u32;

    /// Remove starlight. Returns false, removing nothing, when too little is
    /// stored.
    fn consume_starlight(&mut self, amount: u32) -> bool;

    /// Input slots, one entry per slot of the tier.
    fn inventory_slots(&self) -> &[Option<ItemStack>];

    /// Remove one item from a slot, emptying it when the count reaches zero.
    fn remove_one_from_slot(&mut self, index: usize);
}

/// Result of one [`Altar::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No task running.
    Idle,
    /// Task advanced.
    Crafting,
    /// Task is waiting for starlight.
    Paused,
    /// Task finished; the stack was placed in the output slot.
    Completed(ItemStack),
    /// Task was dropped.
    Aborted,
}

/// Reference altar controller.
#[derive(Debug, Clone)]
pub struct Altar {
    tier: AltarTier,
    slots: Vec<Option<ItemStack>>,
    starlight: u32,
    capacity: u32,
    speed_divisor: u32,
    task: Option<ActiveCraftingTask>,
    output: Option<ItemStack>,
}

impl Altar {
    /// Create an empty altar.
    #[must_use]
    pub fn new(tier: AltarTier, capacity: u32, speed_divisor: u32) -> Self {
        Self {
            tier,
            slots: vec![None; tier.slot_count()],
            starlight: 0,
            capacity,
            speed_divisor: speed_divisor.max(1),
            task: None,
            output: None,
        }
    }

    /// Create an empty altar with the configured tier settings.
    #[must_use]
    pub fn from_config(tier: AltarTier, config: &EngineConfig) -> Self {
        Self::new(
            tier,
            config.starlight_capacity(tier),
            config.speed_divisor(tier),
        )
    }

    /// Starlight capacity.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Active task, if any.
    #[must_use]
    pub fn task(&self) -> Option<&ActiveCraftingTask> {
        self.task.as_ref()
    }

    /// Output slot contents.
    #[must_use]
    pub const fn output(&self) -> Option<ItemStack> {
        self.output
    }

    /// Take the output slot contents.
    pub fn take_output(&mut self) -> Option<ItemStack> {
        self.output.take()
    }

    /// Contents of a slot.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<ItemStack> {
        self.slots.get(index).copied().flatten()
    }

    /// Replace a slot's contents. Returns false for an index the tier does
    /// not have.
    pub fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = stack.filter(|stack| !stack.is_empty());
                true
            },
            None => false,
        }
    }

    /// Add starlight up to the capacity, returning the amount accepted.
    pub fn receive_starlight(&mut self, amount: u32) -> u32 {
        let accepted = amount.min(self.capacity.saturating_sub(self.starlight));
        self.starlight += accepted;
        accepted
    }

    /// Start crafting whatever the slots match.
    ///
    /// Fails when a task is already running, the output slot is occupied,
    /// nothing matches, or too little starlight is stored.
    pub fn try_start_craft(&mut self, owner: OwnerId, registry: &AltarRecipeRegistry) -> bool {
        if self.task.is_some() || self.output.is_some() {
            return false;
        }

        let Some(recipe) = registry.find_recipe(&self.slots, self.tier) else {
            debug!("No {} recipe matches the altar", self.tier.display_name());
            return false;
        };

        if self.starlight < recipe.starlight_cost() {
            debug!(
                "Not enough starlight for recipe {}: {} < {}",
                recipe.uid(),
                self.starlight,
                recipe.starlight_cost()
            );
            return false;
        }

        let task = ActiveCraftingTask::new(recipe, owner, self.speed_divisor);
        info!(
            "Started task {} ({} ticks) for {}",
            task.task_id(),
            task.total_ticks(),
            owner
        );
        self.task = Some(task);
        true
    }

    /// Advance the active task by one tick.
    pub fn tick(&mut self, registry: &AltarRecipeRegistry) -> TickOutcome {
        let Some(mut task) = self.task.take() else {
            return TickOutcome::Idle;
        };

        if !task.should_persist(&*self, registry.catalog()) {
            info!("Aborted task {}", task.task_id());
            return TickOutcome::Aborted;
        }

        if task.update(&*self) {
            let outcome = if task.state() == CraftingState::Paused {
                TickOutcome::Paused
            } else {
                TickOutcome::Crafting
            };
            self.task = Some(task);
            return outcome;
        }

        let produced = task.complete(self);
        self.place_output(produced);
        info!("Finished task {}", task.task_id());
        TickOutcome::Completed(produced)
    }

    fn place_output(&mut self, produced: ItemStack) {
        self.output = Some(match self.output {
            Some(existing) if existing.item == produced.item && existing.damage == produced.damage => {
                existing.with_count(existing.count + produced.count)
            },
            _ => produced,
        });
    }

    /// Save the altar, including any active task.
    #[must_use]
    pub fn save(&self) -> CompoundTag {
        let mut tag = CompoundTag::new();
        tag.set_int("tier", i32::from(self.tier.level()));
        tag.set_u32("starlight", self.starlight);
        tag.set_u32("capacity", self.capacity);
        tag.set_u32("speed_divisor", self.speed_divisor);

        let slots = self
            .slots
            .iter()
            .map(|slot| TagValue::Compound(slot.map(|stack| stack.to_tag()).unwrap_or_default()))
            .collect();
        tag.set_list("slots", slots);

        if let Some(output) = self.output {
            tag.set_compound("output", output.to_tag());
        }
        if let Some(task) = &self.task {
            tag.set_compound("task", task.serialize());
        }
        tag
    }

    /// Load an altar written by [`Altar::save`].
    ///
    /// A saved task whose recipe no longer matches the slots is dropped.
    pub fn load(tag: &CompoundTag, registry: &AltarRecipeRegistry) -> TagResult<Self> {
        let level = tag.get_int("tier")?;
        let tier = u8::try_from(level)
            .ok()
            .and_then(AltarTier::from_level)
            .ok_or(TagError::OutOfRange {
                key: "tier".to_string(),
                value: i64::from(level),
            })?;

        let mut altar = Self::new(tier, tag.get_u32("capacity")?, tag.get_u32("speed_divisor")?);
        altar.starlight = tag.get_u32("starlight")?.min(altar.capacity);

        for (index, value) in tag.get_list("slots")?.iter().enumerate() {
            let TagValue::Compound(slot) = value else {
                return Err(TagError::WrongType {
                    key: "slots".to_string(),
                    expected: "compound",
                    found: value.kind(),
                });
            };
            if slot.is_empty() {
                continue;
            }
            if !altar.set_slot(index, Some(ItemStack::from_tag(slot)?)) {
                warn!("Ignoring saved slot {} beyond the {} altar", index, tier.display_name());
            }
        }

        if tag.contains("output") {
            altar.output = Some(ItemStack::from_tag(tag.get_compound("output")?)?);
        }
        if tag.contains("task") {
            altar.task = ActiveCraftingTask::deserialize(tag.get_compound("task")?, &altar, registry);
        }
        Ok(altar)
    }
}

impl AltarAccess for Altar {
    fn tier(&self) -> AltarTier {
        self.tier
    }

    fn stored_starlight(&self) -> u32 {
        self.starlight
    }

    fn consume_starlight(&mut self, amount: u32) -> bool {
        if self.starlight < amount {
            return false;
        }
        self.starlight -= amount;
        true
    }

    fn inventory_slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    fn remove_one_from_slot(&mut self, index: usize) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if let Some(stack) = slot.as_mut() {
            stack.shrink(1);
            if stack.is_empty() {
                *slot = None;
            }
        }
    }
}
