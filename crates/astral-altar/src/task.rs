//! In-flight altar crafts.
//!
//! An [`ActiveCraftingTask`] tracks one craft tick by tick:
//!
//! ```text
//!            starlight < cost
//!   Running ─────────────────▶ Paused
//!      │    ◀───────────────── │
//!      │     starlight >= cost
//!      │ elapsed >= total
//!      ▼
//!   Complete
//! ```
//!
//! Starvation pauses rather than aborts. Abort decisions belong to the altar
//! controller through [`ActiveCraftingTask::should_persist`].

use std::sync::Arc;

use astral_common::{CompoundTag, OwnerId, TagError, TagResult, TaskId};
use tracing::{debug, trace, warn};

use crate::altar::AltarAccess;
use crate::catalog::ItemCatalog;
use crate::item_stack::ItemStack;
use crate::recipe::AltarRecipe;
use crate::registry::AltarRecipeRegistry;

/// Crafting state, persisted by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CraftingState {
    /// Advancing one tick per update.
    #[default]
    Running = 0,
    /// Waiting for starlight.
    Paused = 1,
    /// Finished; output ready to collect.
    Complete = 2,
}

impl CraftingState {
    /// Persisted ordinal.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// State from a persisted ordinal.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Running),
            1 => Some(Self::Paused),
            2 => Some(Self::Complete),
            _ => None,
        }
    }
}

/// One craft in progress on an altar.
#[derive(Debug, Clone)]
pub struct ActiveCraftingTask {
    recipe: Arc<AltarRecipe>,
    owner: OwnerId,
    speed_divisor: u32,
    total_ticks: u32,
    elapsed_ticks: u32,
    state: CraftingState,
    task_id: TaskId,
}

impl ActiveCraftingTask {
    /// Start a task. The craft takes `duration / speed_divisor` ticks, at
    /// least one.
    #[must_use]
    pub fn new(recipe: Arc<AltarRecipe>, owner: OwnerId, speed_divisor: u32) -> Self {
        let speed_divisor = speed_divisor.max(1);
        let total_ticks = (recipe.duration() / speed_divisor).max(1);
        Self {
            recipe,
            owner,
            speed_divisor,
            total_ticks,
            elapsed_ticks: 0,
            state: CraftingState::Running,
            task_id: TaskId::new(),
        }
    }

    /// Recipe being crafted.
    #[must_use]
    pub fn recipe(&self) -> &Arc<AltarRecipe> {
        &self.recipe
    }

    /// Player that started the craft.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Unique task id.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Duration divisor applied at construction.
    #[must_use]
    pub const fn speed_divisor(&self) -> u32 {
        self.speed_divisor
    }

    /// Ticks needed to finish.
    #[must_use]
    pub const fn total_ticks(&self) -> u32 {
        self.total_ticks
    }

    /// Ticks advanced so far.
    #[must_use]
    pub const fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CraftingState {
        self.state
    }

    /// Completion ratio in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed_ticks as f32 / self.total_ticks as f32).min(1.0)
    }

    fn has_starlight<A: AltarAccess + ?Sized>(&self, altar: &A) -> bool {
        altar.stored_starlight() >= self.recipe.starlight_cost()
    }

    /// Advance one tick.
    ///
    /// Returns false once the craft is complete (and on every later call),
    /// true while the caller should keep ticking.
    pub fn update<A: AltarAccess + ?Sized>(&mut self, altar: &A) -> bool {
        match self.state {
            CraftingState::Complete => return false,
            CraftingState::Paused => {
                if !self.has_starlight(altar) {
                    return true;
                }
                debug!("Task {} resumed", self.task_id);
                self.state = CraftingState::Running;
            },
            CraftingState::Running => {},
        }

        if !self.has_starlight(altar) {
            debug!(
                "Task {} paused: {} starlight stored, {} needed",
                self.task_id,
                altar.stored_starlight(),
                self.recipe.starlight_cost()
            );
            self.state = CraftingState::Paused;
            return true;
        }

        self.elapsed_ticks += 1;
        trace!(
            "Task {} at {}/{}",
            self.task_id,
            self.elapsed_ticks,
            self.total_ticks
        );
        if self.elapsed_ticks >= self.total_ticks {
            debug!("Task {} complete", self.task_id);
            self.state = CraftingState::Complete;
            return false;
        }
        true
    }

    /// Whether the recipe still matches the altar's current inventory.
    #[must_use]
    pub fn does_recipe_match<A: AltarAccess + ?Sized>(
        &self,
        altar: &A,
        catalog: &ItemCatalog,
    ) -> bool {
        self.recipe.matches(altar.inventory_slots(), catalog)
    }

    /// Whether the altar should keep this task alive.
    ///
    /// Completed tasks always persist. Otherwise the task is dropped when
    /// its ingredients are gone, or when stored starlight is under half the
    /// cost and the task is not already paused.
    #[must_use]
    pub fn should_persist<A: AltarAccess + ?Sized>(&self, altar: &A, catalog: &ItemCatalog) -> bool {
        if self.state == CraftingState::Complete {
            return true;
        }
        if !self.does_recipe_match(altar, catalog) {
            return false;
        }

        let stored = u64::from(altar.stored_starlight());
        let cost = u64::from(self.recipe.starlight_cost());
        if stored * 2 < cost && self.state != CraftingState::Paused {
            return false;
        }
        true
    }

    /// Consume ingredients and starlight and return the produced stack.
    ///
    /// Removes a single unit from every slot the recipe has an ingredient
    /// in, whatever quantity the ingredient asks for.
    pub fn complete<A: AltarAccess + ?Sized>(&mut self, altar: &mut A) -> ItemStack {
        let output = self.recipe.output();

        for (index, required) in self.recipe.inputs().iter().enumerate() {
            if required.is_some() {
                altar.remove_one_from_slot(index);
            }
        }

        let cost = self.recipe.starlight_cost();
        if !altar.consume_starlight(cost) {
            warn!(
                "Task {} completed without enough starlight ({} needed, {} stored)",
                self.task_id,
                cost,
                altar.stored_starlight()
            );
        }

        self.elapsed_ticks = self.total_ticks;
        self.state = CraftingState::Complete;
        output
    }

    /// Persist everything but the recipe.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn serialize(&self) -> CompoundTag {
        let mut tag = CompoundTag::new();
        let (owner_most, owner_least) = self.owner.to_halves();
        let (task_most, task_least) = self.task_id.to_halves();

        tag.set_long("owner_most", owner_most as i64);
        tag.set_long("owner_least", owner_least as i64);
        tag.set_u32("total_ticks", self.total_ticks);
        tag.set_u32("speed_divisor", self.speed_divisor);
        tag.set_u32("elapsed_ticks", self.elapsed_ticks);
        tag.set_int("state", i32::from(self.state.id()));
        tag.set_long("task_most", task_most as i64);
        tag.set_long("task_least", task_least as i64);
        tag
    }

    /// Restore a task written by [`ActiveCraftingTask::serialize`].
    ///
    /// The recipe is looked up again from the altar's current inventory, so
    /// the task is lost when nothing matches any more. Malformed documents
    /// are logged and yield `None`.
    #[must_use]
    pub fn deserialize<A: AltarAccess + ?Sized>(
        tag: &CompoundTag,
        altar: &A,
        registry: &AltarRecipeRegistry,
    ) -> Option<Self> {
        let fields = match PersistedTask::read(tag) {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Discarding malformed crafting task: {}", e);
                return None;
            },
        };

        let Some(recipe) = registry.find_recipe(altar.inventory_slots(), altar.tier()) else {
            debug!(
                "Discarding crafting task {}: no recipe matches the altar",
                fields.task_id
            );
            return None;
        };

        Some(Self {
            recipe,
            owner: fields.owner,
            speed_divisor: fields.speed_divisor,
            total_ticks: fields.total_ticks,
            elapsed_ticks: fields.elapsed_ticks,
            state: fields.state,
            task_id: fields.task_id,
        })
    }
}

struct PersistedTask {
    owner: OwnerId,
    speed_divisor: u32,
    total_ticks: u32,
    elapsed_ticks: u32,
    state: CraftingState,
    task_id: TaskId,
}

impl PersistedTask {
    fn read(tag: &CompoundTag) -> TagResult<Self> {
        let state_id = tag.get_int("state")?;
        let state = u8::try_from(state_id)
            .ok()
            .and_then(CraftingState::from_id)
            .ok_or(TagError::OutOfRange {
                key: "state".to_string(),
                value: i64::from(state_id),
            })?;

        let total_ticks = tag.get_u32("total_ticks")?.max(1);
        let elapsed_ticks = tag.get_u32("elapsed_ticks")?;
        let finished = elapsed_ticks == total_ticks;
        if elapsed_ticks > total_ticks || (state == CraftingState::Complete && !finished) {
            return Err(TagError::OutOfRange {
                key: "elapsed_ticks".to_string(),
                value: i64::from(elapsed_ticks),
            });
        }

        Ok(Self {
            owner: OwnerId::from_halves(
                tag.get_long("owner_most")? as u64,
                tag.get_long("owner_least")? as u64,
            ),
            speed_divisor: tag.get_u32("speed_divisor")?.max(1),
            total_ticks,
            elapsed_ticks,
            state,
            task_id: TaskId::from_halves(
                tag.get_long("task_most")? as u64,
                tag.get_long("task_least")? as u64,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altar::AltarAccess;
    use crate::testing::*;
    use crate::tier::AltarTier;

    /// Minimal altar with a fixed slot array.
    struct TestAltar {
        tier: AltarTier,
        slots: Vec<Option<ItemStack>>,
        starlight: u32,
    }

    impl TestAltar {
        fn new(slots: Vec<Option<ItemStack>>, starlight: u32) -> Self {
            Self {
                tier: AltarTier::Discovery,
                slots,
                starlight,
            }
        }
    }

    impl AltarAccess for TestAltar {
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
            if let Some(slot) = self.slots.get_mut(index) {
                if let Some(stack) = slot.as_mut() {
                    stack.shrink(1);
                    if stack.is_empty() {
                        *slot = None;
                    }
                }
            }
        }
    }

    fn task(divisor: u32) -> ActiveCraftingTask {
        // 40 ticks, 100 starlight
        ActiveCraftingTask::new(Arc::new(constellation_paper_recipe()), OwnerId::new(), divisor)
    }

    fn registry() -> AltarRecipeRegistry {
        let mut registry = AltarRecipeRegistry::with_catalog(fixture_catalog());
        registry.init();
        registry.add_recipe(constellation_paper_recipe());
        registry
    }

    #[test]
    fn test_state_ids() {
        for state in [
            CraftingState::Running,
            CraftingState::Paused,
            CraftingState::Complete,
        ] {
            assert_eq!(CraftingState::from_id(state.id()), Some(state));
        }
        assert_eq!(CraftingState::Complete.id(), 2);
        assert_eq!(CraftingState::from_id(3), None);
    }

    #[test]
    fn test_total_ticks() {
        assert_eq!(task(1).total_ticks(), 40);
        assert_eq!(task(3).total_ticks(), 13);
        assert_eq!(task(0).speed_divisor(), 1);

        let quick = AltarRecipe::shapeless(
            AltarTier::Discovery,
            constellation_paper_slots(),
            stack(CONSTELLATION_PAPER, 1),
        )
        .with_duration(2);
        assert_eq!(
            ActiveCraftingTask::new(Arc::new(quick), OwnerId::new(), 5).total_ticks(),
            1
        );
    }

    #[test]
    fn test_runs_exactly_total_ticks() {
        let altar = TestAltar::new(constellation_paper_slots(), 1000);
        let mut task = task(2);
        let total = task.total_ticks();

        for tick in 1..total {
            assert!(task.update(&altar), "tick {tick} should continue");
            assert_eq!(task.state(), CraftingState::Running);
        }
        assert!(!task.update(&altar));
        assert_eq!(task.state(), CraftingState::Complete);
        assert_eq!(task.elapsed_ticks(), total);

        // complete is sticky
        assert!(!task.update(&altar));
        assert_eq!(task.elapsed_ticks(), total);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut altar = TestAltar::new(constellation_paper_slots(), 1000);
        let mut task = task(1);
        let total = task.total_ticks();
        let starved = 5;
        let mut calls = 0;

        for _ in 0..10 {
            assert!(task.update(&altar));
            calls += 1;
        }

        altar.starlight = 10;
        for _ in 0..starved {
            assert!(task.update(&altar));
            assert_eq!(task.state(), CraftingState::Paused);
            calls += 1;
        }
        assert_eq!(task.elapsed_ticks(), 10);

        altar.starlight = 1000;
        while task.update(&altar) {
            calls += 1;
        }
        calls += 1;
        assert_eq!(calls, total + starved);
        assert_eq!(task.state(), CraftingState::Complete);
    }

    #[test]
    fn test_resume_advances_same_tick() {
        let mut altar = TestAltar::new(constellation_paper_slots(), 0);
        let mut task = task(1);
        assert!(task.update(&altar));
        assert_eq!(task.state(), CraftingState::Paused);

        altar.starlight = 100;
        assert!(task.update(&altar));
        assert_eq!(task.state(), CraftingState::Running);
        assert_eq!(task.elapsed_ticks(), 1);
    }

    #[test]
    fn test_should_persist() {
        let catalog = fixture_catalog();
        let mut altar = TestAltar::new(constellation_paper_slots(), 100);
        let mut task = task(1);
        assert!(task.should_persist(&altar, &catalog));

        // exactly half the cost is tolerated
        altar.starlight = 50;
        assert!(task.should_persist(&altar, &catalog));

        altar.starlight = 49;
        assert!(!task.should_persist(&altar, &catalog));

        // paused tasks get to recover
        task.update(&altar);
        assert_eq!(task.state(), CraftingState::Paused);
        assert!(task.should_persist(&altar, &catalog));

        // missing ingredients abort
        altar.starlight = 100;
        altar.slots[8] = None;
        assert!(!task.does_recipe_match(&altar, &catalog));
        assert!(!task.should_persist(&altar, &catalog));
    }

    #[test]
    fn test_complete_always_persists() {
        let catalog = fixture_catalog();
        let mut altar = TestAltar::new(constellation_paper_slots(), 100);
        let mut task = task(1);
        while task.update(&altar) {}

        altar.slots = vec![None; 9];
        altar.starlight = 0;
        assert!(task.should_persist(&altar, &catalog));
    }

    #[test]
    fn test_complete_removes_one_per_slot() {
        let mut slots = constellation_paper_slots();
        slots[0] = Some(stack(PAPER, 3));
        let mut altar = TestAltar::new(slots, 150);
        let mut task = task(1);

        let output = task.complete(&mut altar);
        assert_eq!(output, stack(CONSTELLATION_PAPER, 1));
        assert_eq!(altar.slots[0], Some(stack(PAPER, 2)));
        assert_eq!(altar.slots[4], None);
        assert_eq!(altar.slots[8], None);
        assert_eq!(altar.starlight, 50);
        assert_eq!(task.state(), CraftingState::Complete);
    }

    #[test]
    fn test_complete_without_starlight_still_produces() {
        let mut altar = TestAltar::new(constellation_paper_slots(), 10);
        let mut task = task(1);
        assert_eq!(task.complete(&mut altar), stack(CONSTELLATION_PAPER, 1));
        assert_eq!(altar.starlight, 10);
        assert!(altar.slots.iter().all(Option::is_none));
    }

    #[test]
    fn test_persistence_round_trip() {
        let registry = registry();
        let altar = TestAltar::new(constellation_paper_slots(), 1000);
        let mut task = ActiveCraftingTask::new(
            Arc::clone(&registry.all_recipes()[0]),
            OwnerId::new(),
            2,
        );
        for _ in 0..7 {
            task.update(&altar);
        }

        let tag = task.serialize();
        assert_eq!(tag.len(), 8);
        let restored = ActiveCraftingTask::deserialize(&tag, &altar, &registry).expect("restores");

        assert_eq!(restored.owner(), task.owner());
        assert_eq!(restored.task_id(), task.task_id());
        assert_eq!(restored.elapsed_ticks(), 7);
        assert_eq!(restored.total_ticks(), task.total_ticks());
        assert_eq!(restored.speed_divisor(), 2);
        assert_eq!(restored.state(), task.state());
        assert_eq!(restored.recipe().uid(), task.recipe().uid());
    }

    #[test]
    fn test_deserialize_without_matching_recipe() {
        let registry = registry();
        let tag = task(1).serialize();
        let empty = TestAltar::new(vec![None; 9], 1000);
        assert!(ActiveCraftingTask::deserialize(&tag, &empty, &registry).is_none());
    }

    #[test]
    fn test_deserialize_malformed() {
        let registry = registry();
        let altar = TestAltar::new(constellation_paper_slots(), 1000);

        let mut tag = task(1).serialize();
        tag.remove("elapsed_ticks");
        assert!(ActiveCraftingTask::deserialize(&tag, &altar, &registry).is_none());

        let mut tag = task(1).serialize();
        tag.set_int("state", 9);
        assert!(ActiveCraftingTask::deserialize(&tag, &altar, &registry).is_none());

        let mut tag = task(1).serialize();
        tag.set_string("owner_most", "nope");
        assert!(ActiveCraftingTask::deserialize(&tag, &altar, &registry).is_none());

        let mut tag = task(1).serialize();
        tag.set_u32("elapsed_ticks", 41);
        assert!(ActiveCraftingTask::deserialize(&tag, &altar, &registry).is_none());

        let mut tag = task(1).serialize();
        tag.set_int("state", i32::from(CraftingState::Complete.id()));
        tag.set_u32("elapsed_ticks", 39);
        assert!(ActiveCraftingTask::deserialize(&tag, &altar, &registry).is_none());

        tag.set_u32("elapsed_ticks", 40);
        let restored = ActiveCraftingTask::deserialize(&tag, &altar, &registry).expect("finished task");
        assert_eq!(restored.state(), CraftingState::Complete);
    }

    #[test]
    fn test_completed_task_round_trip() {
        let registry = registry();
        let mut spent = TestAltar::new(constellation_paper_slots(), 1000);
        let mut task = task(1);
        task.complete(&mut spent);
        assert_eq!(task.elapsed_ticks(), task.total_ticks());

        let altar = TestAltar::new(constellation_paper_slots(), 1000);
        let restored =
            ActiveCraftingTask::deserialize(&task.serialize(), &altar, &registry).expect("restores");
        assert_eq!(restored.state(), CraftingState::Complete);
        assert!((restored.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_long_craft_round_trip() {
        let registry = registry();
        let altar = TestAltar::new(constellation_paper_slots(), 1000);
        let recipe = constellation_paper_recipe().with_duration(3_000_000_000);
        let mut task = ActiveCraftingTask::new(Arc::new(recipe), OwnerId::new(), 1);
        task.update(&altar);
        assert_eq!(task.total_ticks(), 3_000_000_000);

        let bytes = task.serialize().to_bytes().expect("encode");
        let tag = CompoundTag::from_bytes(&bytes).expect("decode");
        let restored = ActiveCraftingTask::deserialize(&tag, &altar, &registry).expect("restores");
        assert_eq!(restored.total_ticks(), 3_000_000_000);
        assert_eq!(restored.elapsed_ticks(), 1);
    }
}
