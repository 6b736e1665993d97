//! # Astral Altar
//!
//! Altar crafting engine.
//!
//! This crate provides:
//! - Item stacks, item definitions and the ore dictionary
//! - Altar tiers and their slot layouts
//! - Shaped and shapeless altar recipes with starlight costs
//! - Per-tier recipe collections and the recipe registry
//! - Tick-driven crafting tasks with pause/resume and persistence
//! - A reference altar controller
//! - TOML recipe files and engine configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod altar;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod item_stack;
pub mod loader;
pub mod recipe;
pub mod recipe_map;
pub mod registry;
pub mod task;
pub mod tier;

#[cfg(test)]
mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::altar::*;
    pub use crate::builder::*;
    pub use crate::catalog::*;
    pub use crate::config::*;
    pub use crate::item_stack::*;
    pub use crate::loader::*;
    pub use crate::recipe::*;
    pub use crate::recipe_map::*;
    pub use crate::registry::*;
    pub use crate::task::*;
    pub use crate::tier::*;
}

pub use prelude::*;
