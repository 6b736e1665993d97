//! Altar tiers and their slot layouts.

use serde::{Deserialize, Serialize};

/// Position of a slot on the 5x5 altar grid, as (x, y).
pub type GridPos = (u8, u8);

/// Slot index to grid position. The inner 3x3 comes first, then the corners,
/// then the cells flanking the corners, then the edge midpoints. Each tier
/// uses a prefix of this table.
#[rustfmt::skip]
const SLOT_LAYOUT: [GridPos; 25] = [
    (1, 1), (2, 1), (3, 1),
    (1, 2), (2, 2), (3, 2),
    (1, 3), (2, 3), (3, 3),
    (0, 0), (4, 0), (0, 4), (4, 4),
    (1, 0), (3, 0), (0, 1), (4, 1), (0, 3), (4, 3), (1, 4), (3, 4),
    (2, 0), (0, 2), (4, 2), (2, 4),
];

/// Altar power level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AltarTier {
    /// Starter altar.
    #[default]
    Discovery,
    /// Second tier.
    Attunement,
    /// Third tier.
    ConstellationCraft,
    /// Fourth tier.
    TraitCraft,
    /// Final tier.
    Brilliance,
}

impl AltarTier {
    /// Get all tiers in order.
    #[must_use]
    pub fn all() -> &'static [AltarTier] {
        &[
            Self::Discovery,
            Self::Attunement,
            Self::ConstellationCraft,
            Self::TraitCraft,
            Self::Brilliance,
        ]
    }

    /// Get display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Discovery => "Discovery",
            Self::Attunement => "Attunement",
            Self::ConstellationCraft => "Constellation Craft",
            Self::TraitCraft => "Trait Craft",
            Self::Brilliance => "Brilliance",
        }
    }

    /// Get the tier level (0-4).
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Discovery => 0,
            Self::Attunement => 1,
            Self::ConstellationCraft => 2,
            Self::TraitCraft => 3,
            Self::Brilliance => 4,
        }
    }

    /// Tier for a level.
    #[must_use]
    pub fn from_level(level: u8) -> Option<Self> {
        Self::all().get(level as usize).copied()
    }

    /// Get next tier (if any).
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_level(self.level() + 1)
    }

    /// Number of accessible input slots.
    #[must_use]
    pub const fn slot_count(self) -> usize {
        match self {
            Self::Discovery => 9,
            Self::Attunement => 13,
            Self::ConstellationCraft => 21,
            Self::TraitCraft | Self::Brilliance => 25,
        }
    }

    /// Grid positions of this tier's slots, indexed by slot.
    #[must_use]
    pub fn slot_layout(self) -> &'static [GridPos] {
        &SLOT_LAYOUT[..self.slot_count()]
    }

    /// Slot index at a grid position, if the tier exposes it.
    #[must_use]
    pub fn slot_at(self, pos: GridPos) -> Option<usize> {
        self.slot_layout().iter().position(|&p| p == pos)
    }
}
