//! ID types for items, recipes, crafting tasks and their owners.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemTypeId(u32);

impl ItemTypeId {
    /// Creates an item type ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Generates a 128-bit identifier newtype around [`Uuid`].
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Rebuilds an identifier from its two persisted halves,
            /// most significant first.
            #[must_use]
            pub const fn from_halves(most: u64, least: u64) -> Self {
                Self(Uuid::from_u64_pair(most, least))
            }

            /// Splits the identifier into (most significant, least significant) halves.
            #[must_use]
            pub const fn to_halves(self) -> (u64, u64) {
                self.0.as_u64_pair()
            }

            /// Returns the inner [`Uuid`].
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_uuid_id!(
    /// Identifier generated for every altar recipe at construction.
    RecipeUid
);

define_uuid_id!(
    /// Identifier of one in-flight crafting task.
    TaskId
);

define_uuid_id!(
    /// Opaque identifier of the actor that started a craft.
    OwnerId
);
