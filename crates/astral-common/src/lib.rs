//! # Astral Common
//!
//! Common types shared by the Astral altar engine crates:
//! - ID types (item types, recipes, crafting tasks, owners)
//! - Structured key-value documents for persistence
//! - Version information for persisted formats
//! - Common error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod tag;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::tag::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_generation() {
        let id1 = TaskId::new();
        let id2 = TaskId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_halves() {
        let owner = OwnerId::new();
        let (most, least) = owner.to_halves();
        assert_eq!(OwnerId::from_halves(most, least), owner);

        let fixed = TaskId::from_halves(1, 2);
        assert_eq!(fixed.to_halves(), (1, 2));
        assert_eq!(
            fixed.to_string(),
            "00000000-0000-0001-0000-000000000002"
        );
    }

    #[test]
    fn test_version_readability() {
        let v1 = SchemaVersion::new(1, 0, 0);
        let v2 = SchemaVersion::new(1, 1, 0);
        let v3 = SchemaVersion::new(2, 0, 0);

        assert!(v2.can_read(&v1));
        assert!(!v1.can_read(&v3));
        assert_eq!(SchemaVersion::from_bytes(v2.to_bytes()), v2);
    }

    #[test]
    fn test_version_parse() {
        assert_eq!(SchemaVersion::parse("1.2.3"), Some(SchemaVersion::new(1, 2, 3)));
        assert_eq!(SchemaVersion::parse("1.2"), None);
        assert_eq!(SchemaVersion::parse("1.2.3.4"), None);
        assert_eq!(SchemaVersion::parse("one.0.0"), None);
    }
}
