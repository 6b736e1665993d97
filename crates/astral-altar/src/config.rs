//! Engine configuration.
//!
//! Loaded from a TOML file; missing or unreadable files fall back to the
//! defaults so a fresh install works without any setup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::tier::AltarTier;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "altar.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem failure.
    #[error("Config I/O error: {0}")]
    Io(#[from] io::Error),
    /// Could not encode the configuration.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for one altar tier.
///
/// Inside [`EngineConfig`] a tier table may set only some fields; the rest
/// come from [`TierSettings::defaults_for`] of that tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierSettings {
    /// Divides recipe durations for crafts on this tier.
    pub speed_divisor: u32,
    /// Maximum starlight a reference altar of this tier stores.
    pub starlight_capacity: u32,
}

impl TierSettings {
    const fn new(speed_divisor: u32, starlight_capacity: u32) -> Self {
        Self {
            speed_divisor,
            starlight_capacity,
        }
    }

    /// Defaults for a tier.
    #[must_use]
    pub const fn defaults_for(tier: AltarTier) -> Self {
        match tier {
            AltarTier::Discovery => Self::new(1, 1000),
            AltarTier::Attunement => Self::new(1, 2000),
            AltarTier::ConstellationCraft => Self::new(2, 4000),
            AltarTier::TraitCraft => Self::new(2, 8000),
            AltarTier::Brilliance => Self::new(3, 10_000),
        }
    }
}

/// Tier table as written in the file, before tier defaults are applied.
#[derive(Debug, Deserialize)]
struct TierOverrides {
    speed_divisor: Option<u32>,
    starlight_capacity: Option<u32>,
}

impl TierOverrides {
    fn apply(self, tier: AltarTier) -> TierSettings {
        let defaults = TierSettings::defaults_for(tier);
        TierSettings {
            speed_divisor: self.speed_divisor.unwrap_or(defaults.speed_divisor),
            starlight_capacity: self.starlight_capacity.unwrap_or(defaults.starlight_capacity),
        }
    }
}

macro_rules! tier_deserializer {
    ($name:ident, $tier:expr) => {
        fn $name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TierSettings, D::Error> {
            TierOverrides::deserialize(deserializer).map(|overrides| overrides.apply($tier))
        }
    };
}

tier_deserializer!(discovery_settings, AltarTier::Discovery);
tier_deserializer!(attunement_settings, AltarTier::Attunement);
tier_deserializer!(constellation_settings, AltarTier::ConstellationCraft);
tier_deserializer!(trait_settings, AltarTier::TraitCraft);
tier_deserializer!(brilliance_settings, AltarTier::Brilliance);

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Starlight a reference altar collects each tick.
    pub starlight_per_tick: u32,
    /// Recipe files to load at startup.
    pub recipe_files: Vec<PathBuf>,

    // Tiers
    /// Discovery altar settings.
    #[serde(deserialize_with = "discovery_settings")]
    pub discovery: TierSettings,
    /// Attunement altar settings.
    #[serde(deserialize_with = "attunement_settings")]
    pub attunement: TierSettings,
    /// Constellation altar settings.
    #[serde(deserialize_with = "constellation_settings")]
    pub constellation_craft: TierSettings,
    /// Trait altar settings.
    #[serde(deserialize_with = "trait_settings")]
    pub trait_craft: TierSettings,
    /// Brilliance altar settings.
    #[serde(deserialize_with = "brilliance_settings")]
    pub brilliance: TierSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starlight_per_tick: 20,
            recipe_files: Vec::new(),

            discovery: TierSettings::defaults_for(AltarTier::Discovery),
            attunement: TierSettings::defaults_for(AltarTier::Attunement),
            constellation_craft: TierSettings::defaults_for(AltarTier::ConstellationCraft),
            trait_craft: TierSettings::defaults_for(AltarTier::TraitCraft),
            brilliance: TierSettings::defaults_for(AltarTier::Brilliance),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file, falling back to defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Settings for a tier.
    #[must_use]
    pub const fn tier(&self, tier: AltarTier) -> &TierSettings {
        match tier {
            AltarTier::Discovery => &self.discovery,
            AltarTier::Attunement => &self.attunement,
            AltarTier::ConstellationCraft => &self.constellation_craft,
            AltarTier::TraitCraft => &self.trait_craft,
            AltarTier::Brilliance => &self.brilliance,
        }
    }

    /// Speed divisor for a tier (never zero).
    #[must_use]
    pub fn speed_divisor(&self, tier: AltarTier) -> u32 {
        self.tier(tier).speed_divisor.max(1)
    }

    /// Starlight capacity for a tier.
    #[must_use]
    pub const fn starlight_capacity(&self, tier: AltarTier) -> u32 {
        self.tier(tier).starlight_capacity
    }
}
