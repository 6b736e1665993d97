//! # Astral Sim
//!
//! Headless driver for the altar engine.
//!
//! Loads the engine configuration and every configured recipe file, then
//! crafts each registered recipe on a reference altar and logs the result.
//!
//! Usage: `astral-sim [config.toml]`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod sim;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use astral_altar::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Recipe directory used when the configuration lists no files.
const DEFAULT_RECIPE_PATH: &str = "assets/recipes";

/// All `.toml` files directly inside a directory, sorted by name.
/// Subdirectories are not searched.
fn recipe_files_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read recipe directory {}: {e}", dir.display());
            return Vec::new();
        },
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort();
    files
}

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("astral=info".parse()?))
        .init();

    info!("Astral altar simulator starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let config = EngineConfig::load_from(&config_path);

    let files = if config.recipe_files.is_empty() {
        recipe_files_in(Path::new(DEFAULT_RECIPE_PATH))
    } else {
        config.recipe_files.clone()
    };

    let mut registry = AltarRecipeRegistry::new();
    registry.init();
    let mut loader = RecipeLoader::new();
    loader.load_all(&files, &mut registry);

    let stats = loader.stats();
    info!(
        "Loaded {} recipes from {} files ({} failed)",
        stats.recipes_loaded, stats.files_loaded, stats.files_failed
    );
    if registry.recipe_count() == 0 {
        bail!("no recipes loaded");
    }

    let reports = sim::run_all(&registry, &config);
    info!(
        "Simulated {}/{} recipes",
        reports.len(),
        registry.recipe_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_files_in_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b.toml", "a.toml", "notes.txt"] {
            fs::write(dir.path().join(name), "").expect("write file");
        }
        fs::create_dir(dir.path().join("nested.toml")).expect("create dir");
        fs::write(dir.path().join("nested.toml").join("c.toml"), "").expect("write file");

        let files = recipe_files_in(dir.path());
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["a.toml", "b.toml"]);
    }

    #[test]
    fn test_missing_recipe_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(recipe_files_in(&dir.path().join("absent")).is_empty());
    }
}
