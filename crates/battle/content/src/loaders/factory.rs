//! Content factory for loading battle content from a data directory.

use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, HookLibrary};

use crate::loaders::{ConfigLoader, Encounter, EncounterLoader, LoadResult};

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── encounters/
///     ├── wolf_den.ron
///     └── crypt.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
    hooks: HookLibrary,
}

impl ContentFactory {
    /// Creates a factory using the stock hook library.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_hooks(data_dir, HookLibrary::builtin())
    }

    /// Creates a factory resolving hook names against `hooks`.
    pub fn with_hooks(data_dir: impl Into<PathBuf>, hooks: HookLibrary) -> Self {
        Self {
            data_dir: data_dir.into(),
            hooks,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load battle configuration from `config.toml`.
    ///
    /// A missing file yields the default configuration.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(target: "battle_content", path = %path.display(), "no config file, using defaults");
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the encounter `encounters/<name>.ron`.
    pub fn load_encounter(&self, name: &str) -> LoadResult<Encounter> {
        let path = self.data_dir.join("encounters").join(format!("{name}.ron"));
        EncounterLoader::load(&path, &self.hooks)
    }
}
