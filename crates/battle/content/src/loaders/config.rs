//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`BattleConfig::default`]. The result is
    /// validated before it is returned.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config data from a TOML string.
    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid battle config: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_partial_config_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 42\nimpact_timeout = 1.5").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.impact_timeout, Some(1.5));
        assert_eq!(
            config.journal_capacity,
            BattleConfig::default().journal_capacity
        );
        assert!(config.auto_advance_enemy_turn);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = ConfigLoader::parse("ambush_base_chance = 250").unwrap_err();
        assert!(err.to_string().contains("Invalid battle config"));

        let err = ConfigLoader::parse("impact_timeout = -1.0").unwrap_err();
        assert!(err.to_string().contains("Invalid battle config"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ConfigLoader::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
