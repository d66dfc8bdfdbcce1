//! Progression configuration loader.

use std::path::Path;

use pantheon_core::ProgressionConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for progression balance from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`ProgressionConfig::default`].
    pub fn load(path: &Path) -> LoadResult<ProgressionConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ProgressionConfig> {
        let config: ProgressionConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse progression config TOML: {}", e))?;

        if config.switch_cooldown_secs < 0 {
            anyhow::bail!("switch_cooldown_secs must not be negative");
        }
        if !config.passive_favor_per_hour.is_finite() || config.passive_favor_per_hour < 0.0 {
            anyhow::bail!("passive_favor_per_hour must be a non-negative number");
        }
        if !config.autosave_interval_secs.is_finite() || config.autosave_interval_secs < 0.0 {
            anyhow::bail!("autosave_interval_secs must be a non-negative number");
        }

        Ok(config)
    }
}
