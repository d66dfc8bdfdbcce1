//! Content factory for building the pantheon from data files.

use std::path::{Path, PathBuf};

use pantheon_core::{CapabilityCatalog, DeityRelationshipGraph, ProgressionConfig};
use tracing::info;

use crate::loaders::{CapabilityLoader, ConfigLoader, DeityLoader, LoadResult};

const BUILTIN_DEITIES: &str = include_str!("../../data/deities.ron");
const BUILTIN_CAPABILITIES: &str = include_str!("../../data/capabilities.ron");
const BUILTIN_CONFIG: &str = include_str!("../../data/progression.toml");

/// Everything an engine needs at startup.
#[derive(Debug, Clone)]
pub struct Content {
    pub config: ProgressionConfig,
    pub deities: DeityRelationshipGraph,
    pub catalog: CapabilityCatalog,
}

enum Source {
    Builtin,
    Directory(PathBuf),
}

/// Content factory that loads pantheon content either from the embedded
/// files or from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── progression.toml
/// ├── deities.ron
/// └── capabilities.ron
/// ```
pub struct ContentFactory {
    source: Source,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Directory(data_dir.into()),
        }
    }

    /// Factory over the content compiled into this crate.
    pub fn builtin() -> Self {
        Self {
            source: Source::Builtin,
        }
    }

    /// Load progression balance from `progression.toml`.
    pub fn load_config(&self) -> LoadResult<ProgressionConfig> {
        match &self.source {
            Source::Builtin => ConfigLoader::parse(BUILTIN_CONFIG),
            Source::Directory(dir) => ConfigLoader::load(&dir.join("progression.toml")),
        }
    }

    /// Load deity descriptors from `deities.ron`.
    pub fn load_deities(&self) -> LoadResult<DeityRelationshipGraph> {
        match &self.source {
            Source::Builtin => DeityLoader::parse(BUILTIN_DEITIES),
            Source::Directory(dir) => DeityLoader::load(&dir.join("deities.ron")),
        }
    }

    /// Load the capability catalog from `capabilities.ron`.
    ///
    /// # Arguments
    ///
    /// * `deities` - Graph every capability's deity must be registered in
    pub fn load_capabilities(
        &self,
        deities: &DeityRelationshipGraph,
    ) -> LoadResult<CapabilityCatalog> {
        match &self.source {
            Source::Builtin => CapabilityLoader::parse(BUILTIN_CAPABILITIES, deities),
            Source::Directory(dir) => CapabilityLoader::load(&dir.join("capabilities.ron"), deities),
        }
    }

    /// Load config, deities and catalog in dependency order.
    pub fn load_all(&self) -> LoadResult<Content> {
        let config = self.load_config()?;
        let deities = self.load_deities()?;
        let catalog = self.load_capabilities(&deities)?;

        info!(
            target: "pantheon::content",
            source = %self.describe(),
            deities = deities.len(),
            capabilities = catalog.len(),
            "Loaded pantheon content"
        );

        Ok(Content {
            config,
            deities,
            catalog,
        })
    }

    /// Get the data directory path, if this factory reads from disk.
    pub fn data_dir(&self) -> Option<&Path> {
        match &self.source {
            Source::Builtin => None,
            Source::Directory(dir) => Some(dir),
        }
    }

    fn describe(&self) -> String {
        match &self.source {
            Source::Builtin => "builtin".to_string(),
            Source::Directory(dir) => dir.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantheon_core::{CapabilityId, DeityId, FavorRank, RelationshipKind, Scope};

    #[test]
    fn builtin_content_is_consistent() {
        let content = ContentFactory::builtin().load_all().unwrap();

        assert_eq!(content.deities.len(), 8);
        assert!(content.deities.asymmetric_pairs().is_empty());
        assert_eq!(content.catalog.len(), 48);
        assert!(content.catalog.validate().is_empty());
        assert_eq!(content.config.passive_favor_per_hour, 6.0);
    }

    #[test]
    fn builtin_relationships() {
        let deities = ContentFactory::builtin().load_deities().unwrap();
        let khoras = DeityId::from("khoras");
        assert_eq!(
            deities.relationship(&khoras, &DeityId::from("morthen")),
            RelationshipKind::Rival
        );
        assert_eq!(
            deities.relationship(&khoras, &DeityId::from("tharos")),
            RelationshipKind::Allied
        );
    }

    #[test]
    fn builtin_catalog_has_player_and_faction_tiers() {
        let factory = ContentFactory::builtin();
        let deities = factory.load_deities().unwrap();
        let catalog = factory.load_capabilities(&deities).unwrap();
        let khoras = DeityId::from("khoras");

        assert_eq!(catalog.list_for_deity(&khoras, Some(Scope::Player)).len(), 4);
        assert_eq!(catalog.list_for_deity(&khoras, Some(Scope::Faction)).len(), 2);

        let avatar = catalog.get(&CapabilityId::from("khoras_avatar_of_war")).unwrap();
        assert_eq!(avatar.required_favor_rank, FavorRank::Champion);
        assert_eq!(
            catalog.prerequisite_chain(&avatar.id).len(),
            3,
            "avatar depends on bloodlust, iron resolve and battle fury"
        );
    }

    #[test]
    fn loads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("progression.toml"), BUILTIN_CONFIG).unwrap();
        std::fs::write(dir.path().join("deities.ron"), BUILTIN_DEITIES).unwrap();
        std::fs::write(dir.path().join("capabilities.ron"), BUILTIN_CAPABILITIES).unwrap();

        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.data_dir(), Some(dir.path()));
        let content = factory.load_all().unwrap();
        assert_eq!(content.catalog.len(), 48);
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_config().unwrap_err();
        assert!(err.to_string().contains("progression.toml"));
    }
}
