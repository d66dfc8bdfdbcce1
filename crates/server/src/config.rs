//! Server configuration loaded from the process environment.
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use pantheon_content::{ConfigLoader, Content, ContentFactory};

/// Configuration required to bootstrap the headless server.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Progression balance override (`progression.toml`).
    pub config_path: Option<PathBuf>,
    /// Directory holding `deities.ron`, `capabilities.ron` and `progression.toml`.
    pub content_dir: Option<PathBuf>,
    /// Directory world storage writes records to.
    pub data_dir: Option<PathBuf>,
    /// Directory for the log file; stderr only when unset.
    pub log_dir: Option<PathBuf>,
    pub event_buffer: Option<usize>,
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PANTHEON_CONFIG` - Progression balance TOML (default: content's `progression.toml`)
    /// - `PANTHEON_CONTENT_DIR` - Content directory (default: content compiled into the binary)
    /// - `PANTHEON_DATA_DIR` - World storage directory (default: platform-specific)
    /// - `PANTHEON_LOG_DIR` - Write `server.log` there in addition to stderr
    /// - `PANTHEON_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    pub fn from_env() -> Self {
        Self {
            config_path: read_path("PANTHEON_CONFIG"),
            content_dir: read_path("PANTHEON_CONTENT_DIR"),
            data_dir: read_path("PANTHEON_DATA_DIR"),
            log_dir: read_path("PANTHEON_LOG_DIR"),
            event_buffer: read_env::<usize>("PANTHEON_EVENT_BUFFER").map(|n| n.max(1)),
        }
    }

    /// World storage directory, falling back to the platform data directory.
    ///
    /// - Linux: `~/.local/share/pantheon/world` (or `$XDG_DATA_HOME/pantheon/world`)
    /// - macOS: `~/Library/Application Support/pantheon/world`
    /// - Fallback: `./world_data`
    pub fn world_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "pantheon")
                .map(|dirs| dirs.data_dir().join("world"))
                .unwrap_or_else(|| PathBuf::from("./world_data"))
        })
    }

    /// Load content from the configured directory or the built-in tables,
    /// then apply the balance override if one is set.
    pub fn load_content(&self) -> Result<Content> {
        let factory = match &self.content_dir {
            Some(dir) => ContentFactory::new(dir),
            None => ContentFactory::builtin(),
        };
        let mut content = factory.load_all().context("Failed to load pantheon content")?;

        if let Some(path) = &self.config_path {
            content.config = ConfigLoader::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
        }

        Ok(content)
    }
}

fn read_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
