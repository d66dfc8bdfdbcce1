//! File-based WorldStorage implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::{RepositoryError, Result, WorldStorage};

/// File-based implementation of [`WorldStorage`].
///
/// Each key is stored as its own file in `base_dir`.
///
/// # File Format
///
/// Keys are escaped into file names: ASCII letters, digits, `-`, `_` and `.`
/// are kept, `:` becomes `~`, and every other byte is written as `%XX`. So
/// `pantheon:player:ada` is stored as `pantheon~player~ada.bin`. Writes go to
/// a `.tmp` sibling first and are renamed into place.
pub struct FileWorldStorage {
    base_dir: PathBuf,
}

const EXTENSION: &str = "bin";

impl FileWorldStorage {
    /// Create a new file-based storage, creating `base_dir` if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", encode_key(key), EXTENSION))
    }
}

impl WorldStorage for FileWorldStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(RepositoryError::Io)?;
        tracing::debug!("Loaded {} ({} bytes) from {}", key, bytes.len(), path.display());
        Ok(Some(bytes))
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.key_path(key);
        let temp_path = path.with_extension("bin.tmp");

        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Stored {} to {}", key, path.display());
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.key_path(key).exists()
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted {}", key);
        }

        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(stem) = filename.strip_suffix(".bin")
                && let Some(key) = decode_key(stem)
                && key.starts_with(prefix)
            {
                keys.push(key);
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }
}

fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                encoded.push(byte as char)
            }
            b':' => encoded.push('~'),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

fn decode_key(stem: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(stem.len());
    let mut input = stem.bytes();
    while let Some(byte) = input.next() {
        match byte {
            b'~' => bytes.push(b':'),
            b'%' => {
                let high = (input.next()? as char).to_digit(16)?;
                let low = (input.next()? as char).to_digit(16)?;
                bytes.push((high * 16 + low) as u8);
            }
            other => bytes.push(other),
        }
    }
    String::from_utf8(bytes).ok()
}
