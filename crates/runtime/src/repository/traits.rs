//! Storage contract the runtime persists progression through.

use super::Result;

/// Opaque key/value world storage.
///
/// Keys are stable strings such as `pantheon:player:<id>`; values are whatever
/// bytes the caller encoded. Calls are synchronous and only made at
/// checkpoints (join, disconnect, world save), never concurrently with a
/// mutation of the same record.
pub trait WorldStorage: Send + Sync {
    /// Load the bytes stored under `key`, or `None` when absent.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace whatever is stored under `key`.
    fn store(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Check if a key exists
    fn exists(&self, key: &str) -> bool {
        matches!(self.load(key), Ok(Some(_)))
    }

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// List stored keys starting with `prefix`, sorted.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}
