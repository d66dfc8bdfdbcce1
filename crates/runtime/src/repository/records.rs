//! Persisted progression records and their storage keys.
//!
//! Records are bincode-encoded with a leading format version byte:
//!
//! ```text
//! [u8 version][bincode PlayerSnapshot | FactionsSnapshot]
//! ```

use std::sync::Arc;

use pantheon_core::{FactionsSnapshot, PlayerId, PlayerSnapshot};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{RepositoryError, Result, WorldStorage};

/// Prefix of every per-player key.
pub const PLAYER_KEY_PREFIX: &str = "pantheon:player:";

/// Key of the single faction collection record.
pub const FACTIONS_KEY: &str = "pantheon:factions";

/// Current record format.
pub const RECORD_VERSION: u8 = 1;

/// Storage key for one player's progression.
pub fn player_key(player: &PlayerId) -> String {
    format!("{PLAYER_KEY_PREFIX}{player}")
}

/// Typed access to progression records on top of a [`WorldStorage`].
#[derive(Clone)]
pub struct ProgressionRepository {
    storage: Arc<dyn WorldStorage>,
}

impl ProgressionRepository {
    pub fn new(storage: Arc<dyn WorldStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn WorldStorage> {
        &self.storage
    }

    pub fn load_player(&self, player: &PlayerId) -> Result<Option<PlayerSnapshot>> {
        self.load(&player_key(player))
    }

    pub fn save_player(&self, snapshot: &PlayerSnapshot) -> Result<()> {
        self.save(&player_key(&snapshot.player), snapshot)
    }

    pub fn load_factions(&self) -> Result<Option<FactionsSnapshot>> {
        self.load(FACTIONS_KEY)
    }

    pub fn save_factions(&self, snapshot: &FactionsSnapshot) -> Result<()> {
        self.save(FACTIONS_KEY, snapshot)
    }

    /// Every player with a stored record.
    pub fn stored_players(&self) -> Result<Vec<PlayerId>> {
        Ok(self
            .storage
            .keys(PLAYER_KEY_PREFIX)?
            .into_iter()
            .filter_map(|key| {
                key.strip_prefix(PLAYER_KEY_PREFIX)
                    .map(PlayerId::from)
            })
            .collect())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.storage.load(key)? else {
            return Ok(None);
        };
        decode(key, &bytes).map(Some)
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = encode(value)?;
        self.storage.store(key, &bytes)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = vec![RECORD_VERSION];
    bincode::serialize_into(&mut bytes, value)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    let Some((&version, body)) = bytes.split_first() else {
        return Err(RepositoryError::CorruptedData {
            key: key.to_owned(),
            reason: "empty record".to_owned(),
        });
    };
    if version != RECORD_VERSION {
        return Err(RepositoryError::VersionMismatch {
            key: key.to_owned(),
            found: version,
            expected: RECORD_VERSION,
        });
    }
    bincode::deserialize(body).map_err(|e| RepositoryError::CorruptedData {
        key: key.to_owned(),
        reason: e.to_string(),
    })
}
