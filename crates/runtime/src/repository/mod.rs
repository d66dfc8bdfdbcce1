//! World-storage adapters and the progression records stored through them.

mod error;
mod file;
mod memory;
mod records;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileWorldStorage;
pub use memory::InMemoryWorldStorage;
pub use records::{
    FACTIONS_KEY, PLAYER_KEY_PREFIX, ProgressionRepository, RECORD_VERSION, player_key,
};
pub use traits::WorldStorage;
