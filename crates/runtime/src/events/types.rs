//! Event types for the non-progression topics.

use pantheon_core::PlayerId;
use serde::{Deserialize, Serialize};

/// Events related to players entering and leaving the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Record loaded (or created) and modifiers applied.
    Online { player: PlayerId },
    /// Record stored and cached modifiers dropped.
    Offline { player: PlayerId },
}

/// Events related to world storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersistenceEvent {
    /// Faction collection and every online player stored.
    WorldSaved { players: usize, factions: usize },
    /// Faction collection restored at startup.
    FactionsLoaded { factions: usize },
}
