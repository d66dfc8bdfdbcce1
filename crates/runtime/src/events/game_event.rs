//! Game events delivered by the host.
//!
//! These are the inputs the runtime reacts to. Handlers registered with the
//! runtime turn each event into progression operations.

use pantheon_core::PlayerId;
use serde::{Deserialize, Serialize};

/// Occurrences reported by the game host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A player entered the world. Their record is loaded from storage.
    PlayerJoined { player: PlayerId },

    /// A player left the world. Their record is written to storage.
    PlayerDisconnected { player: PlayerId },

    /// A player died. `killer` is set only when another player landed the blow.
    PlayerDied {
        victim: PlayerId,
        #[serde(default)]
        killer: Option<PlayerId>,
    },

    /// Periodic tick with the game time elapsed since the previous one.
    Tick { delta_secs: f64 },

    /// The host is saving the world.
    WorldSave,
}

impl GameEvent {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::PlayerDisconnected { .. } => "player_disconnected",
            GameEvent::PlayerDied { .. } => "player_died",
            GameEvent::Tick { .. } => "tick",
            GameEvent::WorldSave => "world_save",
        }
    }
}
