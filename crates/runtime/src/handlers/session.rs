//! Handler for players joining and leaving.

use super::{GameEventHandler, HandlerCriticality};
use crate::error::Result;
use crate::events::GameEvent;
use crate::world::World;

/// Loads a player's record on join and stores it on disconnect.
#[derive(Debug, Clone, Copy)]
pub struct SessionHandler;

impl GameEventHandler for SessionHandler {
    fn name(&self) -> &'static str {
        "session"
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn criticality(&self) -> HandlerCriticality {
        // A failed load leaves the player offline.
        HandlerCriticality::Critical
    }

    fn handle(&mut self, event: &GameEvent, world: &mut World) -> Result<()> {
        match event {
            GameEvent::PlayerJoined { player } => world.bring_online(player),
            GameEvent::PlayerDisconnected { player } => world.take_offline(player),
            _ => Ok(()),
        }
    }
}
