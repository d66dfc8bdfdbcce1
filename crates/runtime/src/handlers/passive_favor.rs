//! Handler for the passive favor trickle.

use super::{GameEventHandler, HandlerCriticality};
use crate::error::Result;
use crate::events::GameEvent;
use crate::world::World;

/// Awards passive favor to online, aligned players on every tick.
#[derive(Debug, Clone, Copy)]
pub struct PassiveFavorHandler;

impl GameEventHandler for PassiveFavorHandler {
    fn name(&self) -> &'static str {
        "passive_favor"
    }

    fn criticality(&self) -> HandlerCriticality {
        HandlerCriticality::Optional
    }

    fn handle(&mut self, event: &GameEvent, world: &mut World) -> Result<()> {
        if let GameEvent::Tick { delta_secs } = event {
            let online = world.online_players();
            world.engine_mut().tick(&online, *delta_secs);
        }
        Ok(())
    }
}
