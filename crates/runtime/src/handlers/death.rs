//! Handler for player deaths.

use pantheon_core::KillOutcome;
use tracing::debug;

use super::GameEventHandler;
use crate::error::Result;
use crate::events::GameEvent;
use crate::world::World;

/// Rewards the killer and applies the victim's death penalty.
///
/// This is the only place a death is turned into progression, so each death
/// costs the victim exactly one penalty.
#[derive(Debug, Clone, Copy)]
pub struct DeathHandler;

impl GameEventHandler for DeathHandler {
    fn name(&self) -> &'static str {
        "death"
    }

    fn priority(&self) -> i32 {
        -50
    }

    fn handle(&mut self, event: &GameEvent, world: &mut World) -> Result<()> {
        let GameEvent::PlayerDied { victim, killer } = event else {
            return Ok(());
        };

        let engine = world.engine_mut();
        if let Some(killer) = killer {
            let outcome = engine.record_kill(killer, victim);
            if outcome == KillOutcome::SelfInflicted {
                debug!(player = %victim, "Self-inflicted death, no reward");
            }
        }
        engine.record_death(victim);
        Ok(())
    }
}
