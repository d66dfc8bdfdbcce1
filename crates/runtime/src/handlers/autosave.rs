//! Handler for explicit and periodic world saves.

use tracing::trace;

use super::GameEventHandler;
use crate::error::Result;
use crate::events::GameEvent;
use crate::world::World;

/// Saves the world on `WorldSave` and once `interval_secs` of ticks add up.
///
/// An interval of zero disables the periodic save.
#[derive(Debug, Clone)]
pub struct AutosaveHandler {
    interval_secs: f64,
    elapsed_secs: f64,
}

impl AutosaveHandler {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval_secs: if interval_secs.is_finite() {
                interval_secs.max(0.0)
            } else {
                0.0
            },
            elapsed_secs: 0.0,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }
}

impl GameEventHandler for AutosaveHandler {
    fn name(&self) -> &'static str {
        "autosave"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn handle(&mut self, event: &GameEvent, world: &mut World) -> Result<()> {
        match event {
            GameEvent::WorldSave => {
                self.elapsed_secs = 0.0;
                world.save()?;
            }
            GameEvent::Tick { delta_secs } if self.interval_secs > 0.0 => {
                if delta_secs.is_finite() && *delta_secs > 0.0 {
                    self.elapsed_secs += delta_secs;
                }
                if self.elapsed_secs >= self.interval_secs {
                    trace!(elapsed = self.elapsed_secs, "Autosave due");
                    self.elapsed_secs = 0.0;
                    world.save()?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
