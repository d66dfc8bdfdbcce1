//! Handlers that turn game events into progression operations.
//!
//! Each handler reacts to the [`GameEvent`]s it cares about and ignores the
//! rest. The runtime runs them in priority order (lower values first) and
//! flushes engine output once every handler has seen the event.

mod autosave;
mod death;
mod passive_favor;
mod registry;
mod session;

pub use autosave::AutosaveHandler;
pub use death::DeathHandler;
pub use passive_favor::PassiveFavorHandler;
pub use registry::HandlerRegistry;
pub use session::SessionHandler;

use crate::error::Result;
use crate::events::GameEvent;
use crate::world::World;

/// Criticality level for handler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerCriticality {
    /// Handler failure aborts dispatch and is returned to the host.
    Critical,
    /// Handler failure is logged as an error; later handlers still run.
    Important,
    /// Handler failure is logged at debug level.
    Optional,
}

/// Reacts to game events by driving the progression engine.
pub trait GameEventHandler: Send {
    /// Returns a human-readable name for this handler (used in logging).
    fn name(&self) -> &'static str;

    /// Execution order; lower values run first.
    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> HandlerCriticality {
        HandlerCriticality::Important
    }

    fn handle(&mut self, event: &GameEvent, world: &mut World) -> Result<()>;
}
