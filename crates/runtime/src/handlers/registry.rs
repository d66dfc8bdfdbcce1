//! Handler registry for ordering and running game-event handlers.

use tracing::{debug, error};

use super::{
    AutosaveHandler, DeathHandler, GameEventHandler, HandlerCriticality, PassiveFavorHandler,
    SessionHandler,
};
use crate::error::{Result, RuntimeError};
use crate::events::GameEvent;
use crate::world::World;

/// Ordered set of [`GameEventHandler`]s.
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn GameEventHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Creates a registry with the default set of handlers.
    ///
    /// Default handlers include:
    /// - SessionHandler: loads and stores records on join and disconnect
    /// - DeathHandler: PvP rewards and the death penalty
    /// - PassiveFavorHandler: favor trickle on tick
    /// - AutosaveHandler: world save on `WorldSave` and every `autosave_interval_secs`
    pub fn default_handlers(autosave_interval_secs: f64) -> Self {
        let mut registry = Self::new();
        registry.register(SessionHandler);
        registry.register(DeathHandler);
        registry.register(PassiveFavorHandler);
        registry.register(AutosaveHandler::new(autosave_interval_secs));
        registry
    }

    /// Add a handler, keeping the registry sorted by priority.
    ///
    /// Handlers with equal priority keep registration order.
    pub fn register(&mut self, handler: impl GameEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
        self.handlers.sort_by_key(|h| h.priority());
    }

    /// Run every handler for `event`.
    ///
    /// # Error Handling
    ///
    /// Handler errors are handled based on criticality level:
    /// - `Critical`: Returns error immediately, skipping later handlers
    /// - `Important`: Logs error and continues to next handler
    /// - `Optional`: Logs at debug level and continues silently
    pub fn dispatch(&mut self, event: &GameEvent, world: &mut World) -> Result<()> {
        for handler in self.handlers.iter_mut() {
            if let Err(e) = handler.handle(event, world) {
                match handler.criticality() {
                    HandlerCriticality::Critical => {
                        return Err(RuntimeError::Handler {
                            handler: handler.name(),
                            source: Box::new(e),
                        });
                    }
                    HandlerCriticality::Important => {
                        error!(
                            target: "pantheon::runtime",
                            handler = handler.name(),
                            event = event.kind(),
                            error = %e,
                            "Handler failed"
                        );
                    }
                    HandlerCriticality::Optional => {
                        debug!(handler = handler.name(), error = %e, "Optional handler failed");
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns an iterator over handler names and priorities (for debugging).
    pub fn handlers(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.handlers.iter().map(|h| (h.name(), h.priority()))
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
