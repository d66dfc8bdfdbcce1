//! High-level runtime orchestrator.
//!
//! The runtime owns the progression engine and its collaborators, routes game
//! events through the handler registry, and exposes a builder-based API for
//! hosts.

use std::sync::Arc;

use pantheon_content::Content;
use pantheon_core::{
    Clock, PlayerId, ProgressionEngine, ProgressionError, StatSink, SystemClock,
};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::command::Command;
use crate::error::{Collaborator, Result, RuntimeError};
use crate::events::{Event, EventBus, GameEvent, Topic};
use crate::handlers::HandlerRegistry;
use crate::notify::NotificationChannel;
use crate::repository::{ProgressionRepository, WorldStorage};
use crate::world::World;

/// Runtime configuration shared across the orchestrator and handlers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Capacity of each event-bus topic.
    pub event_buffer_size: usize,
    /// Restore the stored faction collection while building.
    pub load_factions_on_start: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            load_factions_on_start: true,
        }
    }
}

/// Main runtime that drives progression from game events.
///
/// Everything runs on the caller's thread: each [`dispatch`](Self::dispatch)
/// or [`execute`](Self::execute) finishes all mutation, cache invalidation
/// and notification before it returns.
pub struct Runtime {
    world: World,
    handlers: HandlerRegistry,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Run every handler for `event`, then deliver the engine's output.
    ///
    /// Output produced before a critical handler failed is still delivered.
    pub fn dispatch(&mut self, event: GameEvent) -> Result<()> {
        debug!(event = event.kind(), "Dispatching game event");
        let result = self.handlers.dispatch(&event, &mut self.world);
        self.world.flush();
        result
    }

    /// Run a player command and send the reply (or the failure reason) to them.
    pub fn execute(
        &mut self,
        player: &PlayerId,
        command: &Command,
    ) -> std::result::Result<String, ProgressionError> {
        let result = command.execute(self.world.engine_mut(), player);
        self.world.flush();
        match &result {
            Ok(reply) => self.world.notify(player, reply),
            Err(e) => {
                debug!(player = %player, error = %e, "Command rejected");
                self.world.notify(player, &e.to_string());
            }
        }
        result
    }

    /// Mutate the engine directly; engine output is delivered afterwards.
    pub fn with_engine<R>(&mut self, f: impl FnOnce(&mut ProgressionEngine) -> R) -> R {
        let result = f(self.world.engine_mut());
        self.world.flush();
        result
    }

    pub fn engine(&self) -> &ProgressionEngine {
        self.world.engine()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn bus(&self) -> &EventBus {
        self.world.bus()
    }

    /// Subscribe to one topic of runtime events.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.world.bus().subscribe(topic)
    }

    pub fn is_online(&self, player: &PlayerId) -> bool {
        self.world.is_online(player)
    }

    pub fn online_players(&self) -> Vec<PlayerId> {
        self.world.online_players()
    }

    /// Store the faction collection and every online player.
    pub fn save(&mut self) -> Result<(usize, usize)> {
        self.world.save()
    }

    /// Store every online player, take them offline, and store the factions.
    pub fn shutdown(mut self) -> Result<()> {
        for player in self.world.online_players() {
            self.world.take_offline(&player)?;
        }
        self.world.save()?;
        self.world.flush();
        info!("Runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
///
/// Content, world storage, a notification channel and a stat sink are
/// required; [`build`](Self::build) fails if any is missing.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: Option<Content>,
    storage: Option<Arc<dyn WorldStorage>>,
    notifier: Option<Box<dyn NotificationChannel>>,
    stat_sink: Option<Box<dyn StatSink + Send>>,
    clock: Arc<dyn Clock>,
    handlers: Option<HandlerRegistry>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: None,
            storage: None,
            notifier: None,
            stat_sink: None,
            clock: Arc::new(SystemClock),
            handlers: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required content (balance, deities, capability catalog)
    pub fn content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Set required world storage
    pub fn storage(mut self, storage: Arc<dyn WorldStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set required notification channel
    pub fn notifier(mut self, notifier: impl NotificationChannel + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Set required stat sink
    pub fn stat_sink(mut self, sink: impl StatSink + Send + 'static) -> Self {
        self.stat_sink = Some(Box::new(sink));
        self
    }

    /// Override the clock used for the faction switch cooldown (default: system time)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set custom handlers.
    ///
    /// If not provided, [`HandlerRegistry::default_handlers`] is used with the
    /// content's autosave interval.
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = Some(handlers);
        self
    }

    /// Build the runtime, restoring stored factions unless disabled.
    pub fn build(self) -> Result<Runtime> {
        let content = self
            .content
            .ok_or(RuntimeError::MissingCollaborator(Collaborator::Content))?;
        let storage = self
            .storage
            .ok_or(RuntimeError::MissingCollaborator(Collaborator::WorldStorage))?;
        let notifier = self.notifier.ok_or(RuntimeError::MissingCollaborator(
            Collaborator::NotificationChannel,
        ))?;
        let stat_sink = self
            .stat_sink
            .ok_or(RuntimeError::MissingCollaborator(Collaborator::StatSink))?;

        let handlers = self.handlers.unwrap_or_else(|| {
            HandlerRegistry::default_handlers(content.config.autosave_interval_secs)
        });

        let engine = ProgressionEngine::new(
            content.config,
            content.deities,
            content.catalog,
            self.clock,
        );
        let mut world = World::new(
            engine,
            ProgressionRepository::new(storage),
            notifier,
            stat_sink,
            EventBus::with_capacity(self.config.event_buffer_size),
        );

        let factions = if self.config.load_factions_on_start {
            world.load_factions()?
        } else {
            0
        };
        world.flush();

        info!(
            factions,
            handlers = handlers.len(),
            "Runtime built"
        );

        Ok(Runtime { world, handlers })
    }
}
