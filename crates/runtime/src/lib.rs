//! Runtime orchestration for pantheon progression.
//!
//! This crate wires the progression engine to the collaborators a game host
//! provides (world storage, a notification channel, an entity stat sink) and
//! turns host game events into progression. Consumers embed [`Runtime`], feed
//! it [`GameEvent`]s and player [`Command`]s, and subscribe to the
//! [`EventBus`] for everything that changed.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`handlers`] react to game events
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`repository`] provides world-storage adapters and persisted records
pub mod command;
pub mod error;
pub mod events;
pub mod handlers;
pub mod notify;
pub mod repository;
pub mod runtime;
pub mod stats;
pub mod world;

pub use command::Command;
pub use error::{Collaborator, Result, RuntimeError};
pub use events::{Event, EventBus, GameEvent, PersistenceEvent, SessionEvent, Topic};
pub use handlers::{
    AutosaveHandler, DeathHandler, GameEventHandler, HandlerCriticality, HandlerRegistry,
    PassiveFavorHandler, SessionHandler,
};
pub use notify::{InMemoryNotifier, LogNotifier, NotificationChannel};
pub use repository::{
    FileWorldStorage, InMemoryWorldStorage, ProgressionRepository, RepositoryError, WorldStorage,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use stats::InMemoryStatSink;
pub use world::World;
