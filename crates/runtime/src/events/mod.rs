//! Topic-based event bus for runtime events.
//!
//! Game events flow in through [`GameEvent`]; everything the runtime observes
//! flows out on the [`EventBus`] grouped by [`Topic`].

mod bus;
mod game_event;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use game_event::GameEvent;
pub use types::{PersistenceEvent, SessionEvent};
