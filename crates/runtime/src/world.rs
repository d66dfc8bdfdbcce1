//! Mutable world state shared by the runtime and its handlers.

use std::collections::BTreeSet;

use pantheon_core::{PlayerId, ProgressionEngine, ProgressionEvent, StatSink};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::{Event, EventBus, PersistenceEvent, SessionEvent};
use crate::notify::NotificationChannel;
use crate::repository::ProgressionRepository;

/// Everything a handler may touch while reacting to a game event.
pub struct World {
    engine: ProgressionEngine,
    repository: ProgressionRepository,
    notifier: Box<dyn NotificationChannel>,
    sink: Box<dyn StatSink + Send>,
    bus: EventBus,
    online: BTreeSet<PlayerId>,
}

impl World {
    pub(crate) fn new(
        engine: ProgressionEngine,
        repository: ProgressionRepository,
        notifier: Box<dyn NotificationChannel>,
        sink: Box<dyn StatSink + Send>,
        bus: EventBus,
    ) -> Self {
        Self {
            engine,
            repository,
            notifier,
            sink,
            bus,
            online: BTreeSet::new(),
        }
    }

    pub fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    /// Mutable engine access. Callers must [`flush`](Self::flush) afterwards so
    /// notices, stat updates and bus events go out.
    pub fn engine_mut(&mut self) -> &mut ProgressionEngine {
        &mut self.engine
    }

    pub fn repository(&self) -> &ProgressionRepository {
        &self.repository
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn is_online(&self, player: &PlayerId) -> bool {
        self.online.contains(player)
    }

    /// Online players in id order.
    pub fn online_players(&self) -> Vec<PlayerId> {
        self.online.iter().cloned().collect()
    }

    /// Load a player's record, mark them online and apply their modifiers.
    ///
    /// A player without a stored record starts fresh.
    pub fn bring_online(&mut self, player: &PlayerId) -> Result<()> {
        if self.online.contains(player) {
            debug!(player = %player, "Player already online");
            return Ok(());
        }
        match self.repository.load_player(player)? {
            Some(snapshot) => self.engine.restore_player(snapshot),
            None => debug!(player = %player, "No stored progression, starting fresh"),
        }
        self.online.insert(player.clone());
        self.engine.apply_to_entity(player, self.sink.as_mut());
        info!(player = %player, "Player online");
        self.bus.publish(Event::Session(SessionEvent::Online {
            player: player.clone(),
        }));
        Ok(())
    }

    /// Store a player's record and drop them from the online set.
    pub fn take_offline(&mut self, player: &PlayerId) -> Result<()> {
        if !self.online.remove(player) {
            warn!(target: "pantheon::runtime", player = %player, "Disconnect for a player not online");
        }
        if let Some(snapshot) = self.engine.snapshot_player(player) {
            self.repository.save_player(&snapshot)?;
        }
        self.engine.forget_applied_modifiers(player);
        info!(player = %player, "Player offline");
        self.bus.publish(Event::Session(SessionEvent::Offline {
            player: player.clone(),
        }));
        Ok(())
    }

    /// Store the faction collection and every online player.
    ///
    /// Returns `(players, factions)` written.
    pub fn save(&mut self) -> Result<(usize, usize)> {
        let factions = self.engine.snapshot_factions();
        let faction_count = factions.factions.len();
        self.repository.save_factions(&factions)?;

        let mut players = 0;
        for player in &self.online {
            if let Some(snapshot) = self.engine.snapshot_player(player) {
                self.repository.save_player(&snapshot)?;
                players += 1;
            }
        }

        info!(players, factions = faction_count, "World saved");
        self.bus
            .publish(Event::Persistence(PersistenceEvent::WorldSaved {
                players,
                factions: faction_count,
            }));
        Ok((players, faction_count))
    }

    /// Restore the faction collection from storage, if one was saved.
    pub(crate) fn load_factions(&mut self) -> Result<usize> {
        let Some(snapshot) = self.repository.load_factions()? else {
            debug!("No stored factions");
            return Ok(0);
        };
        let restored = self.engine.restore_factions(snapshot);
        self.bus
            .publish(Event::Persistence(PersistenceEvent::FactionsLoaded {
                factions: restored,
            }));
        Ok(restored)
    }

    /// Send text to a player through the notification channel.
    pub fn notify(&self, player: &PlayerId, text: &str) {
        self.notifier.send_message(player, text);
    }

    /// Deliver everything the engine emitted since the last flush.
    ///
    /// Notices go to the notification channel, players whose modifiers may
    /// have changed get them re-applied if online, and every event is
    /// published on the progression topic. The engine has already
    /// invalidated its caches for these events.
    pub fn flush(&mut self) -> usize {
        let events = self.engine.drain_events();
        for event in &events {
            for notice in event.notices() {
                if self.online.contains(&notice.player) {
                    self.notifier.send_message(&notice.player, &notice.text);
                } else {
                    debug!(player = %notice.player, "Dropping notice for offline player");
                }
            }
            self.reapply_modifiers(event);
        }
        let count = events.len();
        for event in events {
            self.bus.publish(Event::Progression(event));
        }
        count
    }

    fn reapply_modifiers(&mut self, event: &ProgressionEvent) {
        if let Some(player) = event.affected_player() {
            if self.online.contains(player) {
                self.engine.apply_to_entity(player, self.sink.as_mut());
            }
            return;
        }
        if let ProgressionEvent::FactionCapabilityUnlocked { faction, .. } = event {
            let members: Vec<PlayerId> = self
                .engine
                .faction(faction)
                .map(|faction| {
                    faction
                        .members()
                        .iter()
                        .filter(|member| self.online.contains(*member))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            for member in &members {
                self.engine.apply_to_entity(member, self.sink.as_mut());
            }
        }
    }
}
