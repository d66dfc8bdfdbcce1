//! Progression engine facade.
//!
//! The [`ProgressionEngine`] owns every store and is the only way the runtime
//! mutates progression state. Each mutating call ends by draining the store
//! outboxes, invalidating the affected modifier cache entries, and queueing the
//! events for [`ProgressionEngine::drain_events`]. A caller that reads
//! modifiers after any call therefore never sees a stale map.

mod factions;
mod persistence;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::capability::{Capability, CapabilityCatalog, Ineligibility, Scope, StatDeltas};
use crate::clock::Clock;
use crate::combat::{CombatRewardCalculator, CombatStores, KillOutcome};
use crate::config::ProgressionConfig;
use crate::deity::DeityRelationshipGraph;
use crate::error::ProgressionError;
use crate::events::ProgressionEvent;
use crate::faction::{
    Faction, FactionMembershipDirectory, FactionProgression, FactionProgressionStore, FactionView,
};
use crate::ids::{CapabilityId, FactionId, PlayerId};
use crate::modifiers::{ModifierResolutionCache, ModifierSources, StatSink};
use crate::player::{PlayerProgression, PlayerProgressionStore};
use crate::rank::{FavorRank, PrestigeRank, RankProgress};

/// A catalog entry together with whether the player could unlock it now.
#[derive(Clone, Debug, PartialEq)]
pub struct CapabilityListing<'a> {
    pub capability: &'a Capability,
    pub status: Result<(), Ineligibility>,
}

impl CapabilityListing<'_> {
    pub fn is_available(&self) -> bool {
        self.status.is_ok()
    }
}

pub struct ProgressionEngine {
    config: ProgressionConfig,
    deities: DeityRelationshipGraph,
    catalog: CapabilityCatalog,
    directory: FactionMembershipDirectory,
    players: PlayerProgressionStore,
    factions: FactionProgressionStore,
    modifiers: ModifierResolutionCache,
    combat: CombatRewardCalculator,
    clock: Arc<dyn Clock>,
    events: Vec<ProgressionEvent>,
}

impl ProgressionEngine {
    pub fn new(
        config: ProgressionConfig,
        deities: DeityRelationshipGraph,
        catalog: CapabilityCatalog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        debug!(
            deities = deities.len(),
            capabilities = catalog.len(),
            "Progression engine created"
        );
        Self {
            players: PlayerProgressionStore::new(&config),
            combat: CombatRewardCalculator::new(&config),
            config,
            deities,
            catalog,
            directory: FactionMembershipDirectory::new(),
            factions: FactionProgressionStore::new(),
            modifiers: ModifierResolutionCache::new(),
            clock,
            events: Vec::new(),
        }
    }

    // -- Read access --

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn deities(&self) -> &DeityRelationshipGraph {
        &self.deities
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub fn directory(&self) -> &FactionMembershipDirectory {
        &self.directory
    }

    pub fn players(&self) -> &PlayerProgressionStore {
        &self.players
    }

    pub fn faction_progressions(&self) -> &FactionProgressionStore {
        &self.factions
    }

    pub fn player(&self, player: &PlayerId) -> Option<&PlayerProgression> {
        self.players.get(player)
    }

    pub fn faction(&self, faction: &FactionId) -> Option<&Faction> {
        self.directory.get_by_id(faction)
    }

    pub fn faction_of(&self, player: &PlayerId) -> Option<&Faction> {
        self.directory.get_by_player(player)
    }

    pub fn faction_progression(&self, faction: &FactionId) -> Option<&FactionProgression> {
        self.factions.get(faction)
    }

    pub fn player_progress(&self, player: &PlayerId) -> RankProgress<FavorRank> {
        self.players.progress(player)
    }

    pub fn faction_progress(&self, faction: &FactionId) -> RankProgress<PrestigeRank> {
        self.factions.progress(faction)
    }

    pub fn can_switch(&self, player: &PlayerId) -> bool {
        self.players.can_switch(player, self.clock.now())
    }

    pub fn switch_cooldown_remaining(&self, player: &PlayerId) -> Option<chrono::TimeDelta> {
        self.players
            .switch_cooldown_remaining(player, self.clock.now())
    }

    /// Take every event produced since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Favor and prestige --

    pub fn add_favor(&mut self, player: &PlayerId, amount: u32, reason: &str) {
        self.players.add_favor(player, amount, reason);
        self.settle();
    }

    pub fn add_fractional_favor(&mut self, player: &PlayerId, amount: f64, reason: &str) -> u32 {
        let awarded = self.players.add_fractional_favor(player, amount, reason);
        self.settle();
        awarded
    }

    pub fn remove_favor(&mut self, player: &PlayerId, amount: u32, reason: &str) -> bool {
        let removed = self.players.remove_favor(player, amount, reason);
        self.settle();
        removed
    }

    pub fn add_prestige(&mut self, faction: &FactionId, amount: u32, reason: &str) {
        self.factions
            .add_prestige(&self.directory, faction, amount, reason);
        self.settle();
    }

    // -- Capabilities --

    /// Whether `player` could unlock `capability` right now.
    ///
    /// Faction-scope capabilities are judged against the player's faction.
    pub fn eligibility(
        &self,
        player: &PlayerId,
        capability: &CapabilityId,
    ) -> Result<(), Ineligibility> {
        let fallback;
        let record = match self.players.get(player) {
            Some(record) => record,
            None => {
                fallback = PlayerProgression::new(player.clone());
                &fallback
            }
        };
        self.catalog
            .eligibility(record, self.faction_view(record), capability)
    }

    /// Catalog entries of the player's deity, annotated with eligibility.
    pub fn available_capabilities(&self, player: &PlayerId) -> Vec<CapabilityListing<'_>> {
        let Some(deity) = self.players.get(player).and_then(|record| record.active_deity())
        else {
            return Vec::new();
        };
        self.catalog
            .list_for_deity(deity, None)
            .into_iter()
            .map(|capability| CapabilityListing {
                capability,
                status: self.eligibility(player, &capability.id),
            })
            .collect()
    }

    /// Unlock a player-scope capability after checking eligibility.
    pub fn unlock_player_capability(
        &mut self,
        player: &PlayerId,
        capability: &CapabilityId,
    ) -> Result<(), ProgressionError> {
        self.check_unlock(player, capability, Scope::Player)?;
        self.players.unlock_capability(player, capability);
        self.settle();
        Ok(())
    }

    /// Unlock a faction-scope capability for the requester's faction.
    pub fn unlock_faction_capability(
        &mut self,
        requester: &PlayerId,
        capability: &CapabilityId,
    ) -> Result<(), ProgressionError> {
        self.check_unlock(requester, capability, Scope::Faction)?;
        let faction = self
            .directory
            .get_by_player(requester)
            .map(|faction| faction.id().clone())
            .ok_or_else(|| ProgressionError::NotInFaction(requester.clone()))?;
        self.factions.unlock_capability(&faction, capability);
        self.settle();
        Ok(())
    }

    fn check_unlock(
        &self,
        player: &PlayerId,
        capability: &CapabilityId,
        scope: Scope,
    ) -> Result<(), ProgressionError> {
        let ineligible = |reason| ProgressionError::Ineligible {
            capability: capability.clone(),
            reason,
        };
        match self.catalog.get(capability) {
            Some(found) if found.scope != scope => Err(ineligible(Ineligibility::NotFound)),
            _ => self.eligibility(player, capability).map_err(ineligible),
        }
    }

    // -- Modifiers --

    pub fn player_modifiers(&mut self, player: &PlayerId) -> StatDeltas {
        let (cache, sources) = self.modifier_parts();
        cache.player_modifiers(sources, player)
    }

    pub fn faction_modifiers(&mut self, faction: &FactionId) -> StatDeltas {
        let (cache, sources) = self.modifier_parts();
        cache.faction_modifiers(sources, faction)
    }

    pub fn combined_modifiers(&mut self, player: &PlayerId) -> StatDeltas {
        let (cache, sources) = self.modifier_parts();
        cache.combined_modifiers(sources, player)
    }

    pub fn apply_to_entity(&mut self, player: &PlayerId, sink: &mut dyn StatSink) {
        let (cache, sources) = self.modifier_parts();
        cache.apply_to_entity(sources, player, sink);
    }

    pub fn refresh_faction_members(&mut self, faction: &FactionId, sink: &mut dyn StatSink) -> usize {
        let (cache, sources) = self.modifier_parts();
        cache.refresh_faction_members(sources, faction, sink)
    }

    /// Drop cached modifiers and applied-key tracking for a player going offline.
    pub fn forget_applied_modifiers(&mut self, player: &PlayerId) {
        self.modifiers.forget_player(player);
    }

    // -- Combat and time --

    pub fn record_kill(&mut self, attacker: &PlayerId, victim: &PlayerId) -> KillOutcome {
        let outcome = self.combat.on_kill(
            CombatStores {
                players: &mut self.players,
                factions: &mut self.factions,
                directory: &self.directory,
                deities: &self.deities,
            },
            attacker,
            victim,
        );
        self.settle();
        outcome
    }

    pub fn record_death(&mut self, player: &PlayerId) -> u32 {
        let lost = self.combat.on_death(&mut self.players, player);
        self.settle();
        lost
    }

    /// Trickle passive favor to the given online players.
    ///
    /// Only players in a faction earn it. Returns the whole favor awarded.
    pub fn tick(&mut self, online: &[PlayerId], delta_secs: f64) -> u32 {
        let per_hour = self.config.passive_favor_per_hour;
        if per_hour <= 0.0 || !delta_secs.is_finite() || delta_secs <= 0.0 {
            return 0;
        }
        let amount = per_hour * delta_secs / 3600.0;
        let mut awarded: u32 = 0;
        for player in online {
            if self.players.get(player).is_some_and(PlayerProgression::is_aligned) {
                let gained = self
                    .players
                    .add_fractional_favor(player, amount, "passive favor");
                awarded = awarded.saturating_add(gained);
            }
        }
        trace!(players = online.len(), delta_secs, awarded, "Passive favor tick");
        self.settle();
        awarded
    }

    // -- Internals --

    fn modifier_parts(&mut self) -> (&mut ModifierResolutionCache, ModifierSources<'_>) {
        (
            &mut self.modifiers,
            ModifierSources {
                catalog: &self.catalog,
                players: &self.players,
                factions: &self.factions,
                directory: &self.directory,
            },
        )
    }

    fn faction_view(&self, record: &PlayerProgression) -> Option<FactionView<'_>> {
        let faction = self.directory.get_by_id(record.faction()?)?;
        let progression = self.factions.get(faction.id());
        Some(FactionView {
            faction,
            progression: progression.unwrap_or_else(empty_progression),
        })
    }

    /// Drain store outboxes, invalidate caches, and queue the events.
    fn settle(&mut self) {
        let mut drained = self.players.drain_events();
        drained.extend(self.directory.drain_events());
        drained.extend(self.factions.drain_events());
        drained.extend(self.combat.drain_events());

        for event in &drained {
            match event {
                ProgressionEvent::PlayerLeftFaction { player, faction } => {
                    self.modifiers.invalidate_player(player);
                    self.modifiers.invalidate_faction(faction);
                }
                ProgressionEvent::PlayerJoinedFaction { player, .. }
                | ProgressionEvent::PlayerCapabilityUnlocked { player, .. } => {
                    self.modifiers.invalidate_player(player);
                }
                ProgressionEvent::FactionCapabilityUnlocked { faction, .. } => {
                    self.modifiers.invalidate_faction(faction);
                }
                ProgressionEvent::FactionDisbanded { faction, .. } => {
                    self.modifiers.invalidate_faction(faction);
                    self.factions.remove(faction);
                }
                _ => {}
            }
        }
        self.events.extend(drained);
    }
}

/// Progression of a faction that has not earned anything yet.
fn empty_progression<'a>() -> &'a FactionProgression {
    static EMPTY: std::sync::OnceLock<FactionProgression> = std::sync::OnceLock::new();
    EMPTY.get_or_init(FactionProgression::default)
}

#[cfg(test)]
mod tests;
