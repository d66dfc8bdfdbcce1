use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use super::{StatSink, combine_modifiers, modifier_id};
use crate::capability::{CapabilityCatalog, Scope, StatDeltas};
use crate::faction::{FactionMembershipDirectory, FactionProgressionStore};
use crate::ids::{CapabilityId, FactionId, PlayerId};
use crate::player::PlayerProgressionStore;

/// Read-only view of the state modifiers are folded from.
#[derive(Clone, Copy)]
pub struct ModifierSources<'a> {
    pub catalog: &'a CapabilityCatalog,
    pub players: &'a PlayerProgressionStore,
    pub factions: &'a FactionProgressionStore,
    pub directory: &'a FactionMembershipDirectory,
}

impl ModifierSources<'_> {
    fn fold<'i>(&self, scope: Scope, unlocked: impl IntoIterator<Item = &'i CapabilityId>) -> StatDeltas {
        let mut folded = StatDeltas::new();
        for id in unlocked {
            match self.catalog.get(id) {
                Some(capability) if capability.scope == scope => {
                    combine_modifiers(&mut folded, &capability.stat_modifiers);
                }
                Some(_) => trace!(capability = %id, "Skipping capability of another scope"),
                None => trace!(capability = %id, "Skipping unknown capability"),
            }
        }
        folded
    }
}

/// Memoized modifier maps, invalidated whenever unlocks or membership change.
#[derive(Debug, Default)]
pub struct ModifierResolutionCache {
    players: HashMap<PlayerId, StatDeltas>,
    factions: HashMap<FactionId, StatDeltas>,
    /// Stat keys last pushed to the sink, per player.
    applied: HashMap<PlayerId, BTreeSet<String>>,
}

impl ModifierResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the player's unlocked player-scope capabilities.
    pub fn player_modifiers(&mut self, sources: ModifierSources<'_>, player: &PlayerId) -> StatDeltas {
        if let Some(cached) = self.players.get(player) {
            return cached.clone();
        }
        let unlocked = sources
            .players
            .get(player)
            .map(|record| record.unlocked().iter().collect::<Vec<_>>())
            .unwrap_or_default();
        let folded = sources.fold(Scope::Player, unlocked);
        self.players.insert(player.clone(), folded.clone());
        folded
    }

    /// Sum of the faction's unlocked faction-scope capabilities.
    pub fn faction_modifiers(
        &mut self,
        sources: ModifierSources<'_>,
        faction: &FactionId,
    ) -> StatDeltas {
        if let Some(cached) = self.factions.get(faction) {
            return cached.clone();
        }
        let unlocked = sources
            .factions
            .get(faction)
            .map(|record| record.unlocked().iter().collect::<Vec<_>>())
            .unwrap_or_default();
        let folded = sources.fold(Scope::Faction, unlocked);
        self.factions.insert(faction.clone(), folded.clone());
        folded
    }

    /// Player modifiers plus those of the player's current faction.
    pub fn combined_modifiers(
        &mut self,
        sources: ModifierSources<'_>,
        player: &PlayerId,
    ) -> StatDeltas {
        let mut combined = self.player_modifiers(sources, player);
        if let Some(faction) = sources.players.get(player).and_then(|record| record.faction()) {
            let faction_modifiers = self.faction_modifiers(sources, faction);
            combine_modifiers(&mut combined, &faction_modifiers);
        }
        combined
    }

    pub fn invalidate_player(&mut self, player: &PlayerId) {
        if self.players.remove(player).is_some() {
            trace!(player = %player, "Invalidated player modifiers");
        }
    }

    pub fn invalidate_faction(&mut self, faction: &FactionId) {
        if self.factions.remove(faction).is_some() {
            trace!(faction = %faction, "Invalidated faction modifiers");
        }
    }

    /// Push the player's combined modifiers to `sink`, removing every key
    /// applied last time first.
    pub fn apply_to_entity(
        &mut self,
        sources: ModifierSources<'_>,
        player: &PlayerId,
        sink: &mut dyn StatSink,
    ) {
        let combined = self.combined_modifiers(sources, player);
        let id = modifier_id(player);
        if let Some(previous) = self.applied.remove(player) {
            for key in &previous {
                sink.remove(player, key, &id);
            }
        }
        for (key, value) in &combined {
            sink.set(player, key, &id, *value);
        }
        debug!(player = %player, stats = combined.len(), "Applied modifiers");
        self.applied
            .insert(player.clone(), combined.into_keys().collect());
    }

    /// Invalidate a faction and re-apply modifiers for each current member.
    ///
    /// Returns the number of members refreshed.
    pub fn refresh_faction_members(
        &mut self,
        sources: ModifierSources<'_>,
        faction: &FactionId,
        sink: &mut dyn StatSink,
    ) -> usize {
        self.invalidate_faction(faction);
        let members = sources
            .directory
            .get_by_id(faction)
            .map(|faction| faction.members().to_vec())
            .unwrap_or_default();
        for member in &members {
            self.invalidate_player(member);
            self.apply_to_entity(sources, member, sink);
        }
        members.len()
    }

    /// Stat keys last applied for `player`.
    pub fn applied_keys(&self, player: &PlayerId) -> Option<&BTreeSet<String>> {
        self.applied.get(player)
    }

    /// Forget everything about a player that went offline.
    pub fn forget_player(&mut self, player: &PlayerId) {
        self.players.remove(player);
        self.applied.remove(player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::ids::DeityId;
    use chrono::{DateTime, Utc};

    #[derive(Default)]
    struct RecordingSink {
        stats: HashMap<(PlayerId, String), (String, f64)>,
        removals: usize,
    }

    impl StatSink for RecordingSink {
        fn set(&mut self, entity: &PlayerId, stat_key: &str, modifier_id: &str, value: f64) {
            self.stats.insert(
                (entity.clone(), stat_key.to_owned()),
                (modifier_id.to_owned(), value),
            );
        }

        fn remove(&mut self, entity: &PlayerId, stat_key: &str, _modifier_id: &str) {
            self.removals += 1;
            self.stats.remove(&(entity.clone(), stat_key.to_owned()));
        }
    }

    struct World {
        catalog: CapabilityCatalog,
        players: PlayerProgressionStore,
        factions: FactionProgressionStore,
        directory: FactionMembershipDirectory,
        faction: FactionId,
    }

    impl World {
        fn new() -> Self {
            let mut catalog = CapabilityCatalog::new();
            catalog.register(
                Capability::new("c1", "Battle Fury", Scope::Player, "khoras").with_stat("statA", 0.10),
            );
            catalog.register(
                Capability::new("c2", "War Banner", Scope::Faction, "khoras").with_stat("statA", 0.05),
            );
            catalog.register(
                Capability::new("c3", "Iron Skin", Scope::Player, "khoras").with_stat("statB", 0.20),
            );
            let mut directory = FactionMembershipDirectory::new();
            let faction = directory
                .create("Iron Vanguard", DeityId::from("khoras"), PlayerId::from("ada"), true)
                .unwrap()
                .id()
                .clone();
            let mut players = PlayerProgressionStore::default();
            players.join_faction(
                &PlayerId::from("ada"),
                &faction,
                &mut directory,
                DateTime::<Utc>::UNIX_EPOCH,
            );
            Self {
                catalog,
                players,
                factions: FactionProgressionStore::new(),
                directory,
                faction,
            }
        }

        fn sources(&self) -> ModifierSources<'_> {
            ModifierSources {
                catalog: &self.catalog,
                players: &self.players,
                factions: &self.factions,
                directory: &self.directory,
            }
        }
    }

    #[test]
    fn combined_sums_player_and_faction() {
        let mut world = World::new();
        let ada = PlayerId::from("ada");
        world.players.unlock_capability(&ada, &CapabilityId::from("c1"));
        world.factions.unlock_capability(&world.faction, &CapabilityId::from("c2"));

        let mut cache = ModifierResolutionCache::new();
        let combined = cache.combined_modifiers(world.sources(), &ada);
        assert_eq!(combined.len(), 1);
        assert!((combined["statA"] - 0.15).abs() < 1e-9);
    }

    #[test]
    fn cache_serves_stale_until_invalidated() {
        let mut world = World::new();
        let ada = PlayerId::from("ada");
        let mut cache = ModifierResolutionCache::new();
        assert!(cache.player_modifiers(world.sources(), &ada).is_empty());

        world.players.unlock_capability(&ada, &CapabilityId::from("c1"));
        assert!(cache.player_modifiers(world.sources(), &ada).is_empty());

        cache.invalidate_player(&ada);
        assert_eq!(cache.player_modifiers(world.sources(), &ada)["statA"], 0.10);
    }

    #[test]
    fn apply_removes_keys_that_stopped_contributing() {
        let mut world = World::new();
        let ada = PlayerId::from("ada");
        world.players.unlock_capability(&ada, &CapabilityId::from("c1"));
        world.players.unlock_capability(&ada, &CapabilityId::from("c3"));

        let mut cache = ModifierResolutionCache::new();
        let mut sink = RecordingSink::default();
        cache.apply_to_entity(world.sources(), &ada, &mut sink);
        assert_eq!(sink.stats.len(), 2);
        assert_eq!(
            sink.stats[&(ada.clone(), "statB".to_owned())],
            ("pantheon:ada".to_owned(), 0.20)
        );

        world.players.leave_faction(&ada, &mut world.directory);
        cache.invalidate_player(&ada);
        cache.apply_to_entity(world.sources(), &ada, &mut sink);
        assert!(sink.stats.is_empty());
        assert_eq!(sink.removals, 2);
        assert!(cache.applied_keys(&ada).unwrap().is_empty());
    }

    #[test]
    fn refresh_reapplies_every_member() {
        let mut world = World::new();
        let bo = PlayerId::from("bo");
        let faction = world.faction.clone();
        world.players.join_faction(
            &bo,
            &faction,
            &mut world.directory,
            DateTime::<Utc>::UNIX_EPOCH,
        );

        let mut cache = ModifierResolutionCache::new();
        let mut sink = RecordingSink::default();
        cache.faction_modifiers(world.sources(), &faction);
        world.factions.unlock_capability(&faction, &CapabilityId::from("c2"));

        let refreshed = cache.refresh_faction_members(world.sources(), &faction, &mut sink);
        assert_eq!(refreshed, 2);
        assert_eq!(sink.stats[&(bo, "statA".to_owned())].1, 0.05);
    }
}
