//! PvP kill rewards and death penalties.

use tracing::{debug, info, warn};

use crate::config::ProgressionConfig;
use crate::deity::DeityRelationshipGraph;
use crate::events::{Notice, ProgressionEvent};
use crate::faction::{FactionMembershipDirectory, FactionProgressionStore};
use crate::ids::{DeityId, PlayerId};
use crate::player::PlayerProgressionStore;

/// Result of processing a kill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KillOutcome {
    /// The attacker killed themselves; nothing is awarded.
    SelfInflicted,
    /// The attacker follows no deity and was prompted to join a faction.
    NotInFaction,
    /// The attacker's faction id did not resolve.
    UnknownFaction,
    Rewarded { favor: u32, prestige: u32 },
}

/// Mutable stores a kill or death touches.
pub struct CombatStores<'a> {
    pub players: &'a mut PlayerProgressionStore,
    pub factions: &'a mut FactionProgressionStore,
    pub directory: &'a FactionMembershipDirectory,
    pub deities: &'a DeityRelationshipGraph,
}

/// Turns kill and death events into favor and prestige changes.
#[derive(Debug)]
pub struct CombatRewardCalculator {
    base_favor: u32,
    base_prestige: u32,
    death_penalty: u32,
    events: Vec<ProgressionEvent>,
}

impl Default for CombatRewardCalculator {
    fn default() -> Self {
        Self::new(&ProgressionConfig::default())
    }
}

impl CombatRewardCalculator {
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            base_favor: config.base_favor,
            base_prestige: config.base_prestige,
            death_penalty: config.death_penalty,
            events: Vec::new(),
        }
    }

    /// Scale `base` by the relationship between the two deities.
    ///
    /// - victim without a deity: `base`
    /// - same deity: `base / 2`
    /// - otherwise: `floor(base * multiplier)`
    pub fn reward(
        base: u32,
        attacker: &DeityId,
        victim: Option<&DeityId>,
        graph: &DeityRelationshipGraph,
    ) -> u32 {
        match victim {
            None => base,
            Some(victim) if victim.is_unset() => base,
            Some(victim) if victim == attacker => base / 2,
            Some(victim) => {
                let scaled = f64::from(base) * graph.favor_multiplier(attacker, victim);
                scaled.floor() as u32
            }
        }
    }

    /// Award favor to the attacker and prestige to the attacker's faction.
    pub fn on_kill(
        &mut self,
        stores: CombatStores<'_>,
        attacker: &PlayerId,
        victim: &PlayerId,
    ) -> KillOutcome {
        if attacker == victim {
            return KillOutcome::SelfInflicted;
        }

        let record = stores.players.get_or_create(attacker);
        let (Some(faction_id), Some(attacker_deity)) =
            (record.faction().cloned(), record.active_deity().cloned())
        else {
            self.notify(attacker, "Join a faction to earn favor and prestige from PvP kills.");
            return KillOutcome::NotInFaction;
        };
        if attacker_deity.is_unset() {
            self.notify(attacker, "Join a faction to earn favor and prestige from PvP kills.");
            return KillOutcome::NotInFaction;
        }

        let Some(faction_name) = stores
            .directory
            .get_by_id(&faction_id)
            .map(|faction| faction.name().to_owned())
        else {
            warn!(
                target: "pantheon::combat",
                attacker = %attacker,
                faction = %faction_id,
                "Attacker's faction not found, no reward"
            );
            return KillOutcome::UnknownFaction;
        };

        let victim_deity = stores
            .players
            .get(victim)
            .filter(|record| record.is_aligned())
            .and_then(|record| record.active_deity().cloned());

        let favor = Self::reward(
            self.base_favor,
            &attacker_deity,
            victim_deity.as_ref(),
            stores.deities,
        );
        let prestige = Self::reward(
            self.base_prestige,
            &attacker_deity,
            victim_deity.as_ref(),
            stores.deities,
        );

        stores.players.add_favor(attacker, favor, "pvp kill");
        stores
            .factions
            .add_prestige(stores.directory, &faction_id, prestige, "pvp kill");
        let kills = stores.players.record_kill(attacker);

        info!(
            attacker = %attacker,
            victim = %victim,
            attacker_deity = %attacker_deity,
            victim_deity = victim_deity.as_ref().map(DeityId::as_str).unwrap_or(DeityId::UNSET),
            favor,
            prestige,
            kills,
            "PvP kill rewarded"
        );

        self.notify(
            attacker,
            format!("+{favor} favor, +{prestige} prestige for {faction_name} (slew {victim})."),
        );
        if let Some(victim_deity) = &victim_deity {
            let slayer = stores
                .deities
                .get(&attacker_deity)
                .map(|descriptor| descriptor.name.clone())
                .unwrap_or_else(|| attacker_deity.to_string());
            debug!(victim = %victim, deity = %victim_deity, "Notifying slain follower");
            self.notify(victim, format!("You were slain by a follower of {slayer}."));
        }

        KillOutcome::Rewarded { favor, prestige }
    }

    /// Subtract the death penalty, capped at the player's current favor.
    ///
    /// Returns the favor lost.
    pub fn on_death(&mut self, players: &mut PlayerProgressionStore, player: &PlayerId) -> u32 {
        let Some(record) = players.get(player) else {
            return 0;
        };
        if !record.is_aligned() {
            return 0;
        }
        let lost = self.death_penalty.min(record.favor());
        if lost == 0 {
            return 0;
        }
        if players.remove_favor(player, lost, "death penalty") {
            debug!(player = %player, lost, "Death penalty applied");
            self.notify(player, format!("You lost {lost} favor."));
            lost
        } else {
            0
        }
    }

    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }

    fn notify(&mut self, player: &PlayerId, text: impl Into<String>) {
        self.events
            .push(ProgressionEvent::Message(Notice::new(player.clone(), text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deity::{DeityDescriptor, Domain, RelationshipKind};
    use chrono::{DateTime, Utc};

    fn graph() -> DeityRelationshipGraph {
        let mut graph = DeityRelationshipGraph::new();
        graph.register(
            DeityDescriptor::new("khoras", "Khoras", Domain::War)
                .with_relationship("morthen", RelationshipKind::Rival)
                .with_relationship("tharos", RelationshipKind::Allied),
        );
        graph.register(
            DeityDescriptor::new("morthen", "Morthen", Domain::Death)
                .with_relationship("khoras", RelationshipKind::Rival),
        );
        graph
    }

    #[test]
    fn reward_table() {
        let graph = graph();
        let khoras = DeityId::from("khoras");
        let morthen = DeityId::from("morthen");
        let tharos = DeityId::from("tharos");

        assert_eq!(CombatRewardCalculator::reward(10, &khoras, Some(&morthen), &graph), 20);
        assert_eq!(CombatRewardCalculator::reward(15, &khoras, Some(&morthen), &graph), 30);
        assert_eq!(CombatRewardCalculator::reward(10, &khoras, Some(&khoras), &graph), 5);
        assert_eq!(CombatRewardCalculator::reward(15, &khoras, Some(&khoras), &graph), 7);
        assert_eq!(CombatRewardCalculator::reward(15, &khoras, Some(&tharos), &graph), 7);
        assert_eq!(CombatRewardCalculator::reward(10, &khoras, None, &graph), 10);
        assert_eq!(
            CombatRewardCalculator::reward(15, &khoras, Some(&DeityId::from("none")), &graph),
            15
        );
    }

    struct Arena {
        graph: DeityRelationshipGraph,
        players: PlayerProgressionStore,
        factions: FactionProgressionStore,
        directory: FactionMembershipDirectory,
        calculator: CombatRewardCalculator,
    }

    impl Arena {
        fn new() -> Self {
            let mut directory = FactionMembershipDirectory::new();
            let mut players = PlayerProgressionStore::default();
            for (name, deity, founder) in [
                ("Iron Vanguard", "khoras", "ada"),
                ("Grave Choir", "morthen", "bo"),
            ] {
                let id = directory
                    .create(name, DeityId::from(deity), PlayerId::from(founder), true)
                    .unwrap()
                    .id()
                    .clone();
                players.join_faction(
                    &PlayerId::from(founder),
                    &id,
                    &mut directory,
                    DateTime::<Utc>::UNIX_EPOCH,
                );
            }
            Self {
                graph: graph(),
                players,
                factions: FactionProgressionStore::new(),
                directory,
                calculator: CombatRewardCalculator::default(),
            }
        }

        fn kill(&mut self, attacker: &str, victim: &str) -> KillOutcome {
            self.calculator.on_kill(
                CombatStores {
                    players: &mut self.players,
                    factions: &mut self.factions,
                    directory: &self.directory,
                    deities: &self.graph,
                },
                &PlayerId::from(attacker),
                &PlayerId::from(victim),
            )
        }
    }

    #[test]
    fn rival_kill_doubles_rewards() {
        let mut arena = Arena::new();
        assert_eq!(
            arena.kill("ada", "bo"),
            KillOutcome::Rewarded {
                favor: 20,
                prestige: 30
            }
        );
        let ada = arena.players.get(&PlayerId::from("ada")).unwrap();
        assert_eq!(ada.favor(), 20);
        assert_eq!(ada.kill_count(), 1);
        let faction = arena.directory.get_by_player(&PlayerId::from("ada")).unwrap();
        assert_eq!(arena.factions.get(faction.id()).unwrap().prestige(), 30);

        let notices: Vec<_> = arena
            .calculator
            .drain_events()
            .iter()
            .flat_map(ProgressionEvent::notices)
            .collect();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].player, PlayerId::from("bo"));
        assert_eq!(notices[1].text, "You were slain by a follower of Khoras.");
    }

    #[test]
    fn unaligned_attacker_is_prompted() {
        let mut arena = Arena::new();
        assert_eq!(arena.kill("cy", "ada"), KillOutcome::NotInFaction);
        assert_eq!(arena.players.get(&PlayerId::from("cy")).unwrap().favor(), 0);
        let events = arena.calculator.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].notices()[0].text.starts_with("Join a faction"));
    }

    #[test]
    fn unaligned_victim_pays_base_and_hears_nothing() {
        let mut arena = Arena::new();
        assert_eq!(
            arena.kill("ada", "cy"),
            KillOutcome::Rewarded {
                favor: 10,
                prestige: 15
            }
        );
        let events = arena.calculator.drain_events();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn self_kill_awards_nothing() {
        let mut arena = Arena::new();
        assert_eq!(arena.kill("ada", "ada"), KillOutcome::SelfInflicted);
        assert_eq!(arena.players.get(&PlayerId::from("ada")).unwrap().favor(), 0);
    }

    #[test]
    fn death_penalty_is_capped_and_silent_at_zero() {
        let mut arena = Arena::new();
        let ada = PlayerId::from("ada");
        assert_eq!(arena.calculator.on_death(&mut arena.players, &ada), 0);
        assert!(arena.calculator.drain_events().is_empty());

        arena.players.add_favor(&ada, 3, "test");
        assert_eq!(arena.calculator.on_death(&mut arena.players, &ada), 3);
        assert_eq!(arena.players.get(&ada).unwrap().favor(), 0);
        let events = arena.calculator.drain_events();
        assert_eq!(events[0].notices()[0].text, "You lost 3 favor.");

        arena.players.add_favor(&ada, 12, "test");
        assert_eq!(arena.calculator.on_death(&mut arena.players, &ada), 5);
        assert_eq!(arena.players.get(&ada).unwrap().favor(), 7);
    }

    #[test]
    fn death_without_faction_costs_nothing() {
        let mut arena = Arena::new();
        let cy = PlayerId::from("cy");
        arena.players.add_favor(&cy, 50, "test");
        assert_eq!(arena.calculator.on_death(&mut arena.players, &cy), 0);
        assert_eq!(arena.players.get(&cy).unwrap().favor(), 50);
    }
}
