//! Player progression records and the join/leave flow.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, info};

use super::PlayerProgression;
use crate::config::ProgressionConfig;
use crate::events::ProgressionEvent;
use crate::faction::FactionMembershipDirectory;
use crate::ids::{CapabilityId, FactionId, PlayerId};
use crate::rank::{FavorRank, RankProgress};

/// Owns every loaded [`PlayerProgression`], keyed by player id.
#[derive(Debug)]
pub struct PlayerProgressionStore {
    records: HashMap<PlayerId, PlayerProgression>,
    switch_cooldown: TimeDelta,
    events: Vec<ProgressionEvent>,
}

impl Default for PlayerProgressionStore {
    fn default() -> Self {
        Self::new(&ProgressionConfig::default())
    }
}

impl PlayerProgressionStore {
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            records: HashMap::new(),
            switch_cooldown: config.switch_cooldown(),
            events: Vec::new(),
        }
    }

    pub fn get(&self, player: &PlayerId) -> Option<&PlayerProgression> {
        self.records.get(player)
    }

    pub fn get_or_create(&mut self, player: &PlayerId) -> &mut PlayerProgression {
        self.records.entry(player.clone()).or_insert_with(|| {
            debug!(player = %player, "Created progression record");
            PlayerProgression::new(player.clone())
        })
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.records.contains_key(player)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Loaded player ids, ordered.
    pub fn players(&self) -> Vec<PlayerId> {
        let mut ids: Vec<_> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }

    // -- Favor --

    /// Add whole favor to current and lifetime totals.
    pub fn add_favor(&mut self, player: &PlayerId, amount: u32, reason: &str) {
        let record = self.get_or_create(player);
        record.favor = record.favor.saturating_add(amount);
        record.lifetime_favor = record.lifetime_favor.saturating_add(amount);
        debug!(
            player = %player,
            amount,
            favor = record.favor,
            lifetime = record.lifetime_favor,
            reason,
            "Favor added"
        );
        self.push_favor_changed(player, reason);
        self.update_favor_rank(player);
    }

    /// Accumulate fractional favor; every whole unit reached is awarded.
    ///
    /// Returns the number of whole units awarded by this call.
    pub fn add_fractional_favor(&mut self, player: &PlayerId, amount: f64, reason: &str) -> u32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0;
        }
        let record = self.get_or_create(player);
        record.fractional_carry += amount;
        let whole = record.fractional_carry.floor();
        record.fractional_carry -= whole;
        let awarded = whole.min(f64::from(u32::MAX)) as u32;
        if awarded == 0 {
            return 0;
        }
        record.favor = record.favor.saturating_add(awarded);
        record.lifetime_favor = record.lifetime_favor.saturating_add(awarded);
        debug!(
            player = %player,
            awarded,
            carry = record.fractional_carry,
            reason,
            "Fractional favor awarded"
        );
        self.push_favor_changed(player, reason);
        self.update_favor_rank(player);
        awarded
    }

    /// Spend favor. Fails without mutating if the player cannot afford it.
    pub fn remove_favor(&mut self, player: &PlayerId, amount: u32, reason: &str) -> bool {
        let Some(record) = self.records.get_mut(player) else {
            return amount == 0;
        };
        if record.favor < amount {
            debug!(
                player = %player,
                amount,
                favor = record.favor,
                reason,
                "Not enough favor to remove"
            );
            return false;
        }
        record.favor -= amount;
        debug!(player = %player, amount, favor = record.favor, reason, "Favor removed");
        self.push_favor_changed(player, reason);
        true
    }

    /// Re-derive the favor rank from lifetime favor.
    ///
    /// Returns the resulting rank, or `None` for an unknown player.
    pub fn update_favor_rank(&mut self, player: &PlayerId) -> Option<FavorRank> {
        let record = self.records.get_mut(player)?;
        let previous = record.rederive_rank();
        let current = record.favor_rank;
        if current != previous {
            info!(player = %player, from = %previous, to = %current, "Favor rank changed");
        }
        if current > previous {
            self.events.push(ProgressionEvent::FavorRankIncreased {
                player: player.clone(),
                from: previous,
                to: current,
            });
        }
        Some(current)
    }

    pub fn progress(&self, player: &PlayerId) -> RankProgress<FavorRank> {
        self.records
            .get(player)
            .map(PlayerProgression::progress)
            .unwrap_or_else(|| PlayerProgression::new(player.clone()).progress())
    }

    // -- Capabilities --

    /// Mark a player-scope capability unlocked. Returns false if it already was.
    pub fn unlock_capability(&mut self, player: &PlayerId, capability: &CapabilityId) -> bool {
        let record = self.get_or_create(player);
        if !record.unlocked.insert(capability.clone()) {
            return false;
        }
        info!(player = %player, capability = %capability, "Player capability unlocked");
        self.events.push(ProgressionEvent::PlayerCapabilityUnlocked {
            player: player.clone(),
            capability: capability.clone(),
        });
        true
    }

    pub fn active_capabilities(&self, player: &PlayerId) -> BTreeSet<CapabilityId> {
        self.records
            .get(player)
            .map(|record| record.unlocked.clone())
            .unwrap_or_default()
    }

    // -- Faction affiliation --

    /// Join `faction_id`, leaving any current faction first.
    ///
    /// Returns false if the target faction does not exist. The leave flow has
    /// already run by then, so the player ends up unaffiliated.
    pub fn join_faction(
        &mut self,
        player: &PlayerId,
        faction_id: &FactionId,
        directory: &mut FactionMembershipDirectory,
        now: DateTime<Utc>,
    ) -> bool {
        if self
            .records
            .get(player)
            .is_some_and(|record| record.faction.is_some())
        {
            self.leave_faction(player, directory);
        }

        let Some(deity) = directory
            .get_by_id(faction_id)
            .map(|faction| faction.deity().clone())
        else {
            error!(
                target: "pantheon::player",
                player = %player,
                faction = %faction_id,
                "Cannot join unknown faction"
            );
            return false;
        };

        let record = self.get_or_create(player);
        record.faction = Some(faction_id.clone());
        record.active_deity = Some(deity.clone());
        record.last_switch = Some(now);
        directory.add_member(faction_id, player);

        info!(player = %player, faction = %faction_id, deity = %deity, "Player joined faction");
        self.events.push(ProgressionEvent::PlayerJoinedFaction {
            player: player.clone(),
            faction: faction_id.clone(),
        });
        true
    }

    /// Leave the current faction, applying the switch penalty.
    ///
    /// Returns the faction left, or `None` if the player had none.
    pub fn leave_faction(
        &mut self,
        player: &PlayerId,
        directory: &mut FactionMembershipDirectory,
    ) -> Option<FactionId> {
        let record = self.records.get_mut(player)?;
        let faction_id = record.faction.take()?;
        let lost_favor = record.favor;
        let lost_unlocks = record.unlocked.len();
        record.apply_switch_penalty();
        record.active_deity = None;
        directory.remove_member(&faction_id, player);

        info!(
            player = %player,
            faction = %faction_id,
            lost_favor,
            lost_unlocks,
            "Player left faction"
        );
        self.push_favor_changed(player, "faction switch penalty");
        self.events.push(ProgressionEvent::PlayerLeftFaction {
            player: player.clone(),
            faction: faction_id.clone(),
        });
        Some(faction_id)
    }

    /// True if the player never switched or the cooldown has elapsed.
    pub fn can_switch(&self, player: &PlayerId, now: DateTime<Utc>) -> bool {
        self.switch_cooldown_remaining(player, now)
            .is_none_or(|remaining| remaining <= TimeDelta::zero())
    }

    /// Time left before the player may switch again.
    ///
    /// `None` if the player never switched; zero once the cooldown elapsed.
    pub fn switch_cooldown_remaining(
        &self,
        player: &PlayerId,
        now: DateTime<Utc>,
    ) -> Option<TimeDelta> {
        let last_switch = self.records.get(player)?.last_switch?;
        let remaining = self.switch_cooldown - (now - last_switch);
        Some(remaining.max(TimeDelta::zero()))
    }

    /// Count a rewarded kill.
    pub fn record_kill(&mut self, player: &PlayerId) -> u32 {
        let record = self.get_or_create(player);
        record.kill_count = record.kill_count.saturating_add(1);
        record.kill_count
    }

    // -- Persistence --

    /// Insert a record loaded from storage, re-deriving its rank.
    pub fn restore(&mut self, mut record: PlayerProgression) {
        record.rederive_rank();
        record.fractional_carry = if record.fractional_carry.is_finite() {
            record.fractional_carry.clamp(0.0, 1.0 - f64::EPSILON)
        } else {
            0.0
        };
        if record.faction.is_none() {
            record.active_deity = None;
        }
        self.records.insert(record.player.clone(), record);
    }

    /// Apply the switch penalty to a player whose faction vanished while the
    /// record was not loaded.
    pub(crate) fn detach(&mut self, player: &PlayerId) -> Option<FactionId> {
        let record = self.records.get_mut(player)?;
        let faction_id = record.faction.take()?;
        record.apply_switch_penalty();
        record.active_deity = None;
        info!(player = %player, faction = %faction_id, "Player detached from missing faction");
        self.push_favor_changed(player, "faction removed");
        self.events.push(ProgressionEvent::PlayerLeftFaction {
            player: player.clone(),
            faction: faction_id.clone(),
        });
        Some(faction_id)
    }

    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_favor_changed(&mut self, player: &PlayerId, reason: &str) {
        if let Some(record) = self.records.get(player) {
            self.events.push(ProgressionEvent::FavorChanged {
                player: player.clone(),
                favor: record.favor,
                lifetime: record.lifetime_favor,
                reason: reason.to_owned(),
            });
        }
    }
}
