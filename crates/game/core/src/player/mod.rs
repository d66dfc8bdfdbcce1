//! Per-player favor, rank, faction affiliation, and player-scope unlocks.

mod store;

pub use store::PlayerProgressionStore;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::ids::{CapabilityId, DeityId, FactionId, PlayerId};
use crate::rank::{FavorRank, RankLadder, RankProgress};

/// Progression record of one player.
///
/// Invariants:
/// - `favor_rank` is always derived from `lifetime_favor`
/// - `lifetime_favor` never decreases
/// - `fractional_carry` stays in `[0, 1)`
/// - `active_deity` is set exactly when `faction` is set
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerProgression {
    pub(crate) player: PlayerId,
    pub(crate) faction: Option<FactionId>,
    pub(crate) active_deity: Option<DeityId>,
    pub(crate) favor: u32,
    pub(crate) lifetime_favor: u32,
    pub(crate) favor_rank: FavorRank,
    pub(crate) fractional_carry: f64,
    pub(crate) last_switch: Option<DateTime<Utc>>,
    pub(crate) kill_count: u32,
    pub(crate) unlocked: BTreeSet<CapabilityId>,
}

impl PlayerProgression {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn faction(&self) -> Option<&FactionId> {
        self.faction.as_ref()
    }

    pub fn active_deity(&self) -> Option<&DeityId> {
        self.active_deity.as_ref()
    }

    /// True when the player follows a real deity through a faction.
    pub fn is_aligned(&self) -> bool {
        self.faction.is_some() && self.active_deity.as_ref().is_some_and(|d| !d.is_unset())
    }

    /// Spendable favor.
    pub fn favor(&self) -> u32 {
        self.favor
    }

    pub fn lifetime_favor(&self) -> u32 {
        self.lifetime_favor
    }

    pub fn favor_rank(&self) -> FavorRank {
        self.favor_rank
    }

    pub fn fractional_carry(&self) -> f64 {
        self.fractional_carry
    }

    pub fn last_switch(&self) -> Option<DateTime<Utc>> {
        self.last_switch
    }

    pub fn kill_count(&self) -> u32 {
        self.kill_count
    }

    pub fn unlocked(&self) -> &BTreeSet<CapabilityId> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, capability: &CapabilityId) -> bool {
        self.unlocked.contains(capability)
    }

    pub fn progress(&self) -> RankProgress<FavorRank> {
        FavorRank::progress(self.lifetime_favor)
    }

    pub(crate) fn rederive_rank(&mut self) -> FavorRank {
        let previous = self.favor_rank;
        self.favor_rank = FavorRank::from_lifetime(self.lifetime_favor);
        previous
    }

    /// Switch penalty: spendable favor and player-scope unlocks are lost.
    /// Lifetime favor and rank are kept.
    pub(crate) fn apply_switch_penalty(&mut self) {
        self.favor = 0;
        self.fractional_carry = 0.0;
        self.unlocked.clear();
    }
}
