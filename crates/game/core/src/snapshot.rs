//! Persisted record shapes.
//!
//! Snapshots are plain data: ranks are stored for readability but always
//! re-derived from lifetime totals when a snapshot is restored.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::faction::{Faction, FactionProgression};
use crate::ids::{CapabilityId, DeityId, FactionId, PlayerId};
use crate::player::PlayerProgression;
use crate::rank::{FavorRank, PrestigeRank};

/// One player's progression as stored under `pantheon:player:<id>`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerSnapshot {
    pub player: PlayerId,
    pub faction: Option<FactionId>,
    pub active_deity: Option<DeityId>,
    pub favor: u32,
    pub lifetime_favor: u32,
    pub favor_rank: FavorRank,
    pub fractional_carry: f64,
    pub last_switch: Option<DateTime<Utc>>,
    pub kill_count: u32,
    pub unlocked: BTreeSet<CapabilityId>,
}

impl From<&PlayerProgression> for PlayerSnapshot {
    fn from(record: &PlayerProgression) -> Self {
        Self {
            player: record.player.clone(),
            faction: record.faction.clone(),
            active_deity: record.active_deity.clone(),
            favor: record.favor,
            lifetime_favor: record.lifetime_favor,
            favor_rank: record.favor_rank,
            fractional_carry: record.fractional_carry,
            last_switch: record.last_switch,
            kill_count: record.kill_count,
            unlocked: record.unlocked.clone(),
        }
    }
}

impl From<PlayerSnapshot> for PlayerProgression {
    fn from(snapshot: PlayerSnapshot) -> Self {
        let mut record = PlayerProgression {
            player: snapshot.player,
            faction: snapshot.faction,
            active_deity: snapshot.active_deity,
            favor: snapshot.favor,
            lifetime_favor: snapshot.lifetime_favor.max(snapshot.favor),
            favor_rank: snapshot.favor_rank,
            fractional_carry: snapshot.fractional_carry,
            last_switch: snapshot.last_switch,
            kill_count: snapshot.kill_count,
            unlocked: snapshot.unlocked,
        };
        record.rederive_rank();
        record
    }
}

/// One faction, membership and progression together.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactionSnapshot {
    pub id: FactionId,
    pub name: String,
    pub deity: DeityId,
    pub founder: PlayerId,
    pub is_public: bool,
    pub members: Vec<PlayerId>,
    pub prestige: u32,
    pub lifetime_prestige: u32,
    pub prestige_rank: PrestigeRank,
    pub unlocked: BTreeSet<CapabilityId>,
}

impl FactionSnapshot {
    pub fn capture(faction: &Faction, progression: Option<&FactionProgression>) -> Self {
        let empty = FactionProgression::new(faction.id.clone());
        let progression = progression.unwrap_or(&empty);
        Self {
            id: faction.id.clone(),
            name: faction.name.clone(),
            deity: faction.deity.clone(),
            founder: faction.founder.clone(),
            is_public: faction.is_public,
            members: faction.members.clone(),
            prestige: progression.prestige,
            lifetime_prestige: progression.lifetime_prestige,
            prestige_rank: progression.prestige_rank,
            unlocked: progression.unlocked.clone(),
        }
    }

    /// Split into directory and progression halves.
    ///
    /// Returns `None` for records that break faction invariants: no members,
    /// or the "none" deity. A founder missing from the member list is
    /// replaced by the first member.
    pub fn into_parts(self) -> Option<(Faction, FactionProgression)> {
        if self.members.is_empty() || self.deity.is_unset() {
            return None;
        }
        let founder = if self.members.contains(&self.founder) {
            self.founder
        } else {
            self.members[0].clone()
        };
        let faction = Faction {
            id: self.id.clone(),
            name: self.name,
            deity: self.deity,
            founder,
            is_public: self.is_public,
            members: self.members,
        };
        let mut progression = FactionProgression {
            faction: self.id,
            prestige: self.prestige,
            lifetime_prestige: self.lifetime_prestige.max(self.prestige),
            prestige_rank: self.prestige_rank,
            unlocked: self.unlocked,
        };
        progression.rederive_rank();
        Some((faction, progression))
    }
}

/// Every faction, stored under `pantheon:factions`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactionsSnapshot {
    /// Next sequence number of the faction id generator.
    pub next_id: u64,
    pub factions: Vec<FactionSnapshot>,
    /// Pending invitations as `(player, faction)`.
    pub invitations: Vec<(PlayerId, FactionId)>,
}
