//! Factions (religions): membership and collective prestige.
//!
//! - [`FactionMembershipDirectory`] owns faction identity, membership, and invitations.
//! - [`FactionProgressionStore`] owns prestige, prestige rank, and faction-scope unlocks.
//!
//! The two halves are persisted together as a [`crate::snapshot::FactionSnapshot`].

mod directory;
mod progression;

pub use directory::FactionMembershipDirectory;
pub use progression::FactionProgressionStore;

use std::collections::BTreeSet;

use crate::ids::{CapabilityId, DeityId, FactionId, PlayerId};
use crate::rank::{PrestigeRank, RankLadder, RankProgress};

/// A named group of players sharing a deity.
///
/// Invariants:
/// - the deity is never the "none" sentinel
/// - the founder is always a member
/// - members keep insertion order; the first remaining member inherits the
///   founder role when the founder leaves
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Faction {
    pub(crate) id: FactionId,
    pub(crate) name: String,
    pub(crate) deity: DeityId,
    pub(crate) founder: PlayerId,
    pub(crate) is_public: bool,
    pub(crate) members: Vec<PlayerId>,
}

impl Faction {
    pub(crate) fn new(
        id: FactionId,
        name: String,
        deity: DeityId,
        founder: PlayerId,
        is_public: bool,
    ) -> Self {
        Self {
            id,
            name,
            deity,
            members: vec![founder.clone()],
            founder,
            is_public,
        }
    }

    pub fn id(&self) -> &FactionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deity(&self) -> &DeityId {
        &self.deity
    }

    pub fn founder(&self) -> &PlayerId {
        &self.founder
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Members in join order.
    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, player: &PlayerId) -> bool {
        self.members.contains(player)
    }

    pub fn is_founder(&self, player: &PlayerId) -> bool {
        &self.founder == player
    }
}

/// Prestige and faction-scope unlocks for one faction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactionProgression {
    pub(crate) faction: FactionId,
    pub(crate) prestige: u32,
    pub(crate) lifetime_prestige: u32,
    pub(crate) prestige_rank: PrestigeRank,
    pub(crate) unlocked: BTreeSet<CapabilityId>,
}

impl FactionProgression {
    pub fn new(faction: FactionId) -> Self {
        Self {
            faction,
            ..Self::default()
        }
    }

    pub fn faction(&self) -> &FactionId {
        &self.faction
    }

    pub fn prestige(&self) -> u32 {
        self.prestige
    }

    pub fn lifetime_prestige(&self) -> u32 {
        self.lifetime_prestige
    }

    pub fn prestige_rank(&self) -> PrestigeRank {
        self.prestige_rank
    }

    pub fn unlocked(&self) -> &BTreeSet<CapabilityId> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, capability: &CapabilityId) -> bool {
        self.unlocked.contains(capability)
    }

    pub fn progress(&self) -> RankProgress<PrestigeRank> {
        PrestigeRank::progress(self.lifetime_prestige)
    }

    /// Recomputes the derived rank; returns the previous rank.
    pub(crate) fn rederive_rank(&mut self) -> PrestigeRank {
        let previous = self.prestige_rank;
        self.prestige_rank = PrestigeRank::from_lifetime(self.lifetime_prestige);
        previous
    }
}

/// A faction together with its progression, as the capability rules see it.
#[derive(Clone, Copy, Debug)]
pub struct FactionView<'a> {
    pub faction: &'a Faction,
    pub progression: &'a FactionProgression,
}
