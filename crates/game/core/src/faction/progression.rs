//! Collective prestige, prestige rank, and faction-scope unlocks.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, error, info};

use super::{FactionMembershipDirectory, FactionProgression};
use crate::events::ProgressionEvent;
use crate::ids::{CapabilityId, FactionId};
use crate::rank::{PrestigeRank, RankProgress};

/// Per-faction prestige records, keyed by faction id.
///
/// Records are created lazily for factions known to the directory and dropped
/// when the faction is disbanded.
#[derive(Debug, Default)]
pub struct FactionProgressionStore {
    records: HashMap<FactionId, FactionProgression>,
    events: Vec<ProgressionEvent>,
}

impl FactionProgressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, faction: &FactionId) -> Option<&FactionProgression> {
        self.records.get(faction)
    }

    pub fn get_or_create(&mut self, faction: &FactionId) -> &mut FactionProgression {
        self.records
            .entry(faction.clone())
            .or_insert_with(|| FactionProgression::new(faction.clone()))
    }

    /// Add prestige to a faction known to `directory`.
    pub fn add_prestige(
        &mut self,
        directory: &FactionMembershipDirectory,
        faction_id: &FactionId,
        amount: u32,
        reason: &str,
    ) {
        if !directory.contains(faction_id) {
            error!(
                target: "pantheon::prestige",
                faction = %faction_id,
                amount,
                reason,
                "Cannot add prestige to unknown faction"
            );
            return;
        }
        let record = self.get_or_create(faction_id);
        record.prestige = record.prestige.saturating_add(amount);
        record.lifetime_prestige = record.lifetime_prestige.saturating_add(amount);
        debug!(
            faction = %faction_id,
            amount,
            prestige = record.prestige,
            lifetime = record.lifetime_prestige,
            reason,
            "Prestige added"
        );
        let changed = ProgressionEvent::PrestigeChanged {
            faction: faction_id.clone(),
            prestige: record.prestige,
            lifetime: record.lifetime_prestige,
            reason: reason.to_owned(),
        };
        self.events.push(changed);
        self.update_rank(directory, faction_id);
    }

    /// Recompute the prestige rank and notify members on promotion.
    ///
    /// Returns the rank after recomputation, or `None` for an unknown faction.
    pub fn update_rank(
        &mut self,
        directory: &FactionMembershipDirectory,
        faction_id: &FactionId,
    ) -> Option<PrestigeRank> {
        let record = self.records.get_mut(faction_id)?;
        let previous = record.rederive_rank();
        let current = record.prestige_rank;
        if current > previous {
            let (faction_name, members) = directory
                .get_by_id(faction_id)
                .map(|faction| (faction.name().to_owned(), faction.members().to_vec()))
                .unwrap_or_default();
            info!(
                faction = %faction_id,
                from = %previous,
                to = %current,
                members = members.len(),
                "Faction prestige rank increased"
            );
            self.events.push(ProgressionEvent::PrestigeRankIncreased {
                faction: faction_id.clone(),
                faction_name,
                from: previous,
                to: current,
                members,
            });
        }
        Some(current)
    }

    /// Mark a faction-scope capability unlocked. Returns false if it already was.
    pub fn unlock_capability(&mut self, faction_id: &FactionId, capability: &CapabilityId) -> bool {
        let record = self.get_or_create(faction_id);
        if !record.unlocked.insert(capability.clone()) {
            return false;
        }
        info!(faction = %faction_id, capability = %capability, "Faction capability unlocked");
        self.events.push(ProgressionEvent::FactionCapabilityUnlocked {
            faction: faction_id.clone(),
            capability: capability.clone(),
        });
        true
    }

    /// Unlocked faction-scope capabilities; empty for unknown factions.
    pub fn active_capabilities(&self, faction_id: &FactionId) -> BTreeSet<CapabilityId> {
        self.records
            .get(faction_id)
            .map(|record| record.unlocked.clone())
            .unwrap_or_default()
    }

    /// Progress toward the next prestige rank. Unknown factions report zero progress.
    pub fn progress(&self, faction_id: &FactionId) -> RankProgress<PrestigeRank> {
        self.records
            .get(faction_id)
            .map(FactionProgression::progress)
            .unwrap_or_else(|| FactionProgression::new(faction_id.clone()).progress())
    }

    /// Drop the record of a disbanded faction.
    pub fn remove(&mut self, faction_id: &FactionId) -> Option<FactionProgression> {
        self.records.remove(faction_id)
    }

    /// Reinsert a record loaded from storage. The rank is re-derived from lifetime prestige.
    pub fn restore(&mut self, mut record: FactionProgression) {
        record.rederive_rank();
        self.records.insert(record.faction.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{DeityId, PlayerId};
    use crate::rank::RANK_THRESHOLDS;

    fn setup() -> (FactionMembershipDirectory, FactionId) {
        let mut directory = FactionMembershipDirectory::new();
        let id = directory
            .create("Iron Vanguard", DeityId::from("khoras"), PlayerId::from("ada"), true)
            .unwrap()
            .id()
            .clone();
        directory.add_member(&id, &PlayerId::from("bo"));
        (directory, id)
    }

    #[test]
    fn add_prestige_to_unknown_faction_is_noop() {
        let (directory, _) = setup();
        let mut store = FactionProgressionStore::new();
        store.add_prestige(&directory, &FactionId::from("missing"), 100, "test");
        assert!(store.is_empty());
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn promotion_notifies_every_member() {
        let (directory, id) = setup();
        let mut store = FactionProgressionStore::new();
        store.add_prestige(&directory, &id, 499, "kills");
        assert_eq!(store.get(&id).unwrap().prestige_rank(), PrestigeRank::Fledgling);
        store.drain_events();

        store.add_prestige(&directory, &id, 1, "kills");
        let events = store.drain_events();
        let promotion = events
            .iter()
            .find_map(|event| match event {
                ProgressionEvent::PrestigeRankIncreased { to, members, .. } => Some((*to, members)),
                _ => None,
            })
            .unwrap();
        assert_eq!(promotion.0, PrestigeRank::Established);
        assert_eq!(promotion.1, &vec![PlayerId::from("ada"), PlayerId::from("bo")]);
    }

    #[test]
    fn unlock_is_idempotent() {
        let (_, id) = setup();
        let mut store = FactionProgressionStore::new();
        let capability = CapabilityId::from("khoras_war_banner");
        assert!(store.unlock_capability(&id, &capability));
        assert!(!store.unlock_capability(&id, &capability));
        assert_eq!(store.active_capabilities(&id).len(), 1);
        assert_eq!(store.drain_events().len(), 1);
    }

    #[test]
    fn progress_plateaus_at_mythic() {
        let (directory, id) = setup();
        let mut store = FactionProgressionStore::new();
        store.add_prestige(&directory, &id, 25_000, "legend");
        let progress = store.progress(&id);
        assert_eq!(progress.rank, PrestigeRank::Mythic);
        assert_eq!(progress.next_rank, PrestigeRank::Mythic);
        assert_eq!(progress.next_threshold, RANK_THRESHOLDS[4]);
    }

    #[test]
    fn restore_rederives_rank() {
        let mut store = FactionProgressionStore::new();
        let mut record = FactionProgression::new(FactionId::from("faction-000003"));
        record.lifetime_prestige = 2_500;
        record.prestige_rank = PrestigeRank::Fledgling;
        store.restore(record);
        assert_eq!(
            store.get(&FactionId::from("faction-000003")).unwrap().prestige_rank(),
            PrestigeRank::Renowned
        );
    }
}
