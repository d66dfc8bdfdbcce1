//! Faction identity, membership, and invitations.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, error, info, warn};

use super::Faction;
use crate::error::ProgressionError;
use crate::events::ProgressionEvent;
use crate::ids::{DeityId, FactionId, FactionIdGenerator, PlayerId};

/// Creates and destroys factions and tracks who belongs where.
///
/// A player belongs to at most one faction. A faction is deleted as soon as
/// its last member leaves.
#[derive(Debug, Default)]
pub struct FactionMembershipDirectory {
    factions: HashMap<FactionId, Faction>,
    by_player: HashMap<PlayerId, FactionId>,
    invitations: HashMap<PlayerId, BTreeSet<FactionId>>,
    ids: FactionIdGenerator,
    events: Vec<ProgressionEvent>,
}

impl FactionMembershipDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Lifecycle --

    /// Create a faction with `founder` as its only member.
    ///
    /// # Errors
    ///
    /// - [`ProgressionError::InvalidDeity`] for the "none" sentinel
    /// - [`ProgressionError::EmptyName`] / [`ProgressionError::DuplicateName`]
    /// - [`ProgressionError::AlreadyInFaction`] if the founder already belongs elsewhere
    pub fn create(
        &mut self,
        name: &str,
        deity: DeityId,
        founder: PlayerId,
        is_public: bool,
    ) -> Result<&Faction, ProgressionError> {
        if deity.is_unset() {
            return Err(ProgressionError::InvalidDeity(deity));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ProgressionError::EmptyName);
        }
        if self.get_by_name(name).is_some() {
            return Err(ProgressionError::DuplicateName(name.to_owned()));
        }
        if let Some(existing) = self.by_player.get(&founder) {
            return Err(ProgressionError::AlreadyInFaction {
                player: founder,
                faction: existing.clone(),
            });
        }

        let mut id = self.ids.next_id();
        while self.factions.contains_key(&id) {
            id = self.ids.next_id();
        }

        info!(
            faction = %id,
            name,
            deity = %deity,
            founder = %founder,
            "Faction created"
        );
        self.events.push(ProgressionEvent::FactionCreated {
            faction: id.clone(),
            name: name.to_owned(),
            deity: deity.clone(),
            founder: founder.clone(),
        });

        self.by_player.insert(founder.clone(), id.clone());
        let faction = Faction::new(id.clone(), name.to_owned(), deity, founder, is_public);
        Ok(self.factions.entry(id).or_insert(faction))
    }

    /// Delete a faction outright. Only the current founder may do this.
    pub fn delete(
        &mut self,
        faction_id: &FactionId,
        requester: &PlayerId,
    ) -> Result<Faction, ProgressionError> {
        let faction = self
            .factions
            .get(faction_id)
            .ok_or_else(|| ProgressionError::FactionNotFound(faction_id.clone()))?;
        if !faction.is_founder(requester) {
            warn!(
                target: "pantheon::faction",
                faction = %faction_id,
                requester = %requester,
                "Delete refused: requester is not the founder"
            );
            return Err(ProgressionError::NotFounder {
                faction: faction_id.clone(),
            });
        }
        self.remove_faction(faction_id)
            .ok_or_else(|| ProgressionError::FactionNotFound(faction_id.clone()))
    }

    // -- Membership --

    /// Add a member. Idempotent; unknown factions are logged and ignored.
    pub fn add_member(&mut self, faction_id: &FactionId, player: &PlayerId) {
        if let Some(current) = self.by_player.get(player)
            && current != faction_id
        {
            warn!(
                target: "pantheon::faction",
                player = %player,
                current = %current,
                requested = %faction_id,
                "Player already belongs to another faction, membership unchanged"
            );
            return;
        }
        let Some(faction) = self.factions.get_mut(faction_id) else {
            error!(
                target: "pantheon::faction",
                faction = %faction_id,
                player = %player,
                "Cannot add member to unknown faction"
            );
            return;
        };
        if !faction.members.contains(player) {
            faction.members.push(player.clone());
            debug!(faction = %faction_id, player = %player, "Member added");
        }
        self.by_player.insert(player.clone(), faction_id.clone());
        self.remove_invitation(player, faction_id);
    }

    /// Remove a member. Returns true if the player was a member.
    ///
    /// A departing founder hands the role to the earliest remaining member; an
    /// empty faction is deleted.
    pub fn remove_member(&mut self, faction_id: &FactionId, player: &PlayerId) -> bool {
        let Some(faction) = self.factions.get_mut(faction_id) else {
            warn!(
                target: "pantheon::faction",
                faction = %faction_id,
                player = %player,
                "Cannot remove member from unknown faction"
            );
            return false;
        };
        let Some(position) = faction.members.iter().position(|m| m == player) else {
            return false;
        };
        faction.members.remove(position);
        if self.by_player.get(player) == Some(faction_id) {
            self.by_player.remove(player);
        }
        debug!(faction = %faction_id, player = %player, "Member removed");

        if faction.members.is_empty() {
            info!(faction = %faction_id, "Last member left, deleting faction");
            self.remove_faction(faction_id);
        } else if &faction.founder == player {
            let successor = faction.members[0].clone();
            info!(
                faction = %faction_id,
                founder = %successor,
                "Founder left, promoting next member"
            );
            faction.founder = successor.clone();
            self.events.push(ProgressionEvent::FounderChanged {
                faction: faction_id.clone(),
                founder: successor,
            });
        }
        true
    }

    /// Hand the founder role to another member.
    pub fn transfer_founder(
        &mut self,
        faction_id: &FactionId,
        requester: &PlayerId,
        successor: &PlayerId,
    ) -> Result<(), ProgressionError> {
        let faction = self.founded_by_mut(faction_id, requester)?;
        if !faction.members.contains(successor) {
            return Err(ProgressionError::NotAMember {
                player: successor.clone(),
                faction: faction_id.clone(),
            });
        }
        faction.founder = successor.clone();
        info!(faction = %faction_id, founder = %successor, "Founder transferred");
        self.events.push(ProgressionEvent::FounderChanged {
            faction: faction_id.clone(),
            founder: successor.clone(),
        });
        Ok(())
    }

    /// Toggle whether anyone may join without an invitation.
    pub fn set_public(
        &mut self,
        faction_id: &FactionId,
        requester: &PlayerId,
        is_public: bool,
    ) -> Result<(), ProgressionError> {
        let faction = self.founded_by_mut(faction_id, requester)?;
        faction.is_public = is_public;
        debug!(faction = %faction_id, is_public, "Faction visibility changed");
        Ok(())
    }

    // -- Queries --

    pub fn get_by_id(&self, faction_id: &FactionId) -> Option<&Faction> {
        self.factions.get(faction_id)
    }

    pub fn get_by_player(&self, player: &PlayerId) -> Option<&Faction> {
        self.by_player
            .get(player)
            .and_then(|faction_id| self.factions.get(faction_id))
    }

    /// Case-insensitive exact name match.
    pub fn get_by_name(&self, name: &str) -> Option<&Faction> {
        let name = name.trim();
        self.factions
            .values()
            .find(|faction| faction.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, faction_id: &FactionId) -> bool {
        self.factions.contains_key(faction_id)
    }

    /// All factions ordered by id.
    pub fn list(&self) -> Vec<&Faction> {
        let mut all: Vec<_> = self.factions.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Whether `player` may join `faction_id` right now.
    pub fn can_join(&self, faction_id: &FactionId, player: &PlayerId) -> bool {
        let Some(faction) = self.factions.get(faction_id) else {
            return false;
        };
        if faction.is_member(player) {
            return false;
        }
        faction.is_public || self.has_invitation(player, faction_id)
    }

    // -- Invitations --

    /// Record an invitation. Invitations never expire.
    ///
    /// # Errors
    ///
    /// - [`ProgressionError::FactionNotFound`] if the faction is unknown
    /// - [`ProgressionError::NotAMember`] if the inviter does not belong to it
    pub fn invite(
        &mut self,
        faction_id: &FactionId,
        player: &PlayerId,
        inviter: &PlayerId,
    ) -> Result<(), ProgressionError> {
        let Some(faction) = self.factions.get(faction_id) else {
            error!(
                target: "pantheon::faction",
                faction = %faction_id,
                "Cannot invite to unknown faction"
            );
            return Err(ProgressionError::FactionNotFound(faction_id.clone()));
        };
        if !faction.is_member(inviter) {
            warn!(
                target: "pantheon::faction",
                faction = %faction_id,
                inviter = %inviter,
                "Invite refused: inviter is not a member"
            );
            return Err(ProgressionError::NotAMember {
                player: inviter.clone(),
                faction: faction_id.clone(),
            });
        }
        let newly_invited = self
            .invitations
            .entry(player.clone())
            .or_default()
            .insert(faction_id.clone());
        if newly_invited {
            debug!(faction = %faction_id, player = %player, inviter = %inviter, "Invitation recorded");
            self.events.push(ProgressionEvent::InvitationSent {
                faction: faction_id.clone(),
                player: player.clone(),
                inviter: inviter.clone(),
            });
        }
        Ok(())
    }

    pub fn has_invitation(&self, player: &PlayerId, faction_id: &FactionId) -> bool {
        self.invitations
            .get(player)
            .is_some_and(|invites| invites.contains(faction_id))
    }

    /// Remove one invitation. Returns true if it existed.
    pub fn remove_invitation(&mut self, player: &PlayerId, faction_id: &FactionId) -> bool {
        let Some(invites) = self.invitations.get_mut(player) else {
            return false;
        };
        let removed = invites.remove(faction_id);
        if invites.is_empty() {
            self.invitations.remove(player);
        }
        removed
    }

    /// Pending invitations for a player, ordered by faction id.
    pub fn list_invitations(&self, player: &PlayerId) -> Vec<FactionId> {
        self.invitations
            .get(player)
            .map(|invites| invites.iter().cloned().collect())
            .unwrap_or_default()
    }

    // -- Persistence --

    /// Reinsert a faction loaded from storage. Overwrites any faction with the same id.
    pub fn restore(&mut self, faction: Faction) {
        self.ids.observe(&faction.id);
        for member in &faction.members {
            self.by_player.insert(member.clone(), faction.id.clone());
        }
        if let Some(previous) = self.factions.insert(faction.id.clone(), faction) {
            warn!(
                target: "pantheon::faction",
                faction = %previous.id,
                "Restored faction replaced an existing entry"
            );
        }
    }

    /// Restore a pending invitation without emitting an event.
    pub fn restore_invitation(&mut self, player: PlayerId, faction_id: FactionId) {
        self.invitations.entry(player).or_default().insert(faction_id);
    }

    /// All pending invitations as `(player, faction)` pairs.
    pub fn all_invitations(&self) -> Vec<(PlayerId, FactionId)> {
        let mut pairs: Vec<_> = self
            .invitations
            .iter()
            .flat_map(|(player, invites)| {
                invites
                    .iter()
                    .map(move |faction| (player.clone(), faction.clone()))
            })
            .collect();
        pairs.sort();
        pairs
    }

    pub fn id_sequence(&self) -> u64 {
        self.ids.peek()
    }

    pub fn set_id_sequence(&mut self, next: u64) {
        if next > self.ids.peek() {
            self.ids = FactionIdGenerator::starting_from(next);
        }
    }

    /// Take all events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Internals --

    fn founded_by_mut(
        &mut self,
        faction_id: &FactionId,
        requester: &PlayerId,
    ) -> Result<&mut Faction, ProgressionError> {
        let faction = self
            .factions
            .get_mut(faction_id)
            .ok_or_else(|| ProgressionError::FactionNotFound(faction_id.clone()))?;
        if !faction.is_founder(requester) {
            return Err(ProgressionError::NotFounder {
                faction: faction_id.clone(),
            });
        }
        Ok(faction)
    }

    fn remove_faction(&mut self, faction_id: &FactionId) -> Option<Faction> {
        let faction = self.factions.remove(faction_id)?;
        self.by_player.retain(|_, id| id != faction_id);
        self.invitations.retain(|_, invites| {
            invites.remove(faction_id);
            !invites.is_empty()
        });
        info!(faction = %faction_id, name = %faction.name, "Faction disbanded");
        self.events.push(ProgressionEvent::FactionDisbanded {
            faction: faction_id.clone(),
            name: faction.name.clone(),
        });
        Some(faction)
    }
}
