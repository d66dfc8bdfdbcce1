//! Faction commands: founding, joining, leaving, and administration.

use tracing::{info, warn};

use super::ProgressionEngine;
use crate::error::ProgressionError;
use crate::ids::{DeityId, FactionId, PlayerId};

impl ProgressionEngine {
    /// Found a faction with `founder` as its first member.
    pub fn create_faction(
        &mut self,
        founder: &PlayerId,
        name: &str,
        deity: &DeityId,
        is_public: bool,
    ) -> Result<FactionId, ProgressionError> {
        if deity.is_unset() {
            return Err(ProgressionError::InvalidDeity(deity.clone()));
        }
        if !self.deities.contains(deity) {
            return Err(ProgressionError::UnknownDeity(deity.clone()));
        }
        if let Some(current) = self.directory.get_by_player(founder) {
            return Err(ProgressionError::AlreadyInFaction {
                player: founder.clone(),
                faction: current.id().clone(),
            });
        }
        self.ensure_can_switch(founder)?;

        let faction = self
            .directory
            .create(name, deity.clone(), founder.clone(), is_public)?
            .id()
            .clone();
        self.factions.get_or_create(&faction);
        let now = self.clock.now();
        self.players
            .join_faction(founder, &faction, &mut self.directory, now);
        self.settle();
        Ok(faction)
    }

    /// Join a faction that is public or has invited the player.
    ///
    /// A player already in another faction leaves it first, paying the
    /// switch penalty.
    pub fn join_faction(
        &mut self,
        player: &PlayerId,
        faction: &FactionId,
    ) -> Result<(), ProgressionError> {
        let target = self
            .directory
            .get_by_id(faction)
            .ok_or_else(|| ProgressionError::FactionNotFound(faction.clone()))?;
        if target.is_member(player) {
            return Err(ProgressionError::AlreadyInFaction {
                player: player.clone(),
                faction: faction.clone(),
            });
        }
        if !self.directory.can_join(faction, player) {
            return Err(ProgressionError::InviteRequired {
                faction: faction.clone(),
            });
        }
        self.ensure_can_switch(player)?;

        let now = self.clock.now();
        let departed = self.directory.get_by_player(player).map(|f| f.id().clone());
        if let Some(previous) = &departed
            && !self
                .players
                .get(player)
                .is_some_and(|record| record.faction() == Some(previous))
        {
            self.directory.remove_member(previous, player);
        }
        self.players
            .join_faction(player, faction, &mut self.directory, now);
        self.settle();
        Ok(())
    }

    /// Join by case-insensitive faction name.
    pub fn join_faction_by_name(
        &mut self,
        player: &PlayerId,
        name: &str,
    ) -> Result<FactionId, ProgressionError> {
        let faction = self
            .directory
            .get_by_name(name)
            .map(|faction| faction.id().clone())
            .ok_or_else(|| ProgressionError::FactionNotFound(FactionId::from(name)))?;
        self.join_faction(player, &faction)?;
        Ok(faction)
    }

    /// Leave the current faction, paying the switch penalty.
    pub fn leave_faction(&mut self, player: &PlayerId) -> Result<FactionId, ProgressionError> {
        let faction = self
            .directory
            .get_by_player(player)
            .map(|faction| faction.id().clone())
            .ok_or_else(|| ProgressionError::NotInFaction(player.clone()))?;
        self.depart(player, &faction);
        self.settle();
        Ok(faction)
    }

    /// Invite `player` into the inviter's faction.
    pub fn invite(&mut self, inviter: &PlayerId, player: &PlayerId) -> Result<(), ProgressionError> {
        let faction = self.requester_faction(inviter)?;
        self.directory.invite(&faction, player, inviter)?;
        self.settle();
        Ok(())
    }

    /// Remove `target` from the requester's faction. Founder only.
    pub fn kick(&mut self, requester: &PlayerId, target: &PlayerId) -> Result<(), ProgressionError> {
        let faction = self.founded_faction(requester)?;
        if requester == target {
            return Err(ProgressionError::CannotKickSelf);
        }
        if !self
            .directory
            .get_by_id(&faction)
            .is_some_and(|f| f.is_member(target))
        {
            return Err(ProgressionError::NotAMember {
                player: target.clone(),
                faction,
            });
        }
        info!(faction = %faction, founder = %requester, player = %target, "Member kicked");
        self.depart(target, &faction);
        self.settle();
        Ok(())
    }

    pub fn transfer_founder(
        &mut self,
        requester: &PlayerId,
        successor: &PlayerId,
    ) -> Result<(), ProgressionError> {
        let faction = self.requester_faction(requester)?;
        self.directory
            .transfer_founder(&faction, requester, successor)?;
        self.settle();
        Ok(())
    }

    pub fn set_public(&mut self, requester: &PlayerId, is_public: bool) -> Result<(), ProgressionError> {
        let faction = self.requester_faction(requester)?;
        self.directory.set_public(&faction, requester, is_public)?;
        self.settle();
        Ok(())
    }

    /// Dissolve the requester's faction. Founder only.
    ///
    /// Every member leaves through the normal leave flow, the founder last,
    /// so each pays the switch penalty and the faction's prestige record is
    /// dropped with it.
    pub fn disband(&mut self, requester: &PlayerId) -> Result<FactionId, ProgressionError> {
        let faction = self.founded_faction(requester)?;
        let members: Vec<PlayerId> = self
            .directory
            .get_by_id(&faction)
            .map(|f| f.members().to_vec())
            .unwrap_or_default();
        for member in members.iter().filter(|member| *member != requester) {
            self.depart(member, &faction);
        }
        self.depart(requester, &faction);
        if self.directory.contains(&faction) {
            warn!(
                target: "pantheon::faction",
                faction = %faction,
                "Faction still present after all members left, deleting"
            );
            self.directory.delete(&faction, requester)?;
        }
        self.settle();
        Ok(faction)
    }

    // -- Helpers --

    /// Remove `player` from `faction` through the leave flow when their record
    /// is loaded, or from the directory alone when it is not.
    fn depart(&mut self, player: &PlayerId, faction: &FactionId) {
        let loaded_here = self
            .players
            .get(player)
            .is_some_and(|record| record.faction() == Some(faction));
        if loaded_here {
            self.players.leave_faction(player, &mut self.directory);
        } else {
            self.directory.remove_member(faction, player);
        }
    }

    fn requester_faction(&self, requester: &PlayerId) -> Result<FactionId, ProgressionError> {
        self.directory
            .get_by_player(requester)
            .map(|faction| faction.id().clone())
            .ok_or_else(|| ProgressionError::NotInFaction(requester.clone()))
    }

    fn founded_faction(&self, requester: &PlayerId) -> Result<FactionId, ProgressionError> {
        let faction = self
            .directory
            .get_by_player(requester)
            .ok_or_else(|| ProgressionError::NotInFaction(requester.clone()))?;
        if !faction.is_founder(requester) {
            return Err(ProgressionError::NotFounder {
                faction: faction.id().clone(),
            });
        }
        Ok(faction.id().clone())
    }

    fn ensure_can_switch(&self, player: &PlayerId) -> Result<(), ProgressionError> {
        match self.switch_cooldown_remaining(player) {
            Some(remaining) if remaining > chrono::TimeDelta::zero() => {
                let remaining_hours = (remaining.num_seconds() + 3_599) / 3_600;
                Err(ProgressionError::SwitchCooldown { remaining_hours })
            }
            _ => Ok(()),
        }
    }
}
