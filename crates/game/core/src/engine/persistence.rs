//! Capturing and restoring engine state as snapshots.

use tracing::{debug, warn};

use super::ProgressionEngine;
use crate::ids::PlayerId;
use crate::snapshot::{FactionSnapshot, FactionsSnapshot, PlayerSnapshot};

impl ProgressionEngine {
    pub fn snapshot_player(&self, player: &PlayerId) -> Option<PlayerSnapshot> {
        self.players.get(player).map(PlayerSnapshot::from)
    }

    /// Load a player's record.
    ///
    /// A record pointing at a faction that no longer exists, or that no longer
    /// lists the player, is detached from it with the switch penalty applied.
    pub fn restore_player(&mut self, snapshot: PlayerSnapshot) {
        let player = snapshot.player.clone();
        self.players.restore(snapshot.into());
        self.modifiers.invalidate_player(&player);

        let claimed = self
            .players
            .get(&player)
            .and_then(|record| record.faction().cloned());
        if let Some(claimed) = claimed {
            match self.directory.get_by_id(&claimed) {
                Some(faction) if faction.is_member(&player) => {
                    let deity = faction.deity().clone();
                    self.players.get_or_create(&player).active_deity = Some(deity);
                }
                _ => {
                    warn!(
                        target: "pantheon::persistence",
                        player = %player,
                        faction = %claimed,
                        "Stored faction no longer includes player, detaching"
                    );
                    self.players.detach(&player);
                }
            }
        }
        debug!(player = %player, "Player progression restored");
        self.settle();
    }

    pub fn snapshot_factions(&self) -> FactionsSnapshot {
        FactionsSnapshot {
            next_id: self.directory.id_sequence(),
            factions: self
                .directory
                .list()
                .into_iter()
                .map(|faction| FactionSnapshot::capture(faction, self.factions.get(faction.id())))
                .collect(),
            invitations: self.directory.all_invitations(),
        }
    }

    /// Load every faction. Records that break faction invariants are skipped.
    ///
    /// Returns the number of factions restored.
    pub fn restore_factions(&mut self, snapshot: FactionsSnapshot) -> usize {
        let mut restored = 0;
        for record in snapshot.factions {
            let id = record.id.clone();
            let Some((faction, progression)) = record.into_parts() else {
                warn!(
                    target: "pantheon::persistence",
                    faction = %id,
                    "Skipping stored faction with no members or no deity"
                );
                continue;
            };
            self.modifiers.invalidate_faction(&id);
            self.directory.restore(faction);
            self.factions.restore(progression);
            restored += 1;
        }
        for (player, faction) in snapshot.invitations {
            if self.directory.contains(&faction) {
                self.directory.restore_invitation(player, faction);
            }
        }
        self.directory.set_id_sequence(snapshot.next_id);
        debug!(factions = restored, "Factions restored");
        self.settle();
        restored
    }
}
