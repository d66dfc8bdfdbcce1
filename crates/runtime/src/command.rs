//! Player-issued commands and their human-readable replies.
//!
//! Commands are what a chat or UI layer sends on behalf of a player. Each one
//! maps to a single engine operation; failures come back as
//! [`ProgressionError`] whose `Display` text can be shown to the player as is.

use pantheon_core::{
    CapabilityId, DeityId, FactionId, PlayerId, ProgressionEngine, ProgressionError, RankLadder,
    Scope,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CreateFaction {
        name: String,
        deity: DeityId,
        #[serde(default)]
        is_public: bool,
    },
    /// Join by faction id, or by name when no faction has that id.
    Join {
        faction: String,
    },
    Leave,
    Invite {
        target: PlayerId,
    },
    Kick {
        target: PlayerId,
    },
    TransferFounder {
        target: PlayerId,
    },
    SetPublic {
        is_public: bool,
    },
    Disband,
    /// Unlock a capability; the catalog decides whether it is player or faction scope.
    Unlock {
        capability: CapabilityId,
    },
    Status,
    Capabilities,
}

impl Command {
    /// Run the command for `player` and describe the result.
    pub fn execute(
        &self,
        engine: &mut ProgressionEngine,
        player: &PlayerId,
    ) -> Result<String, ProgressionError> {
        match self {
            Command::CreateFaction {
                name,
                deity,
                is_public,
            } => {
                let id = engine.create_faction(player, name, deity, *is_public)?;
                Ok(format!("Founded {name} ({id})."))
            }
            Command::Join { faction } => {
                let id = FactionId::from(faction.as_str());
                let id = if engine.faction(&id).is_some() {
                    engine.join_faction(player, &id)?;
                    id
                } else {
                    engine.join_faction_by_name(player, faction)?
                };
                let name = engine
                    .faction(&id)
                    .map(|faction| faction.name().to_owned())
                    .unwrap_or_else(|| id.to_string());
                Ok(format!("You joined {name}."))
            }
            Command::Leave => {
                let id = engine.leave_faction(player)?;
                Ok(format!("You left {id}. Your favor and blessings are gone."))
            }
            Command::Invite { target: invitee } => {
                engine.invite(player, invitee)?;
                Ok(format!("Invited {invitee}."))
            }
            Command::Kick { target } => {
                engine.kick(player, target)?;
                Ok(format!("Removed {target} from the faction."))
            }
            Command::TransferFounder { target: successor } => {
                engine.transfer_founder(player, successor)?;
                Ok(format!("{successor} now leads the faction."))
            }
            Command::SetPublic { is_public } => {
                engine.set_public(player, *is_public)?;
                Ok(if *is_public {
                    "Your faction is now open to anyone.".to_owned()
                } else {
                    "Your faction now requires an invitation.".to_owned()
                })
            }
            Command::Disband => {
                let id = engine.disband(player)?;
                Ok(format!("Disbanded {id}."))
            }
            Command::Unlock { capability } => {
                let scope = engine.catalog().get(capability).map(|found| found.scope);
                match scope {
                    Some(Scope::Faction) => engine.unlock_faction_capability(player, capability)?,
                    _ => engine.unlock_player_capability(player, capability)?,
                }
                let name = engine
                    .catalog()
                    .get(capability)
                    .map(|found| found.name.clone())
                    .unwrap_or_else(|| capability.to_string());
                Ok(format!("Unlocked {name}."))
            }
            Command::Status => Ok(status(engine, player)),
            Command::Capabilities => Ok(capabilities(engine, player)),
        }
    }
}

fn status(engine: &ProgressionEngine, player: &PlayerId) -> String {
    let Some(faction) = engine.faction_of(player) else {
        return "You follow no deity.".to_owned();
    };
    let progress = engine.player_progress(player);
    let favor = engine.player(player).map(|record| record.favor()).unwrap_or(0);
    let deity = engine
        .deities()
        .get(faction.deity())
        .map(|descriptor| descriptor.name.clone())
        .unwrap_or_else(|| faction.deity().to_string());
    let mut lines = vec![
        format!("{} follower of {deity}", progress.rank),
        format!("Faction: {} ({} members)", faction.name(), faction.member_count()),
        format!("Favor: {favor} (lifetime {})", progress.current),
    ];
    if !progress.rank.is_max() {
        lines.push(format!(
            "{} more favor to reach {}",
            progress.remaining(),
            progress.next_rank
        ));
    }
    let prestige = engine.faction_progress(faction.id());
    lines.push(format!(
        "Faction prestige: {} ({})",
        prestige.current, prestige.rank
    ));
    lines.join("\n")
}

fn capabilities(engine: &ProgressionEngine, player: &PlayerId) -> String {
    let listings = engine.available_capabilities(player);
    if listings.is_empty() {
        return "No blessings available. Join a faction first.".to_owned();
    }
    listings
        .iter()
        .map(|listing| {
            let status = match &listing.status {
                Ok(()) => "available".to_owned(),
                Err(reason) => reason.to_string(),
            };
            format!(
                "[{}] {} ({}, {}): {status}",
                listing.capability.scope, listing.capability.name, listing.capability.id,
                listing.capability.required_rank_label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_json() {
        let command: Command = serde_json::from_str(
            r#"{"command":"create_faction","name":"Red Tide","deity":"khoras"}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            Command::CreateFaction {
                name: "Red Tide".into(),
                deity: DeityId::from("khoras"),
                is_public: false,
            }
        );
        let leave: Command = serde_json::from_str(r#"{"command":"leave"}"#).unwrap();
        assert_eq!(leave, Command::Leave);
    }
}
