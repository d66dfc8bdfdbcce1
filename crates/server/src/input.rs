//! JSON-lines input accepted on stdin.
//!
//! ```text
//! {"type":"player_joined","player":"ada"}
//! {"player":"ada","command":"create_faction","name":"Red Tide","deity":"khoras"}
//! {"type":"player_died","victim":"bob","killer":"ada"}
//! {"type":"tick","delta_secs":60.0}
//! ```

use pantheon_core::PlayerId;
use pantheon_runtime::{Command, GameEvent};
use serde::Deserialize;

/// One line of host input: a game event or a command issued by a player.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Input {
    Command {
        player: PlayerId,
        #[serde(flatten)]
        command: Command,
    },
    Event(GameEvent),
}

impl Input {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinguishes_commands_from_events() {
        assert_eq!(
            Input::parse(r#"{"type":"player_joined","player":"ada"}"#).unwrap(),
            Input::Event(GameEvent::PlayerJoined {
                player: PlayerId::from("ada")
            })
        );
        assert_eq!(
            Input::parse(r#"{"player":"ada","command":"invite","target":"bob"}"#).unwrap(),
            Input::Command {
                player: PlayerId::from("ada"),
                command: Command::Invite {
                    target: PlayerId::from("bob")
                },
            }
        );
        assert_eq!(
            Input::parse(r#"{"player":"ada","command":"set_public","is_public":true}"#).unwrap(),
            Input::Command {
                player: PlayerId::from("ada"),
                command: Command::SetPublic { is_public: true },
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Input::parse("not json").is_err());
        assert!(Input::parse(r#"{"type":"explode"}"#).is_err());
    }
}
