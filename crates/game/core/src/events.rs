//! Progression events published by the stores.
//!
//! Every store keeps an outbox of [`ProgressionEvent`]s. The engine drains the
//! outboxes at the end of each mutating call, performs cache invalidation, and
//! only then exposes the events to the runtime. Subscribers therefore never
//! observe a modifier map older than the event they are handling.

use crate::ids::{CapabilityId, DeityId, FactionId, PlayerId};
use crate::rank::{FavorRank, PrestigeRank};

/// Something that changed in progression state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ProgressionEvent {
    /// A player's favor totals changed ("data changed").
    FavorChanged {
        player: PlayerId,
        favor: u32,
        lifetime: u32,
        reason: String,
    },

    FavorRankIncreased {
        player: PlayerId,
        from: FavorRank,
        to: FavorRank,
    },

    PrestigeChanged {
        faction: FactionId,
        prestige: u32,
        lifetime: u32,
        reason: String,
    },

    /// Carries the members at the time of promotion so each can be told.
    PrestigeRankIncreased {
        faction: FactionId,
        faction_name: String,
        from: PrestigeRank,
        to: PrestigeRank,
        members: Vec<PlayerId>,
    },

    FactionCreated {
        faction: FactionId,
        name: String,
        deity: DeityId,
        founder: PlayerId,
    },

    PlayerJoinedFaction {
        player: PlayerId,
        faction: FactionId,
    },

    PlayerLeftFaction {
        player: PlayerId,
        faction: FactionId,
    },

    FounderChanged {
        faction: FactionId,
        founder: PlayerId,
    },

    /// The faction has no members left or was deleted by its founder.
    FactionDisbanded {
        faction: FactionId,
        name: String,
    },

    InvitationSent {
        faction: FactionId,
        player: PlayerId,
        inviter: PlayerId,
    },

    PlayerCapabilityUnlocked {
        player: PlayerId,
        capability: CapabilityId,
    },

    FactionCapabilityUnlocked {
        faction: FactionId,
        capability: CapabilityId,
    },

    /// A message addressed to one player.
    Message(Notice),
}

/// Text addressed to a single player through the notification channel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notice {
    pub player: PlayerId,
    pub text: String,
}

impl Notice {
    pub fn new(player: PlayerId, text: impl Into<String>) -> Self {
        Self {
            player,
            text: text.into(),
        }
    }
}

impl ProgressionEvent {
    /// Player-facing messages this event produces.
    pub fn notices(&self) -> Vec<Notice> {
        match self {
            ProgressionEvent::FavorRankIncreased { player, to, .. } => vec![Notice::new(
                player.clone(),
                format!("You have reached the rank of {to}!"),
            )],
            ProgressionEvent::PrestigeRankIncreased {
                faction_name,
                to,
                members,
                ..
            } => members
                .iter()
                .map(|member| {
                    Notice::new(
                        member.clone(),
                        format!("{faction_name} has become {to}!"),
                    )
                })
                .collect(),
            ProgressionEvent::InvitationSent {
                player, inviter, ..
            } => vec![Notice::new(
                player.clone(),
                format!("{inviter} invited you to join their faction."),
            )],
            ProgressionEvent::Message(notice) => vec![notice.clone()],
            _ => Vec::new(),
        }
    }

    /// Player whose combined modifiers may have changed, if any.
    pub fn affected_player(&self) -> Option<&PlayerId> {
        match self {
            ProgressionEvent::PlayerJoinedFaction { player, .. }
            | ProgressionEvent::PlayerLeftFaction { player, .. }
            | ProgressionEvent::PlayerCapabilityUnlocked { player, .. } => Some(player),
            _ => None,
        }
    }
}
