//! Ordered eligibility chain for unlocking a capability.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. capability exists
//! 2. owner is in a faction
//! 3. not already unlocked
//! 4. rank threshold met
//! 5. deity matches
//! 6. prerequisites unlocked (first unmet one in list order is reported)

use std::collections::BTreeSet;

use super::{Capability, Scope};
use crate::faction::FactionView;
use crate::ids::{CapabilityId, DeityId};
use crate::player::PlayerProgression;
use crate::rank::{FavorRank, PrestigeRank};

/// Why a capability cannot be unlocked. The `Display` form is shown to players.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ineligibility {
    #[error("not found")]
    NotFound,

    #[error("not in a faction")]
    NotInFaction,

    #[error("already unlocked")]
    AlreadyUnlocked,

    #[error("requires rank {0}")]
    RequiresFavorRank(FavorRank),

    #[error("requires rank {0}")]
    RequiresPrestigeRank(PrestigeRank),

    #[error("requires deity {0}")]
    RequiresDeity(DeityId),

    #[error("requires prerequisite {0}")]
    RequiresPrerequisite(CapabilityId),
}

impl Ineligibility {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "CAPABILITY_NOT_FOUND",
            Self::NotInFaction => "CAPABILITY_NOT_IN_FACTION",
            Self::AlreadyUnlocked => "CAPABILITY_ALREADY_UNLOCKED",
            Self::RequiresFavorRank(_) | Self::RequiresPrestigeRank(_) => {
                "CAPABILITY_RANK_TOO_LOW"
            }
            Self::RequiresDeity(_) => "CAPABILITY_WRONG_DEITY",
            Self::RequiresPrerequisite(_) => "CAPABILITY_MISSING_PREREQUISITE",
        }
    }
}

/// Unlock state and standing of whoever would own the unlock.
struct Owner<'a> {
    unlocked: &'a BTreeSet<CapabilityId>,
    deity: Option<&'a DeityId>,
    rank_met: bool,
}

/// Evaluate the chain for an already resolved capability.
pub(super) fn evaluate(
    capability: Option<&Capability>,
    player: &PlayerProgression,
    faction: Option<FactionView<'_>>,
) -> Result<(), Ineligibility> {
    let capability = capability.ok_or(Ineligibility::NotFound)?;

    let owner = match capability.scope {
        Scope::Player => {
            if player.faction().is_none() {
                return Err(Ineligibility::NotInFaction);
            }
            Owner {
                unlocked: player.unlocked(),
                deity: player.active_deity(),
                rank_met: player.favor_rank() >= capability.required_favor_rank,
            }
        }
        Scope::Faction => {
            let view = faction.ok_or(Ineligibility::NotInFaction)?;
            Owner {
                unlocked: view.progression.unlocked(),
                deity: Some(view.faction.deity()),
                rank_met: view.progression.prestige_rank() >= capability.required_prestige_rank,
            }
        }
    };

    if owner.unlocked.contains(&capability.id) {
        return Err(Ineligibility::AlreadyUnlocked);
    }

    if !owner.rank_met {
        return Err(match capability.scope {
            Scope::Player => Ineligibility::RequiresFavorRank(capability.required_favor_rank),
            Scope::Faction => {
                Ineligibility::RequiresPrestigeRank(capability.required_prestige_rank)
            }
        });
    }

    if owner.deity != Some(&capability.deity) {
        return Err(Ineligibility::RequiresDeity(capability.deity.clone()));
    }

    if let Some(missing) = capability
        .prerequisites
        .iter()
        .find(|prerequisite| !owner.unlocked.contains(*prerequisite))
    {
        return Err(Ineligibility::RequiresPrerequisite(missing.clone()));
    }

    Ok(())
}
