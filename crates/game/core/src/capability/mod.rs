//! Unlockable capabilities (blessings) and the rules that gate them.
//!
//! A capability belongs to one deity and one [`Scope`]. Player-scope
//! capabilities are gated by favor rank and unlocked per player; faction-scope
//! capabilities are gated by prestige rank and unlocked per faction. Each
//! carries additive stat deltas folded by [`crate::modifiers`].

mod catalog;
mod eligibility;

pub use catalog::{CapabilityCatalog, CatalogIssue};
pub use eligibility::Ineligibility;

use std::collections::BTreeMap;

use crate::ids::{CapabilityId, DeityId};
use crate::rank::{FavorRank, PrestigeRank};

/// Additive stat deltas keyed by stat name.
pub type StatDeltas = BTreeMap<String, f64>;

/// Who owns an unlock.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Scope {
    Player,
    Faction,
}

/// Presentation grouping for capability listings.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum CapabilityCategory {
    Offense,
    Defense,
    Mobility,
    #[default]
    Utility,
}

/// An unlockable bundle of stat deltas.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capability {
    pub id: CapabilityId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub scope: Scope,
    pub deity: DeityId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: CapabilityCategory,
    /// Only meaningful for [`Scope::Player`], still used as a sort key.
    #[cfg_attr(feature = "serde", serde(default))]
    pub required_favor_rank: FavorRank,
    /// Only meaningful for [`Scope::Faction`], still used as a sort key.
    #[cfg_attr(feature = "serde", serde(default))]
    pub required_prestige_rank: PrestigeRank,
    /// Capabilities of the same scope that must be unlocked first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prerequisites: Vec<CapabilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stat_modifiers: StatDeltas,
    /// Opaque tags interpreted by the game, not by this crate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub special_effects: Vec<String>,
}

impl Capability {
    pub fn new(
        id: impl Into<CapabilityId>,
        name: impl Into<String>,
        scope: Scope,
        deity: impl Into<DeityId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            scope,
            deity: deity.into(),
            category: CapabilityCategory::default(),
            required_favor_rank: FavorRank::default(),
            required_prestige_rank: PrestigeRank::default(),
            prerequisites: Vec::new(),
            stat_modifiers: StatDeltas::new(),
            special_effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_favor_rank(mut self, rank: FavorRank) -> Self {
        self.required_favor_rank = rank;
        self
    }

    #[must_use]
    pub fn with_prestige_rank(mut self, rank: PrestigeRank) -> Self {
        self.required_prestige_rank = rank;
        self
    }

    #[must_use]
    pub fn with_prerequisite(mut self, id: impl Into<CapabilityId>) -> Self {
        self.prerequisites.push(id.into());
        self
    }

    #[must_use]
    pub fn with_stat(mut self, key: impl Into<String>, delta: f64) -> Self {
        *self.stat_modifiers.entry(key.into()).or_insert(0.0) += delta;
        self
    }

    /// Label of the rank this capability requires for its scope.
    pub fn required_rank_label(&self) -> String {
        match self.scope {
            Scope::Player => self.required_favor_rank.to_string(),
            Scope::Faction => self.required_prestige_rank.to_string(),
        }
    }
}
