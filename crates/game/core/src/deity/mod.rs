//! Deities and the relationships between them.
//!
//! Deity descriptors are static content registered once at startup. The
//! [`DeityRelationshipGraph`] answers relationship and reward-multiplier
//! queries; unknown deities resolve to neutral rather than failing.

mod graph;

pub use graph::DeityRelationshipGraph;

use std::collections::HashMap;

use crate::ids::DeityId;

/// Stance of one deity toward another. Absence from a relationship table
/// means [`RelationshipKind::Neutral`].
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RelationshipKind {
    Allied,
    Rival,
    #[default]
    Neutral,
}

impl RelationshipKind {
    /// Scaling applied to PvP rewards when a follower of one deity kills a
    /// follower of the other.
    pub const fn favor_multiplier(self) -> f64 {
        match self {
            RelationshipKind::Allied => 0.5,
            RelationshipKind::Rival => 2.0,
            RelationshipKind::Neutral => 1.0,
        }
    }
}

/// Sphere of influence of a deity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Domain {
    War,
    Hunt,
    Death,
    Light,
    Shadows,
    Storms,
    Earth,
    Madness,
}

/// Moral leaning of a deity, shown in faction listings.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Alignment {
    Benevolent,
    Neutral,
    Malevolent,
    Capricious,
}

/// Static description of a deity. Immutable after registration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeityDescriptor {
    pub id: DeityId,
    pub name: String,
    pub domain: Domain,
    pub alignment: Alignment,
    /// Display colors as `#RRGGBB`.
    pub primary_color: String,
    pub secondary_color: String,
    /// Only allied and rival entries are stored; everything else is neutral.
    #[cfg_attr(feature = "serde", serde(default))]
    pub relationships: HashMap<DeityId, RelationshipKind>,
    /// Combat abilities granted to followers. Executed outside this crate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<String>,
}

impl DeityDescriptor {
    pub fn new(id: impl Into<DeityId>, name: impl Into<String>, domain: Domain) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            domain,
            alignment: Alignment::Neutral,
            primary_color: "#FFFFFF".into(),
            secondary_color: "#000000".into(),
            relationships: HashMap::new(),
            abilities: Vec::new(),
        }
    }

    /// Builder helper for tests and content authoring.
    #[must_use]
    pub fn with_relationship(mut self, other: impl Into<DeityId>, kind: RelationshipKind) -> Self {
        self.relationships.insert(other.into(), kind);
        self
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Stance toward `other` as authored in this descriptor.
    pub fn relationship_to(&self, other: &DeityId) -> RelationshipKind {
        self.relationships
            .get(other)
            .copied()
            .unwrap_or(RelationshipKind::Neutral)
    }
}
