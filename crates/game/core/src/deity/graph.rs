//! Registry of deity descriptors and their pairwise relationships.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{DeityDescriptor, RelationshipKind};
use crate::ids::DeityId;

/// Registry of deities. Relationships are looked up from the first deity's
/// table; storage need not be symmetric, but content should be authored so.
#[derive(Clone, Debug, Default)]
pub struct DeityRelationshipGraph {
    deities: HashMap<DeityId, DeityDescriptor>,
}

impl DeityRelationshipGraph {
    pub fn new() -> Self {
        Self {
            deities: HashMap::new(),
        }
    }

    /// Register a deity. A duplicate id overwrites the earlier descriptor.
    pub fn register(&mut self, descriptor: DeityDescriptor) {
        let id = descriptor.id.clone();
        if self.deities.insert(id.clone(), descriptor).is_some() {
            warn!(
                target: "pantheon::deity",
                deity = %id,
                "Deity registered twice, overwriting previous descriptor"
            );
        } else {
            debug!(deity = %id, "Registered deity");
        }
    }

    pub fn get(&self, id: &DeityId) -> Option<&DeityDescriptor> {
        self.deities.get(id)
    }

    pub fn contains(&self, id: &DeityId) -> bool {
        self.deities.contains_key(id)
    }

    /// All registered deities ordered by id.
    pub fn all(&self) -> Vec<&DeityDescriptor> {
        let mut all: Vec<_> = self.deities.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn len(&self) -> usize {
        self.deities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deities.is_empty()
    }

    /// Stance of `a` toward `b`. Self and unknown pairs are neutral.
    pub fn relationship(&self, a: &DeityId, b: &DeityId) -> RelationshipKind {
        if a == b {
            return RelationshipKind::Neutral;
        }
        self.deities
            .get(a)
            .map(|descriptor| descriptor.relationship_to(b))
            .unwrap_or(RelationshipKind::Neutral)
    }

    /// Reward scaling for `attacker` killing a follower of `victim`.
    pub fn favor_multiplier(&self, attacker: &DeityId, victim: &DeityId) -> f64 {
        self.relationship(attacker, victim).favor_multiplier()
    }

    /// Pairs `(a, b)` where `a` lists `b` with a stance `b` does not return.
    ///
    /// Content tooling reports these; gameplay still uses the first deity's view.
    pub fn asymmetric_pairs(&self) -> Vec<(DeityId, DeityId)> {
        let mut pairs = Vec::new();
        for descriptor in self.all() {
            for (other, kind) in &descriptor.relationships {
                if self.relationship(other, &descriptor.id) != *kind {
                    pairs.push((descriptor.id.clone(), other.clone()));
                }
            }
        }
        pairs.sort();
        pairs
    }
}
