//! Flat registry of every capability, populated once at startup.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, warn};

use super::eligibility::{self, Ineligibility};
use super::{Capability, Scope};
use crate::faction::FactionView;
use crate::ids::{CapabilityId, DeityId};
use crate::player::PlayerProgression;

/// Content authoring problems found by [`CapabilityCatalog::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogIssue {
    #[error("'{capability}' requires unknown capability '{prerequisite}'")]
    MissingPrerequisite {
        capability: CapabilityId,
        prerequisite: CapabilityId,
    },

    #[error("'{capability}' requires '{prerequisite}' from a different scope")]
    ScopeMismatch {
        capability: CapabilityId,
        prerequisite: CapabilityId,
    },

    #[error("'{capability}' requires '{prerequisite}' from a different deity")]
    DeityMismatch {
        capability: CapabilityId,
        prerequisite: CapabilityId,
    },

    #[error("prerequisite cycle through '{0}'")]
    Cycle(CapabilityId),
}

#[derive(Clone, Debug, Default)]
pub struct CapabilityCatalog {
    capabilities: HashMap<CapabilityId, Capability>,
}

impl CapabilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Returns false (and logs) for an empty id.
    /// A duplicate id overwrites the earlier entry.
    pub fn register(&mut self, capability: Capability) -> bool {
        if capability.id.is_empty() {
            error!(
                target: "pantheon::capability",
                name = %capability.name,
                "Refusing to register capability with an empty id"
            );
            return false;
        }
        let id = capability.id.clone();
        if self.capabilities.insert(id.clone(), capability).is_some() {
            warn!(
                target: "pantheon::capability",
                capability = %id,
                "Capability registered twice, overwriting previous entry"
            );
        } else {
            debug!(capability = %id, "Registered capability");
        }
        true
    }

    pub fn get(&self, id: &CapabilityId) -> Option<&Capability> {
        self.capabilities.get(id)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Every capability, ordered by id.
    pub fn all(&self) -> Vec<&Capability> {
        let mut all: Vec<_> = self.capabilities.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Capabilities of one deity, optionally restricted to a scope.
    ///
    /// Ordered by required favor rank, then required prestige rank, then id.
    pub fn list_for_deity(&self, deity: &DeityId, scope: Option<Scope>) -> Vec<&Capability> {
        let mut listed: Vec<_> = self
            .capabilities
            .values()
            .filter(|capability| &capability.deity == deity)
            .filter(|capability| scope.is_none_or(|scope| capability.scope == scope))
            .collect();
        listed.sort_by(|a, b| {
            a.required_favor_rank
                .cmp(&b.required_favor_rank)
                .then(a.required_prestige_rank.cmp(&b.required_prestige_rank))
                .then_with(|| a.id.cmp(&b.id))
        });
        listed
    }

    /// Whether `id` can be unlocked for `player` (player scope) or for the
    /// player's faction (faction scope). The first failing check is reported.
    pub fn eligibility(
        &self,
        player: &PlayerProgression,
        faction: Option<FactionView<'_>>,
        id: &CapabilityId,
    ) -> Result<(), Ineligibility> {
        eligibility::evaluate(self.get(id), player, faction)
    }

    /// Transitive prerequisites of `id`, deepest first, without duplicates.
    /// Unknown ids contribute nothing.
    pub fn prerequisite_chain(&self, id: &CapabilityId) -> Vec<CapabilityId> {
        let mut chain = Vec::new();
        let mut visiting = HashSet::new();
        self.collect_chain(id, &mut chain, &mut visiting);
        chain
    }

    fn collect_chain(
        &self,
        id: &CapabilityId,
        chain: &mut Vec<CapabilityId>,
        visiting: &mut HashSet<CapabilityId>,
    ) {
        let Some(capability) = self.capabilities.get(id) else {
            return;
        };
        if !visiting.insert(id.clone()) {
            return;
        }
        for prerequisite in &capability.prerequisites {
            self.collect_chain(prerequisite, chain, visiting);
            if !chain.contains(prerequisite) && self.capabilities.contains_key(prerequisite) {
                chain.push(prerequisite.clone());
            }
        }
    }

    /// Check prerequisite references: they must exist, share scope and deity,
    /// and form no cycles.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for capability in self.all() {
            for prerequisite in &capability.prerequisites {
                let Some(required) = self.capabilities.get(prerequisite) else {
                    issues.push(CatalogIssue::MissingPrerequisite {
                        capability: capability.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                    continue;
                };
                if required.scope != capability.scope {
                    issues.push(CatalogIssue::ScopeMismatch {
                        capability: capability.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
                if required.deity != capability.deity {
                    issues.push(CatalogIssue::DeityMismatch {
                        capability: capability.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        let mut done = HashSet::new();
        for capability in self.all() {
            let mut path = Vec::new();
            if let Some(cycle) = self.find_cycle(&capability.id, &mut path, &mut done) {
                if !issues.contains(&CatalogIssue::Cycle(cycle.clone())) {
                    issues.push(CatalogIssue::Cycle(cycle));
                }
            }
        }
        issues
    }

    fn find_cycle(
        &self,
        id: &CapabilityId,
        path: &mut Vec<CapabilityId>,
        done: &mut HashSet<CapabilityId>,
    ) -> Option<CapabilityId> {
        if path.contains(id) {
            return Some(id.clone());
        }
        if done.contains(id) {
            return None;
        }
        let capability = self.capabilities.get(id)?;
        path.push(id.clone());
        for prerequisite in &capability.prerequisites {
            if let Some(cycle) = self.find_cycle(prerequisite, path, done) {
                return Some(cycle);
            }
        }
        path.pop();
        done.insert(id.clone());
        None
    }
}
