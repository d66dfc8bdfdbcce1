//! Deity-aligned faction progression rules.
//!
//! `pantheon-core` holds the canonical progression model: deities and their
//! relationships, faction membership, favor and prestige ladders, unlockable
//! capabilities, stat modifier resolution, and PvP rewards. It performs no
//! I/O. All state mutation flows through [`engine::ProgressionEngine`], and
//! the runtime and content crates depend on the types re-exported here.
pub mod capability;
pub mod clock;
pub mod combat;
pub mod config;
pub mod deity;
pub mod engine;
pub mod error;
pub mod events;
pub mod faction;
pub mod ids;
pub mod modifiers;
pub mod player;
pub mod rank;
pub mod snapshot;

pub use capability::{
    Capability, CapabilityCatalog, CapabilityCategory, CatalogIssue, Ineligibility, Scope,
    StatDeltas,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use combat::{CombatRewardCalculator, KillOutcome};
pub use config::ProgressionConfig;
pub use deity::{Alignment, DeityDescriptor, DeityRelationshipGraph, Domain, RelationshipKind};
pub use engine::{CapabilityListing, ProgressionEngine};
pub use error::{CoreError, ErrorSeverity, ProgressionError};
pub use events::{Notice, ProgressionEvent};
pub use faction::{
    Faction, FactionMembershipDirectory, FactionProgression, FactionProgressionStore, FactionView,
};
pub use ids::{CapabilityId, DeityId, FactionId, FactionIdGenerator, PlayerId};
pub use modifiers::{ModifierResolutionCache, StatSink, combine_modifiers, modifier_id};
pub use player::{PlayerProgression, PlayerProgressionStore};
pub use rank::{FavorRank, PrestigeRank, RANK_THRESHOLDS, RankLadder, RankProgress};
pub use snapshot::{FactionSnapshot, FactionsSnapshot, PlayerSnapshot};
