//! Stat modifier resolution.
//!
//! Unlocked capabilities contribute additive stat deltas. The
//! [`ModifierResolutionCache`] folds them per player and per faction and
//! pushes the combined result to the game through a [`StatSink`].

mod cache;

pub use cache::{ModifierResolutionCache, ModifierSources};

use crate::capability::StatDeltas;
use crate::ids::PlayerId;

/// Receiver of stat modifiers on live game entities.
///
/// Implemented by the host game; modifier ids are namespaced per player
/// (see [`modifier_id`]) so they never clash with other systems.
pub trait StatSink {
    fn set(&mut self, entity: &PlayerId, stat_key: &str, modifier_id: &str, value: f64);

    fn remove(&mut self, entity: &PlayerId, stat_key: &str, modifier_id: &str);
}

/// Fold `extra` into `base`, summing values under the same key.
pub fn combine_modifiers(base: &mut StatDeltas, extra: &StatDeltas) {
    for (key, delta) in extra {
        *base.entry(key.clone()).or_insert(0.0) += delta;
    }
}

/// Modifier id under which a player's combined modifiers are applied.
pub fn modifier_id(player: &PlayerId) -> String {
    format!("pantheon:{player}")
}
