//! In-memory entity stat store implementing [`StatSink`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use pantheon_core::{PlayerId, StatSink};

type Slots = BTreeMap<(PlayerId, String), BTreeMap<String, f64>>;

/// Named stat modifiers per entity, as a game host would keep them.
///
/// Each `(entity, stat)` pair holds modifiers by id; the effective delta is
/// their sum. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatSink {
    slots: Arc<Mutex<Slots>>,
}

impl InMemoryStatSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every modifier on `stat_key` for `entity`.
    pub fn total(&self, entity: &PlayerId, stat_key: &str) -> f64 {
        self.lock()
            .get(&(entity.clone(), stat_key.to_owned()))
            .map(|modifiers| modifiers.values().sum())
            .unwrap_or(0.0)
    }

    /// Value of a single named modifier.
    pub fn modifier(&self, entity: &PlayerId, stat_key: &str, modifier_id: &str) -> Option<f64> {
        self.lock()
            .get(&(entity.clone(), stat_key.to_owned()))
            .and_then(|modifiers| modifiers.get(modifier_id).copied())
    }

    /// Stat keys carrying at least one modifier for `entity`.
    pub fn stats_for(&self, entity: &PlayerId) -> Vec<String> {
        self.lock()
            .keys()
            .filter(|(owner, _)| owner == entity)
            .map(|(_, stat)| stat.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatSink for InMemoryStatSink {
    fn set(&mut self, entity: &PlayerId, stat_key: &str, modifier_id: &str, value: f64) {
        self.lock()
            .entry((entity.clone(), stat_key.to_owned()))
            .or_default()
            .insert(modifier_id.to_owned(), value);
    }

    fn remove(&mut self, entity: &PlayerId, stat_key: &str, modifier_id: &str) {
        let mut slots = self.lock();
        let key = (entity.clone(), stat_key.to_owned());
        if let Some(modifiers) = slots.get_mut(&key) {
            modifiers.remove(modifier_id);
            if modifiers.is_empty() {
                slots.remove(&key);
            }
        }
    }
}
