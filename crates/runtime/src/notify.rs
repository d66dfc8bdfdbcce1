//! Notification channels that deliver player-facing text.

use std::sync::{Arc, Mutex, PoisonError};

use pantheon_core::{Notice, PlayerId};
use tracing::info;

/// Delivers a message to one player.
pub trait NotificationChannel: Send + Sync {
    fn send_message(&self, player: &PlayerId, text: &str);
}

/// Writes every message to the log. Used by headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationChannel for LogNotifier {
    fn send_message(&self, player: &PlayerId, text: &str) {
        info!(target: "pantheon::notify", player = %player, "{}", text);
    }
}

/// Collects messages in memory. Clones share the same inbox.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    sent: Arc<Mutex<Vec<Notice>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent to `player`, oldest first.
    pub fn messages_for(&self, player: &PlayerId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|notice| &notice.player == player)
            .map(|notice| notice.text.clone())
            .collect()
    }

    /// Remove and return everything sent so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationChannel for InMemoryNotifier {
    fn send_message(&self, player: &PlayerId, text: &str) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notice::new(player.clone(), text));
    }
}
