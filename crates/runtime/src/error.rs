//! Unified error types surfaced by the runtime API.
//!
//! Wraps repository failures and build-time misconfiguration so hosts can
//! bubble them up with consistent context. Caller mistakes inside the game
//! (unknown faction, cooldown, ineligible unlock) stay as
//! [`pantheon_core::ProgressionError`] values and never become a
//! `RuntimeError`.

use std::fmt;

use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a {0} before building")]
    MissingCollaborator(Collaborator),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("handler '{handler}' failed")]
    Handler {
        handler: &'static str,
        #[source]
        source: Box<RuntimeError>,
    },
}

/// Collaborators the runtime cannot start without.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collaborator {
    Content,
    WorldStorage,
    NotificationChannel,
    StatSink,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Collaborator::Content => "content bundle",
            Collaborator::WorldStorage => "world storage",
            Collaborator::NotificationChannel => "notification channel",
            Collaborator::StatSink => "stat sink",
        };
        write!(f, "{}", label)
    }
}
