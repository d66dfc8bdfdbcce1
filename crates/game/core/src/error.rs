//! Common error infrastructure for pantheon-core.
//!
//! Caller and input errors are returned as values so command and UI layers can
//! render the reason directly. Nothing in this crate panics on bad input.
//!
//! # Design Principles
//!
//! - **Human-readable**: every `Display` string is safe to show to a player
//! - **Severity Classification**: errors are categorized for logging priority
//! - **Stable codes**: [`CoreError::error_code`] never changes between releases

use crate::capability::Ineligibility;
use crate::ids::{CapabilityId, DeityId, FactionId, PlayerId};

/// Severity level of an error, used for categorization and logging.
///
/// - **Recoverable**: the same request may succeed later (e.g. a cooldown)
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Retry after time passes or state changes.
    ///
    /// Examples: faction switch cooldown still running
    Recoverable,

    /// Invalid input, should not retry without changes.
    ///
    /// Examples: unknown faction, duplicate faction name, "none" deity
    Validation,

    /// Internal state inconsistency. These indicate bugs.
    ///
    /// Examples: a member listed in a faction without a progression record
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all pantheon-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for error categorization, metrics, and testing.
    fn error_code(&self) -> &'static str;
}

/// Errors surfaced by progression operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    /// Factions must be founded for a real deity.
    #[error("a faction must follow a deity, '{0}' is not allowed")]
    InvalidDeity(DeityId),

    /// The deity id is not registered in the relationship graph.
    #[error("unknown deity '{0}'")]
    UnknownDeity(DeityId),

    #[error("faction name must not be empty")]
    EmptyName,

    #[error("a faction named '{0}' already exists")]
    DuplicateName(String),

    #[error("faction '{0}' not found")]
    FactionNotFound(FactionId),

    #[error("player '{0}' is not in a faction")]
    NotInFaction(PlayerId),

    #[error("player '{player}' is already a member of '{faction}'")]
    AlreadyInFaction { player: PlayerId, faction: FactionId },

    #[error("player '{player}' is not a member of '{faction}'")]
    NotAMember { player: PlayerId, faction: FactionId },

    #[error("only the founder of '{faction}' can do that")]
    NotFounder { faction: FactionId },

    #[error("'{faction}' is invite-only")]
    InviteRequired { faction: FactionId },

    #[error("you can switch factions again in {remaining_hours}h")]
    SwitchCooldown { remaining_hours: i64 },

    #[error("the founder cannot remove themselves, leave the faction instead")]
    CannotKickSelf,

    #[error("cannot unlock '{capability}': {reason}")]
    Ineligible {
        capability: CapabilityId,
        reason: Ineligibility,
    },

    #[error("not enough favor: {available} available, {required} required")]
    InsufficientFavor { available: u32, required: u32 },
}

impl CoreError for ProgressionError {
    fn severity(&self) -> ErrorSeverity {
        use ProgressionError::*;
        match self {
            SwitchCooldown { .. } | InsufficientFavor { .. } => ErrorSeverity::Recoverable,
            InvalidDeity(_)
            | UnknownDeity(_)
            | EmptyName
            | DuplicateName(_)
            | FactionNotFound(_)
            | NotInFaction(_)
            | AlreadyInFaction { .. }
            | NotAMember { .. }
            | NotFounder { .. }
            | InviteRequired { .. }
            | CannotKickSelf
            | Ineligible { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use ProgressionError::*;
        match self {
            InvalidDeity(_) => "FACTION_INVALID_DEITY",
            UnknownDeity(_) => "DEITY_UNKNOWN",
            EmptyName => "FACTION_EMPTY_NAME",
            DuplicateName(_) => "FACTION_DUPLICATE_NAME",
            FactionNotFound(_) => "FACTION_NOT_FOUND",
            NotInFaction(_) => "PLAYER_NOT_IN_FACTION",
            AlreadyInFaction { .. } => "PLAYER_ALREADY_IN_FACTION",
            NotAMember { .. } => "PLAYER_NOT_A_MEMBER",
            NotFounder { .. } => "FACTION_NOT_FOUNDER",
            InviteRequired { .. } => "FACTION_INVITE_REQUIRED",
            SwitchCooldown { .. } => "PLAYER_SWITCH_COOLDOWN",
            CannotKickSelf => "FACTION_CANNOT_KICK_SELF",
            Ineligible { reason, .. } => reason.error_code(),
            InsufficientFavor { .. } => "PLAYER_INSUFFICIENT_FAVOR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_is_recoverable() {
        let err = ProgressionError::SwitchCooldown { remaining_hours: 5 };
        assert!(err.severity().is_recoverable());
        assert_eq!(err.to_string(), "you can switch factions again in 5h");
    }

    #[test]
    fn ineligible_reuses_reason_code() {
        let err = ProgressionError::Ineligible {
            capability: CapabilityId::from("khoras_battle_fury"),
            reason: Ineligibility::AlreadyUnlocked,
        };
        assert_eq!(err.error_code(), "CAPABILITY_ALREADY_UNLOCKED");
        assert_eq!(
            err.to_string(),
            "cannot unlock 'khoras_battle_fury': already unlocked"
        );
    }
}
