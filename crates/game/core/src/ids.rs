//! String-keyed identifiers for players, factions, deities, and capabilities.
//!
//! Identifiers arrive from the host game as opaque strings. Each kind gets its
//! own newtype so a faction id can never be passed where a player id is
//! expected.

use core::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Stable identifier of a player as reported by the host game.
    PlayerId
);

string_id!(
    /// Generated identifier of a faction. See [`FactionIdGenerator`].
    FactionId
);

string_id!(
    /// Identifier of a registered deity (e.g. `khoras`).
    DeityId
);

string_id!(
    /// Unique key of a capability in the catalog.
    CapabilityId
);

impl DeityId {
    /// Sentinel the host game uses for "no deity".
    pub const UNSET: &'static str = "none";

    /// Returns true for the "none" sentinel or an empty id.
    pub fn is_unset(&self) -> bool {
        self.is_empty() || self.0.eq_ignore_ascii_case(Self::UNSET)
    }
}

/// Monotonic faction id allocator.
///
/// The sequence is persisted with the faction collection so ids stay unique
/// across restarts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactionIdGenerator {
    next: u64,
}

impl FactionIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start.max(1) }
    }

    /// Sequence number the next call to [`Self::next_id`] will use.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn next_id(&mut self) -> FactionId {
        let id = FactionId(format!("faction-{:06}", self.next));
        self.next += 1;
        id
    }

    /// Moves the sequence past an id that was issued elsewhere (e.g. loaded from storage).
    pub fn observe(&mut self, id: &FactionId) {
        if let Some(seq) = id
            .as_str()
            .strip_prefix("faction-")
            .and_then(|s| s.parse::<u64>().ok())
            && seq >= self.next
        {
            self.next = seq + 1;
        }
    }
}

impl Default for FactionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
