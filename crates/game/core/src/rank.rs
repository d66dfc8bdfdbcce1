//! Fixed rank ladders for favor (players) and prestige (factions).
//!
//! Ranks are a pure, monotonic function of lifetime earnings. Both ladders
//! share the same numeric thresholds and differ only in naming.
//!
//! ```text
//! lifetime:  0      500      2000      5000      10000
//! favor:     Initiate  Disciple  Zealot   Champion  Avatar
//! prestige:  Fledgling Established Renowned Legendary Mythic
//! ```

/// Lifetime totals at which each rank begins, lowest first.
pub const RANK_THRESHOLDS: [u32; 5] = [0, 500, 2_000, 5_000, 10_000];

/// Shared behaviour of a table-driven rank ladder.
pub trait RankLadder: Copy + Ord + core::fmt::Debug + 'static {
    /// `(threshold, rank)` pairs in ascending threshold order.
    const TABLE: &'static [(u32, Self)];

    /// Highest rank whose threshold is at or below `lifetime`.
    fn from_lifetime(lifetime: u32) -> Self {
        let mut rank = Self::TABLE[0].1;
        for &(threshold, candidate) in Self::TABLE {
            if lifetime >= threshold {
                rank = candidate;
            } else {
                break;
            }
        }
        rank
    }

    /// Lifetime total at which this rank begins.
    fn threshold(self) -> u32 {
        Self::TABLE
            .iter()
            .find(|(_, rank)| *rank == self)
            .map(|(threshold, _)| *threshold)
            .unwrap_or(0)
    }

    /// Zero-based position on the ladder.
    fn index(self) -> usize {
        Self::TABLE
            .iter()
            .position(|(_, rank)| *rank == self)
            .unwrap_or(0)
    }

    /// Next rank, or `None` at the top of the ladder.
    fn next(self) -> Option<Self> {
        Self::TABLE.get(self.index() + 1).map(|(_, rank)| *rank)
    }

    fn is_max(self) -> bool {
        self.next().is_none()
    }

    /// Progress toward the next rank.
    ///
    /// At the top rank the next threshold reports the top threshold itself and
    /// the next rank is the current rank: progress plateaus instead of failing.
    fn progress(lifetime: u32) -> RankProgress<Self> {
        let rank = Self::from_lifetime(lifetime);
        let next_rank = rank.next().unwrap_or(rank);
        RankProgress {
            current: lifetime,
            rank,
            next_threshold: next_rank.threshold(),
            next_rank,
        }
    }
}

/// Snapshot of progress along a rank ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankProgress<R> {
    /// Lifetime total earned so far.
    pub current: u32,
    pub rank: R,
    pub next_threshold: u32,
    pub next_rank: R,
}

impl<R: RankLadder> RankProgress<R> {
    /// Amount still needed to reach the next rank; zero at the plateau.
    pub fn remaining(&self) -> u32 {
        self.next_threshold.saturating_sub(self.current)
    }
}

/// Individual rank derived from lifetime favor.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum FavorRank {
    #[default]
    Initiate,
    Disciple,
    Zealot,
    Champion,
    Avatar,
}

impl RankLadder for FavorRank {
    const TABLE: &'static [(u32, Self)] = &[
        (RANK_THRESHOLDS[0], FavorRank::Initiate),
        (RANK_THRESHOLDS[1], FavorRank::Disciple),
        (RANK_THRESHOLDS[2], FavorRank::Zealot),
        (RANK_THRESHOLDS[3], FavorRank::Champion),
        (RANK_THRESHOLDS[4], FavorRank::Avatar),
    ];
}

/// Collective rank derived from lifetime prestige.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum PrestigeRank {
    #[default]
    Fledgling,
    Established,
    Renowned,
    Legendary,
    Mythic,
}

impl RankLadder for PrestigeRank {
    const TABLE: &'static [(u32, Self)] = &[
        (RANK_THRESHOLDS[0], PrestigeRank::Fledgling),
        (RANK_THRESHOLDS[1], PrestigeRank::Established),
        (RANK_THRESHOLDS[2], PrestigeRank::Renowned),
        (RANK_THRESHOLDS[3], PrestigeRank::Legendary),
        (RANK_THRESHOLDS[4], PrestigeRank::Mythic),
    ];
}
