/// Progression tuning constants and runtime-tunable parameters.
///
/// Defaults match the shipped balance; a TOML file loaded by
/// `pantheon-content` can override any field.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProgressionConfig {
    /// Favor awarded for a neutral PvP kill before relationship scaling.
    pub base_favor: u32,
    /// Prestige awarded to the killer's faction before relationship scaling.
    pub base_prestige: u32,
    /// Favor lost on death (capped at the player's current favor).
    pub death_penalty: u32,
    /// Minimum time between faction switches, in seconds.
    pub switch_cooldown_secs: i64,
    /// Favor trickled to every online, aligned player per hour of play.
    /// Zero disables passive favor.
    pub passive_favor_per_hour: f64,
    /// Seconds of game time between automatic world saves. Zero disables autosave.
    pub autosave_interval_secs: f64,
}

impl ProgressionConfig {
    pub const BASE_FAVOR: u32 = 10;
    pub const BASE_PRESTIGE: u32 = 15;
    pub const DEATH_PENALTY: u32 = 5;
    /// Seven days.
    pub const SWITCH_COOLDOWN_SECS: i64 = 7 * 24 * 60 * 60;
    pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: f64 = 300.0;

    pub fn new() -> Self {
        Self {
            base_favor: Self::BASE_FAVOR,
            base_prestige: Self::BASE_PRESTIGE,
            death_penalty: Self::DEATH_PENALTY,
            switch_cooldown_secs: Self::SWITCH_COOLDOWN_SECS,
            passive_favor_per_hour: 0.0,
            autosave_interval_secs: Self::DEFAULT_AUTOSAVE_INTERVAL_SECS,
        }
    }

    pub fn switch_cooldown(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(self.switch_cooldown_secs.max(0))
    }

    pub fn with_passive_favor(mut self, per_hour: f64) -> Self {
        self.passive_favor_per_hour = per_hour;
        self
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self::new()
    }
}
