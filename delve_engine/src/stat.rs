//! Stat Module
//!
//! Bounded character attributes. Every stat is a `value` out of a `max`, and the max itself
//! never leaves `[1, STAT_CAP]`.

use std::fmt::Display;
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::prompt::Prompter;

/// Highest maximum any stat can reach.
pub const STAT_CAP: i32 = 10;

/// Starting maximum for every stat before class adjustments.
pub const BASE_STAT_MAX: i32 = 3;

/// A bounded numeric resource: `0 <= value <= max <= STAT_CAP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    value: i32,
    max: i32,
}

impl Stat {
    /// Create a full stat with the given maximum (clamped to `[1, STAT_CAP]`).
    pub fn new(max: i32) -> Stat {
        let max = max.clamp(1, STAT_CAP);
        Stat { value: max, max }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Reassign the maximum and refill the stat.
    pub fn reset(&mut self, max: i32) {
        *self = Stat::new(max);
    }

    /// Set the current value, clamped to `[0, max]`.
    pub fn set_value(&mut self, value: i32) {
        self.value = value.clamp(0, self.max);
    }

    pub fn add(&mut self, amount: i32) {
        self.set_value(self.value.saturating_add(amount));
    }

    pub fn subtract(&mut self, amount: i32) {
        self.set_value(self.value.saturating_sub(amount));
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0
    }

    /// Shift max and value together. The max stays in `[1, STAT_CAP]` and the value moves by
    /// the same (clamped) delta.
    pub fn upgrade(&mut self, amount: i32) {
        let new_max = self.max.saturating_add(amount).clamp(1, STAT_CAP);
        let delta = new_max - self.max;
        self.max = new_max;
        self.set_value(self.value + delta);
    }

    /// Dice contributed by this stat; a negated stat rolls more the emptier it is.
    pub fn dice(&self, negate: bool) -> i32 {
        if negate { self.max - self.value + 1 } else { self.value }
    }

    /// Fixed-width bar such as `|++.|       `.
    pub fn format_bar(&self) -> String {
        let filled = usize::try_from(self.value).unwrap_or(0);
        let empty = usize::try_from(self.max - self.value).unwrap_or(0);
        let pad = usize::try_from(STAT_CAP - self.max).unwrap_or(0);
        format!("|{}{}|{}", "+".repeat(filled), ".".repeat(empty), " ".repeat(pad))
    }
}

impl Default for Stat {
    fn default() -> Self {
        Stat::new(BASE_STAT_MAX)
    }
}

/// The four character stats, in cause-of-death priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatKey {
    Strength,
    Dexterity,
    Wisdom,
    Soul,
}

impl StatKey {
    pub const ALL: [StatKey; 4] = [StatKey::Strength, StatKey::Dexterity, StatKey::Wisdom, StatKey::Soul];

    /// Lowercase key used in data files and cause-of-death reporting.
    pub fn key(self) -> &'static str {
        match self {
            StatKey::Strength => "str",
            StatKey::Dexterity => "dex",
            StatKey::Wisdom => "wis",
            StatKey::Soul => "soul",
        }
    }

    /// Uppercase label used in stat bars and ability info.
    pub fn label(self) -> &'static str {
        match self {
            StatKey::Strength => "STR",
            StatKey::Dexterity => "DEX",
            StatKey::Wisdom => "WIS",
            StatKey::Soul => "SOUL",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StatKey::Strength => "Strength, your physical power and health.",
            StatKey::Dexterity => "Dexterity, your agility and stealthiness.",
            StatKey::Wisdom => "Wisdom, your mental acuity and intelligence.",
            StatKey::Soul => "Soul, your mortal connection.",
        }
    }

    /// Narration shown when this stat runs out.
    pub fn death_text(self) -> &'static str {
        match self {
            StatKey::Strength => "You die from your injuries.",
            StatKey::Dexterity => "You cease to move, ever again.",
            StatKey::Wisdom => "You lose the will to keep going.",
            StatKey::Soul => "You succumb to the darkness and your soul is lost forever.",
        }
    }
}

impl Display for StatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for StatKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "str" | "strength" => Ok(StatKey::Strength),
            "dex" | "dexterity" => Ok(StatKey::Dexterity),
            "wis" | "wisdom" => Ok(StatKey::Wisdom),
            "soul" => Ok(StatKey::Soul),
            other => Err(format!("unknown stat key '{other}'")),
        }
    }
}

/// How an ability picks the stat it rolls against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatChoice {
    Fixed(StatKey),
    /// No stat: only the flat bonus counts.
    None,
    /// Ask the player when the ability is used.
    Choose,
}

impl StatChoice {
    /// Parse a data-file stat key. Unknown keys fall back to `None` with a warning.
    pub fn parse_or_none(raw: &str) -> StatChoice {
        match raw.trim().to_lowercase().as_str() {
            "none" | "" => StatChoice::None,
            "choose" => StatChoice::Choose,
            other => match other.parse::<StatKey>() {
                Ok(key) => StatChoice::Fixed(key),
                Err(e) => {
                    warn!("{e}: treating as no stat");
                    StatChoice::None
                },
            },
        }
    }

    /// Resolve to a concrete stat, asking the player when the choice is open.
    pub fn resolve(self, prompt: &mut dyn Prompter, purpose: &str) -> StatBinding {
        match self {
            StatChoice::Fixed(key) => StatBinding::Bound(key),
            StatChoice::None => StatBinding::Unbound,
            StatChoice::Choose => match prompt.choose_stat(purpose) {
                Some(key) => StatBinding::Bound(key),
                None => {
                    info!("└─ stat choice cancelled ({purpose})");
                    StatBinding::Cancelled
                },
            },
        }
    }

    /// Label used in ability info brackets; empty when no stat is involved.
    pub fn label(self) -> &'static str {
        match self {
            StatChoice::Fixed(key) => key.label(),
            StatChoice::None => "",
            StatChoice::Choose => "ANY",
        }
    }
}

/// A `StatChoice` after any prompting has happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatBinding {
    Bound(StatKey),
    Unbound,
    Cancelled,
}
