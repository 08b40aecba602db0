//! Dice Module
//!
//! All randomness in the engine flows through a [`DiceSource`], so combat can be replayed
//! exactly in tests (`LoadedDice`) or from a seed (`RandomDice::seeded`).

use std::collections::VecDeque;
use std::fmt::Display;

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sides on every combat die.
pub const D6: u32 = 6;

/// Source of dice results and uniform picks.
pub trait DiceSource: std::fmt::Debug {
    /// Roll one die with `sides` faces, returning a value in `[1, sides]`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Pick a uniform index in `[0, len)`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

/// Roll `count` independent dice. A count of zero yields an empty roll.
pub fn roll_dice(dice: &mut dyn DiceSource, count: u32, sides: u32) -> Roll {
    Roll {
        dice: (0..count).map(|_| dice.roll_die(sides)).collect(),
    }
}

/// The faces of one roll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roll {
    pub dice: Vec<u32>,
}

impl Roll {
    pub fn total(&self) -> u32 {
        self.dice.iter().sum()
    }
}

impl Display for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dice.is_empty() {
            return write!(f, "no dice = 0");
        }
        let faces: Vec<String> = self.dice.iter().map(u32::to_string).collect();
        write!(f, "{} = {}", faces.join(" + "), self.total())
    }
}

/// Dice backed by a standard RNG, either OS-seeded or seeded for reproducible sessions.
#[derive(Debug)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceSource for RandomDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rng.random_range(1..=sides)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}

/// Replays queued die faces and picks in order.
///
/// When a queue runs dry, dice fall back to `1` and picks to `0`, with a warning.
#[derive(Debug, Default, Clone)]
pub struct LoadedDice {
    rolls: VecDeque<u32>,
    picks: VecDeque<usize>,
}

impl LoadedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            picks: VecDeque::new(),
        }
    }

    /// Builder-style: queue uniform picks (used for random targeting and enemy action choice).
    #[must_use]
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }
}

impl DiceSource for LoadedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if let Some(face) = self.rolls.pop_front() {
            face.clamp(1, sides.max(1))
        } else {
            warn!("loaded dice exhausted: rolling 1");
            1
        }
    }

    fn pick(&mut self, len: usize) -> usize {
        match self.picks.pop_front() {
            Some(index) => index.min(len.saturating_sub(1)),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dice_roll_is_empty() {
        let mut dice = RandomDice::seeded(7);
        let roll = roll_dice(&mut dice, 0, D6);
        assert!(roll.dice.is_empty());
        assert_eq!(roll.total(), 0);
    }

    #[test]
    fn random_faces_stay_in_range() {
        let mut dice = RandomDice::seeded(42);
        let roll = roll_dice(&mut dice, 200, D6);
        assert_eq!(roll.dice.len(), 200);
        assert!(roll.dice.iter().all(|face| (1..=D6).contains(face)));
    }

    #[test]
    fn seeded_dice_are_reproducible() {
        let mut a = RandomDice::seeded(99);
        let mut b = RandomDice::seeded(99);
        assert_eq!(roll_dice(&mut a, 12, D6), roll_dice(&mut b, 12, D6));
        assert_eq!(a.pick(5), b.pick(5));
    }

    #[test]
    fn loaded_dice_replay_in_order() {
        let mut dice = LoadedDice::new([6, 2, 4]).with_picks([1]);
        assert_eq!(roll_dice(&mut dice, 2, D6).dice, vec![6, 2]);
        assert_eq!(dice.pick(3), 1);
        assert_eq!(dice.pick(3), 0);
        assert_eq!(roll_dice(&mut dice, 2, D6).dice, vec![4, 1]);
    }

    #[test]
    fn roll_display_shows_breakdown() {
        let roll = Roll { dice: vec![3, 5, 1] };
        assert_eq!(roll.to_string(), "3 + 5 + 1 = 9");
        assert_eq!(Roll::default().to_string(), "no dice = 0");
    }
}
