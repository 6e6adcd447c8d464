//! Scripted opponent decisions
//!
//! The opponent mostly throws near the sweet spot with the tightest angle
//! control of any tier. Otherwise it throws from one of two bands flanking
//! the sweet spot with its own tier's angle error, so results split into
//! clear "great" and "good but flawed" shots.

use rand::Rng;
use rand_pcg::Pcg32;

use super::slide::Shot;
use crate::tuning::{Difficulty, Tuning};

/// Injectable random source for all randomized match logic
pub trait Dice {
    /// Uniform sample in [0, 1)
    fn roll(&mut self) -> f32;

    /// Uniform sample in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.roll()
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.roll() < p
    }

    /// Uniform index into a collection of `len` items (`len` > 0)
    fn index(&mut self, len: usize) -> usize {
        ((self.roll() * len as f32) as usize).min(len.saturating_sub(1))
    }
}

impl Dice for Pcg32 {
    fn roll(&mut self) -> f32 {
        self.random::<f32>()
    }
}

impl<D: Dice + ?Sized> Dice for &mut D {
    fn roll(&mut self) -> f32 {
        (**self).roll()
    }
}

/// Replays a fixed roll sequence, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    rolls: Vec<f32>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(rolls: impl Into<Vec<f32>>) -> Self {
        let mut rolls: Vec<f32> = rolls.into();
        if rolls.is_empty() {
            rolls.push(0.0);
        }
        for roll in rolls.iter_mut() {
            *roll = roll.clamp(0.0, 0.999_999);
        }
        Self { rolls, cursor: 0 }
    }

    /// Number of rolls consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> f32 {
        let roll = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        roll
    }
}

/// Kind of throw the opponent decided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowKind {
    NearPerfect,
    Short,
    Long,
}

/// Choose the opponent's throw for a tier
///
/// Roll order: throw kind, (band side when flawed), power, angle.
pub fn opponent_throw(
    tuning: &Tuning,
    difficulty: Difficulty,
    dice: &mut impl Dice,
) -> (ThrowKind, Shot) {
    let profile = tuning.profile(difficulty);
    let sweet = tuning.sweet_spot_power();
    let near = tuning.near_perfect_spread();

    if dice.chance(profile.near_perfect_chance) {
        let power = dice.range(sweet - near, sweet + near);
        let error = tuning.tightest_angle_error();
        let angle = dice.range(-error, error);
        return (ThrowKind::NearPerfect, Shot::new(power, angle));
    }

    let (lo, hi) = tuning.power_range(difficulty);
    let (kind, power) = if dice.chance(0.5) {
        (ThrowKind::Short, dice.range(lo, sweet - near))
    } else {
        // Sample downward from the top so the band excludes its inner edge
        (ThrowKind::Long, hi - dice.roll() * (hi - (sweet + near)))
    };
    let error = profile.angle_error_degrees;
    let angle = dice.range(-error, error);

    log::debug!(
        "Opponent {:?} throw on {}: power {:.1}, angle {:.1}",
        kind,
        difficulty,
        power,
        angle
    );
    (kind, Shot::new(power, angle))
}

/// Choose the opponent's shot for a tier
pub fn opponent_shot(tuning: &Tuning, difficulty: Difficulty, dice: &mut impl Dice) -> Shot {
    opponent_throw(tuning, difficulty, dice).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::slide::{Ring, SlideOutcome, TableGeometry, resolve_slide};
    use rand::SeedableRng;

    #[test]
    fn test_scripted_near_perfect_hits_bullseye() {
        let tuning = Tuning::default();
        let geometry = TableGeometry::for_tuning(&tuning);
        // chance, power (band center), angle (zero)
        let mut dice = ScriptedDice::new([0.0, 0.5, 0.5]);
        let (kind, shot) = opponent_throw(&tuning, Difficulty::Medium, &mut dice);
        assert_eq!(kind, ThrowKind::NearPerfect);
        assert!((shot.power - tuning.sweet_spot_power()).abs() < 1e-3);
        assert!(shot.angle.abs() < 1e-3);
        assert_eq!(dice.consumed(), 3);

        let result = resolve_slide(shot, &tuning, &geometry);
        assert_eq!(result.outcome, SlideOutcome::Ring(Ring::Bullseye));
    }

    #[test]
    fn test_scripted_flawed_throws_use_flanking_bands() {
        let tuning = Tuning::default();
        let sweet = tuning.sweet_spot_power();
        let (lo, hi) = tuning.power_range(Difficulty::Medium);

        // Miss the near-perfect roll, take the short band at its bottom edge
        let mut dice = ScriptedDice::new([0.99, 0.0, 0.0, 0.5]);
        let (kind, shot) = opponent_throw(&tuning, Difficulty::Medium, &mut dice);
        assert_eq!(kind, ThrowKind::Short);
        assert!((shot.power - lo).abs() < 1e-3);
        assert!(shot.angle.abs() < 1e-3);

        // Long band at its top edge, angle at the tier's negative limit
        let mut dice = ScriptedDice::new([0.99, 0.7, 0.0, 0.0]);
        let (kind, shot) = opponent_throw(&tuning, Difficulty::Medium, &mut dice);
        assert_eq!(kind, ThrowKind::Long);
        assert!((shot.power - hi).abs() < 1e-3);
        assert!((shot.angle + 10.0).abs() < 1e-3);
        assert!(shot.power > sweet + tuning.near_perfect_spread());
    }

    #[test]
    fn test_flawed_throws_avoid_sweet_spot() {
        let tuning = Tuning::default();
        let sweet = tuning.sweet_spot_power();
        let near = tuning.near_perfect_spread();
        let mut rng = Pcg32::seed_from_u64(7);

        for d in Difficulty::ALL {
            let (lo, hi) = tuning.power_range(d);
            let error = tuning.profile(d).angle_error_degrees;
            for _ in 0..500 {
                let (kind, shot) = opponent_throw(&tuning, d, &mut rng);
                assert!(shot.angle.abs() <= error);
                match kind {
                    ThrowKind::NearPerfect => {
                        assert!((shot.power - sweet).abs() <= near);
                        assert!(shot.angle.abs() <= tuning.tightest_angle_error());
                    }
                    ThrowKind::Short => assert!(shot.power >= lo && shot.power < sweet - near),
                    ThrowKind::Long => assert!(shot.power > sweet + near && shot.power <= hi),
                }
            }
        }
    }

    #[test]
    fn test_near_perfect_rate_tracks_tier() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let trials = 4000;
        for d in [Difficulty::Easy, Difficulty::Extreme] {
            let hits = (0..trials)
                .filter(|_| opponent_throw(&tuning, d, &mut rng).0 == ThrowKind::NearPerfect)
                .count();
            let rate = hits as f32 / trials as f32;
            let expected = tuning.profile(d).near_perfect_chance;
            assert!((rate - expected).abs() < 0.05, "{}: {} vs {}", d, rate, expected);
        }
    }

    #[test]
    fn test_scripted_dice_cycles() {
        let mut dice = ScriptedDice::new([0.25, 0.75]);
        assert_eq!(dice.roll(), 0.25);
        assert_eq!(dice.roll(), 0.75);
        assert_eq!(dice.roll(), 0.25);
        assert_eq!(dice.index(4), 3);
        assert!(dice.chance(0.5));
    }
}
