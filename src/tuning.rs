//! Data-driven game balance
//!
//! Physics constants for the slide and one fixed-shape profile per difficulty
//! tier. Every `Tuning` value is validated on construction and carries the
//! derived sweet-spot power, so changing a constant moves the sweet spot with it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Difficulty tiers, easiest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "leicht" => Some(Difficulty::Easy),
            "medium" | "med" | "mittel" => Some(Difficulty::Medium),
            "hard" | "schwer" => Some(Difficulty::Hard),
            "extreme" | "extrem" => Some(Difficulty::Extreme),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bier-Blitz parameters for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlitzProfile {
    /// Interval between beer spawns
    pub spawn_rate_ms: u64,
    /// How long a beer stays on the grid
    pub beer_lifetime_ms: u64,
    /// Interval between opponent grabs
    pub reaction_ms: u64,
    /// Base chance the opponent grabs a beer when it acts
    pub accuracy: f32,
    /// Chance a spawn is golden
    pub golden_chance: f32,
    pub round_time_secs: u32,
    pub point_multiplier: f32,
}

/// Opponent precision for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Half-width of the opponent's power range around the sweet spot
    pub power_spread: f32,
    /// Maximum angle deflection on a flawed throw (degrees)
    pub angle_error_degrees: f32,
    /// Chance of a near-perfect throw
    pub near_perfect_chance: f32,
    pub blitz: BlitzProfile,
}

/// One profile per tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub easy: DifficultyProfile,
    pub medium: DifficultyProfile,
    pub hard: DifficultyProfile,
    pub extreme: DifficultyProfile,
}

impl DifficultyTable {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultyProfile {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
            Difficulty::Extreme => &self.extreme,
        }
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyProfile {
                power_spread: 10.0,
                angle_error_degrees: 15.0,
                near_perfect_chance: 0.6,
                blitz: BlitzProfile {
                    spawn_rate_ms: 2000,
                    beer_lifetime_ms: 3000,
                    reaction_ms: 2000,
                    accuracy: 0.5,
                    golden_chance: 0.2,
                    round_time_secs: 30,
                    point_multiplier: 1.0,
                },
            },
            medium: DifficultyProfile {
                power_spread: 7.0,
                angle_error_degrees: 10.0,
                near_perfect_chance: 0.75,
                blitz: BlitzProfile {
                    spawn_rate_ms: 1500,
                    beer_lifetime_ms: 2500,
                    reaction_ms: 1500,
                    accuracy: 0.65,
                    golden_chance: 0.15,
                    round_time_secs: 30,
                    point_multiplier: 1.5,
                },
            },
            hard: DifficultyProfile {
                power_spread: 4.0,
                angle_error_degrees: 6.0,
                near_perfect_chance: 0.9,
                blitz: BlitzProfile {
                    spawn_rate_ms: 1200,
                    beer_lifetime_ms: 2000,
                    reaction_ms: 1200,
                    accuracy: 0.75,
                    golden_chance: 0.12,
                    round_time_secs: 30,
                    point_multiplier: 2.0,
                },
            },
            extreme: DifficultyProfile {
                power_spread: 2.5,
                angle_error_degrees: 3.0,
                near_perfect_chance: 0.95,
                blitz: BlitzProfile {
                    spawn_rate_ms: 900,
                    beer_lifetime_ms: 1500,
                    reaction_ms: 900,
                    accuracy: 0.85,
                    golden_chance: 0.1,
                    round_time_secs: 30,
                    point_multiplier: 3.0,
                },
            },
        }
    }
}

/// Tuning validation failures
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("foul power must lie in (0, 100], got {0}")]
    FoulPower(f32),
    #[error("target center percentage must lie strictly between 0 and 1, got {0}")]
    TargetCenter(f32),
    #[error("physics exponent must be positive, got {0}")]
    Exponent(f32),
    #[error("near-perfect spread must be positive, got {0}")]
    NearPerfectSpread(f32),
    #[error("{difficulty} profile: {reason}")]
    Profile {
        difficulty: Difficulty,
        reason: &'static str,
    },
    #[error("{harder} must not be looser than {easier}")]
    TierOrder {
        easier: Difficulty,
        harder: Difficulty,
    },
    #[error("invalid tuning JSON")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Raw, unvalidated tuning as written in a tuning file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningSpec {
    pub foul_power: f32,
    pub target_center_percentage: f32,
    pub physics_exponent: f32,
    pub near_perfect_spread: f32,
    pub difficulties: DifficultyTable,
}

impl Default for TuningSpec {
    fn default() -> Self {
        Self {
            foul_power: FOUL_POWER,
            target_center_percentage: TARGET_CENTER_PERCENTAGE,
            physics_exponent: PHYSICS_EXPONENT,
            near_perfect_spread: NEAR_PERFECT_SPREAD,
            difficulties: DifficultyTable::default(),
        }
    }
}

/// Validated tuning with the derived sweet spot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TuningSpec", into = "TuningSpec")]
pub struct Tuning {
    spec: TuningSpec,
    sweet_spot_power: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        let spec = TuningSpec::default();
        let sweet_spot_power = derive_sweet_spot(&spec);
        Self {
            spec,
            sweet_spot_power,
        }
    }
}

impl TryFrom<TuningSpec> for Tuning {
    type Error = TuningError;

    fn try_from(spec: TuningSpec) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}

impl From<Tuning> for TuningSpec {
    fn from(tuning: Tuning) -> Self {
        tuning.spec
    }
}

/// Power that lands exactly on the target center at zero angle
fn derive_sweet_spot(spec: &TuningSpec) -> f32 {
    spec.foul_power * spec.target_center_percentage.powf(1.0 / spec.physics_exponent)
}

impl Tuning {
    /// Validate raw tuning and derive the sweet spot
    pub fn new(spec: TuningSpec) -> Result<Self, TuningError> {
        if !(spec.foul_power > 0.0 && spec.foul_power <= MAX_POWER) {
            return Err(TuningError::FoulPower(spec.foul_power));
        }
        if !(spec.target_center_percentage > 0.0 && spec.target_center_percentage < 1.0) {
            return Err(TuningError::TargetCenter(spec.target_center_percentage));
        }
        if !(spec.physics_exponent > 0.0) {
            return Err(TuningError::Exponent(spec.physics_exponent));
        }
        if !(spec.near_perfect_spread > 0.0) {
            return Err(TuningError::NearPerfectSpread(spec.near_perfect_spread));
        }

        let sweet_spot_power = derive_sweet_spot(&spec);
        for difficulty in Difficulty::ALL {
            validate_profile(
                difficulty,
                spec.difficulties.get(difficulty),
                sweet_spot_power,
                spec.near_perfect_spread,
            )?;
        }
        for pair in Difficulty::ALL.windows(2) {
            let easier = spec.difficulties.get(pair[0]);
            let harder = spec.difficulties.get(pair[1]);
            if harder.power_spread > easier.power_spread
                || harder.angle_error_degrees > easier.angle_error_degrees
            {
                return Err(TuningError::TierOrder {
                    easier: pair[0],
                    harder: pair[1],
                });
            }
        }

        log::debug!("Tuning validated, sweet spot power {:.2}", sweet_spot_power);
        Ok(Self {
            spec,
            sweet_spot_power,
        })
    }

    /// Parse and validate a JSON tuning file
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let spec: TuningSpec = serde_json::from_str(json)?;
        Self::new(spec)
    }

    pub fn foul_power(&self) -> f32 {
        self.spec.foul_power
    }

    pub fn target_center_percentage(&self) -> f32 {
        self.spec.target_center_percentage
    }

    pub fn physics_exponent(&self) -> f32 {
        self.spec.physics_exponent
    }

    pub fn near_perfect_spread(&self) -> f32 {
        self.spec.near_perfect_spread
    }

    pub fn sweet_spot_power(&self) -> f32 {
        self.sweet_spot_power
    }

    pub fn profile(&self, difficulty: Difficulty) -> &DifficultyProfile {
        self.spec.difficulties.get(difficulty)
    }

    /// Opponent power range for a tier, symmetric around the sweet spot
    pub fn power_range(&self, difficulty: Difficulty) -> (f32, f32) {
        let spread = self.profile(difficulty).power_spread;
        (
            self.sweet_spot_power - spread,
            self.sweet_spot_power + spread,
        )
    }

    /// Angle error of the most precise tier (used for near-perfect throws)
    pub fn tightest_angle_error(&self) -> f32 {
        Difficulty::ALL
            .iter()
            .map(|d| self.profile(*d).angle_error_degrees)
            .fold(f32::INFINITY, f32::min)
    }
}

fn validate_profile(
    difficulty: Difficulty,
    profile: &DifficultyProfile,
    sweet_spot_power: f32,
    near_perfect_spread: f32,
) -> Result<(), TuningError> {
    let fail = |reason| Err(TuningError::Profile { difficulty, reason });

    if !(profile.power_spread > near_perfect_spread) {
        return fail("power spread must exceed the near-perfect band");
    }
    if sweet_spot_power - profile.power_spread < 0.0
        || sweet_spot_power + profile.power_spread > MAX_POWER
    {
        return fail("power range leaves the power meter");
    }
    if !(0.0..90.0).contains(&profile.angle_error_degrees) {
        return fail("angle error must lie in [0, 90) degrees");
    }
    if !(0.0..=1.0).contains(&profile.near_perfect_chance) {
        return fail("near-perfect chance must be a probability");
    }

    let blitz = &profile.blitz;
    if blitz.spawn_rate_ms == 0 || blitz.beer_lifetime_ms == 0 || blitz.reaction_ms == 0 {
        return fail("blitz intervals must be positive");
    }
    if blitz.round_time_secs == 0 {
        return fail("blitz round time must be positive");
    }
    if !(0.0..=1.0).contains(&blitz.accuracy) {
        return fail("blitz accuracy must be a probability");
    }
    if !(0.0..=0.95).contains(&blitz.golden_chance) {
        return fail("golden chance must lie in [0, 0.95]");
    }
    if !(blitz.point_multiplier > 0.0) {
        return fail("point multiplier must be positive");
    }
    Ok(())
}
