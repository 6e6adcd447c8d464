//! Henry's Bierolympiade - beer minigames against a scripted opponent
//!
//! Core modules:
//! - `sim`: Deterministic match logic (slide scoring, opponent policy, turn sequencing)
//! - `tuning`: Validated game balance and difficulty tiers
//! - `highscores`: Per-mode top 10 leaderboard
//! - `game`: Controller owning the session, random source and storage
//! - `platform`: Browser/native platform abstraction (storage, dates)
//!
//! Rendering, animation and button wiring live in the JS presentation layer,
//! which talks to the crate through `web::WebGame` on wasm.

pub mod audio;
pub mod dialogue;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use dialogue::DialogueCategory;
pub use game::{Game, Stage};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::{Difficulty, DifficultyProfile, Tuning};

/// Game configuration constants
pub mod consts {
    /// Power that carries the mug exactly to the far edge of the table
    pub const FOUL_POWER: f32 = 95.0;
    /// Target center position as a fraction of the table length
    pub const TARGET_CENTER_PERCENTAGE: f32 = 0.65;
    /// Response curve of power to travel distance
    pub const PHYSICS_EXPONENT: f32 = 1.5;
    /// Upper end of the power meter
    pub const MAX_POWER: f32 = 100.0;
    /// Angle meter reaches this deflection at either end (degrees)
    pub const MAX_ANGLE_DEGREES: f32 = 30.0;
    /// Half-width of the power band the opponent hits on a near-perfect throw
    pub const NEAR_PERFECT_SPREAD: f32 = 1.5;

    /// Default table in table units (launch origin at the near edge)
    pub const TABLE_LENGTH: f32 = 100.0;
    pub const TABLE_WIDTH: f32 = 40.0;
    /// Target ring radii, innermost (100 points) to outermost (10 points)
    pub const RING_RADII: [f32; 4] = [4.0, 8.0, 13.0, 18.0];

    /// Virtual clock durations (ms) standing in for animation timings
    pub const MATCH_INTRO_MS: u32 = 1000;
    pub const SLIDE_DURATION_MS: u32 = 2200;
    pub const RESULT_PAUSE_MS: u32 = 2000;
    pub const OPPONENT_WINDUP_MS: u32 = 500;
    pub const ROUND_BREAK_MS: u32 = 1000;

    /// Rounds per match unless overridden in settings
    pub const DEFAULT_ROUNDS: u32 = 5;

    /// Bier-Blitz grid (4x4)
    pub const BLITZ_CELLS: usize = 16;
    /// Opening spawns after a round starts (ms)
    pub const BLITZ_OPENING_SPAWNS_MS: [u64; 2] = [500, 1000];
    /// Hits closer together than this build a combo
    pub const COMBO_WINDOW_MS: u64 = 1000;
}

/// Round half toward positive infinity (browser `Math.round` semantics)
#[inline]
pub fn round_half_up(value: f32) -> i64 {
    (value + 0.5).floor() as i64
}
