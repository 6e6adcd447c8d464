//! Deterministic match logic
//!
//! All gameplay rules live here. This module must stay pure and deterministic:
//! - Virtual clock only (callers pass elapsed milliseconds)
//! - Randomness only through an injected `Dice`
//! - No rendering, audio or storage dependencies

pub mod blitz;
pub mod opponent;
pub mod shuffle;
pub mod slide;
pub mod state;

pub use blitz::{Beer, BeerKind, BlitzMatch, BlitzPhase};
pub use opponent::{Dice, ScriptedDice, ThrowKind, opponent_shot, opponent_throw};
pub use shuffle::{ShuffleMatch, TurnPhase};
pub use slide::{
    Ring, Shot, SlideOutcome, SlideResult, TableBounds, TableGeometry, TargetRings,
    angle_from_meter, power_for_distance, power_from_meter, resolve_slide, travel_distance,
};
pub use state::{Actor, GameEvent, GameMode, GameSession, Outcome, TurnResult};
