//! Opponent dialogue categories
//!
//! The core only decides which kind of line Henry says; the presentation
//! layer owns the text. Category names serialize as stable snake_case keys.

use serde::{Deserialize, Serialize};

use crate::sim::{Actor, Outcome};

/// Slide score at which a shot counts as impressive
pub const GOOD_SHOT_POINTS: u32 = 50;

/// Kinds of opponent lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueCategory {
    /// Bier-Blitz round starts
    BlitzStart,
    /// Opponent ahead mid-round
    OpponentLeading,
    /// Opponent behind mid-round
    OpponentTrailing,
    OpponentWinsRound,
    OpponentLosesRound,
    RoundTied,
    Paused,
    /// Mug sliding match starts
    ShuffleStart,
    PlayerGoodShot,
    /// Player shot was weak, opponent's turn next
    OpponentTurn,
    OpponentGoodShot,
    /// Opponent shot was weak, on to the next round
    NextRound,
    OpponentWinsGame,
    OpponentLosesGame,
    GameTied,
}

impl DialogueCategory {
    pub fn key(&self) -> &'static str {
        match self {
            DialogueCategory::BlitzStart => "blitz_start",
            DialogueCategory::OpponentLeading => "opponent_leading",
            DialogueCategory::OpponentTrailing => "opponent_trailing",
            DialogueCategory::OpponentWinsRound => "opponent_wins_round",
            DialogueCategory::OpponentLosesRound => "opponent_loses_round",
            DialogueCategory::RoundTied => "round_tied",
            DialogueCategory::Paused => "paused",
            DialogueCategory::ShuffleStart => "shuffle_start",
            DialogueCategory::PlayerGoodShot => "player_good_shot",
            DialogueCategory::OpponentTurn => "opponent_turn",
            DialogueCategory::OpponentGoodShot => "opponent_good_shot",
            DialogueCategory::NextRound => "next_round",
            DialogueCategory::OpponentWinsGame => "opponent_wins_game",
            DialogueCategory::OpponentLosesGame => "opponent_loses_game",
            DialogueCategory::GameTied => "game_tied",
        }
    }
}

/// Reaction after a resolved slide
pub fn after_slide(actor: Actor, points: u32) -> DialogueCategory {
    let good = points >= GOOD_SHOT_POINTS;
    match (actor, good) {
        (Actor::Player, true) => DialogueCategory::PlayerGoodShot,
        (Actor::Player, false) => DialogueCategory::OpponentTurn,
        (Actor::Opponent, true) => DialogueCategory::OpponentGoodShot,
        (Actor::Opponent, false) => DialogueCategory::NextRound,
    }
}

pub fn round_end(outcome: Outcome) -> DialogueCategory {
    match outcome {
        Outcome::PlayerWins => DialogueCategory::OpponentLosesRound,
        Outcome::OpponentWins => DialogueCategory::OpponentWinsRound,
        Outcome::Tie => DialogueCategory::RoundTied,
    }
}

pub fn game_end(outcome: Outcome) -> DialogueCategory {
    match outcome {
        Outcome::PlayerWins => DialogueCategory::OpponentLosesGame,
        Outcome::OpponentWins => DialogueCategory::OpponentWinsGame,
        Outcome::Tie => DialogueCategory::GameTied,
    }
}

/// Mid-round taunt in Bier-Blitz
pub fn standing(player: i64, opponent: i64) -> DialogueCategory {
    if opponent > player {
        DialogueCategory::OpponentLeading
    } else {
        DialogueCategory::OpponentTrailing
    }
}
