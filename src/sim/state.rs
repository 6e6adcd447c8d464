//! Session state and core match types
//!
//! Everything the presentation layer needs to render a match is here or is
//! reported through `GameEvent`.

use serde::{Deserialize, Serialize};

use super::blitz::BeerKind;
use super::slide::{Shot, SlideOutcome};
use crate::dialogue::DialogueCategory;
use crate::tuning::Difficulty;

/// Which minigame is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Click race for beers on a grid
    #[serde(rename = "bier-blitz")]
    BierBlitz,
    /// Mug sliding
    #[serde(rename = "schieben")]
    Schieben,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::BierBlitz, GameMode::Schieben];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::BierBlitz => "bier-blitz",
            GameMode::Schieben => "schieben",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bier-blitz" | "blitz" => Some(GameMode::BierBlitz),
            "schieben" | "shuffle" | "krug-schieben" => Some(GameMode::Schieben),
            _ => None,
        }
    }
}

/// Who acted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    Player,
    Opponent,
}

/// Final comparison of two scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    PlayerWins,
    OpponentWins,
    Tie,
}

impl Outcome {
    pub fn compare(player: i64, opponent: i64) -> Self {
        match player.cmp(&opponent) {
            std::cmp::Ordering::Greater => Outcome::PlayerWins,
            std::cmp::Ordering::Less => Outcome::OpponentWins,
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }

    pub fn winner(&self) -> Option<Actor> {
        match self {
            Outcome::PlayerWins => Some(Actor::Player),
            Outcome::OpponentWins => Some(Actor::Opponent),
            Outcome::Tie => None,
        }
    }
}

/// One resolved slide turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub actor: Actor,
    pub power: f32,
    pub angle: f32,
    pub distance: f32,
    pub outcome: SlideOutcome,
    /// Always one of 0, 10, 20, 50, 100
    pub score: u32,
}

/// Scores and round bookkeeping shared by both modes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// Player score for the current turn (slide) or round (blitz)
    pub player_score: i64,
    /// Opponent score for the current turn (slide) or round (blitz)
    pub opponent_score: i64,
    pub total_player_score: i64,
    pub total_opponent_score: i64,
    /// 1-based, never exceeds `max_rounds`
    pub current_round: u32,
    pub max_rounds: u32,
    pub difficulty: Difficulty,
    /// False once the final round has been resolved
    pub active: bool,
}

impl GameSession {
    pub fn new(difficulty: Difficulty, max_rounds: u32) -> Self {
        Self {
            player_score: 0,
            opponent_score: 0,
            total_player_score: 0,
            total_opponent_score: 0,
            current_round: 1,
            max_rounds: max_rounds.max(1),
            difficulty,
            active: true,
        }
    }

    /// Add points to an actor's current and total score
    pub fn award(&mut self, actor: Actor, points: i64) {
        match actor {
            Actor::Player => {
                self.player_score += points;
                self.total_player_score += points;
            }
            Actor::Opponent => {
                self.opponent_score += points;
                self.total_opponent_score += points;
            }
        }
    }

    pub fn is_final_round(&self) -> bool {
        self.current_round >= self.max_rounds
    }

    /// Close the current round. Returns false (and deactivates the session)
    /// when it was the final round, otherwise moves to the next round.
    pub fn finish_round(&mut self) -> bool {
        if self.is_final_round() {
            self.active = false;
            false
        } else {
            self.current_round += 1;
            true
        }
    }

    /// Match result by cumulative totals
    pub fn outcome(&self) -> Outcome {
        Outcome::compare(self.total_player_score, self.total_opponent_score)
    }

    /// Current round result by per-round scores
    pub fn round_outcome(&self) -> Outcome {
        Outcome::compare(self.player_score, self.opponent_score)
    }
}

/// Everything the presentation layer reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A match started
    MatchStarted {
        mode: GameMode,
        difficulty: Difficulty,
        max_rounds: u32,
    },
    /// Player may set power (slide)
    PowerPhase { round: u32 },
    /// Player locked power and may set the angle (slide)
    AnglePhase { power: f32 },
    /// A mug is sliding; no input until it lands
    SlideStarted {
        actor: Actor,
        shot: Shot,
        duration_ms: u32,
    },
    TurnResolved(TurnResult),
    RoundStarted { round: u32, bonus: bool },
    RoundEnded {
        round: u32,
        winner: Option<Actor>,
        player_score: i64,
        opponent_score: i64,
    },
    /// Blitz grid changes
    BeerSpawned { cell: usize, kind: BeerKind },
    BeerExpired { cell: usize },
    BeerTaken {
        cell: usize,
        actor: Actor,
        points: i64,
    },
    Missed { cell: usize },
    Combo { count: u32 },
    Streak { count: u32 },
    /// Blitz countdown, once per second
    TimeLeft { secs: u32 },
    Paused { paused: bool },
    Dialogue { category: DialogueCategory },
    MatchFinished {
        outcome: Outcome,
        player_total: i64,
        opponent_total: i64,
    },
    HighscoreQualified { score: u64 },
    HighscoreSaved { rank: usize },
}
