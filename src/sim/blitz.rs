//! Bier-Blitz: click race against the opponent on a 4x4 grid
//!
//! Beers spawn into empty cells on a schedule and vanish after their
//! lifetime. The player clicks them, the opponent grabs one every reaction
//! interval. All schedules run on a round clock that freezes while paused.

use serde::{Deserialize, Serialize};

use super::opponent::Dice;
use super::state::{Actor, GameEvent, GameMode, GameSession};
use crate::consts::*;
use crate::dialogue::{self, DialogueCategory};
use crate::round_half_up;
use crate::tuning::{BlitzProfile, Difficulty};

/// Opponent points are scaled down by this factor
const OPPONENT_POINT_FACTOR: f32 = 0.8;
/// Chance the opponent goes for a golden beer when one is up
const GOLDEN_PREFERENCE: f32 = 0.7;
/// Extra chance (on top of golden) for a penalty beer from round 3 on
const PENALTY_CHANCE: f32 = 0.05;
/// Chance the opponent comments after a player hit
const TAUNT_CHANCE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeerKind {
    Regular,
    Golden,
    /// Costs points when taken
    Penalty,
}

impl BeerKind {
    pub fn points(&self, bonus_round: bool) -> i64 {
        match (self, bonus_round) {
            (BeerKind::Regular, false) => 1,
            (BeerKind::Regular, true) => 2,
            (BeerKind::Golden, false) => 5,
            (BeerKind::Golden, true) => 10,
            (BeerKind::Penalty, _) => -3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub kind: BeerKind,
    pub points: i64,
    pub expires_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlitzPhase {
    Playing,
    /// Round over, waiting for `next_round`
    RoundOver,
    Finished,
}

/// A Bier-Blitz match in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlitzMatch {
    pub session: GameSession,
    pub phase: BlitzPhase,
    pub profile: BlitzProfile,
    pub cells: [Option<Beer>; BLITZ_CELLS],
    pub paused: bool,
    pub bonus_round: bool,
    /// Elapsed round time
    pub clock_ms: u64,
    pub time_left_secs: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub streak: u32,
    pub hits: u32,
    pub misses: u32,
    last_hit_ms: Option<u64>,
    opening_spawns_done: usize,
    next_spawn_ms: u64,
    next_reaction_ms: u64,
    next_second_ms: u64,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl BlitzMatch {
    pub fn new(difficulty: Difficulty, max_rounds: u32, profile: &BlitzProfile) -> Self {
        let session = GameSession::new(difficulty, max_rounds);
        let mut m = Self {
            events: vec![GameEvent::MatchStarted {
                mode: GameMode::BierBlitz,
                difficulty,
                max_rounds: session.max_rounds,
            }],
            session,
            phase: BlitzPhase::Playing,
            profile: profile.clone(),
            cells: [None; BLITZ_CELLS],
            paused: false,
            bonus_round: false,
            clock_ms: 0,
            time_left_secs: profile.round_time_secs,
            combo: 0,
            max_combo: 0,
            streak: 0,
            hits: 0,
            misses: 0,
            last_hit_ms: None,
            opening_spawns_done: 0,
            next_spawn_ms: profile.spawn_rate_ms,
            next_reaction_ms: profile.reaction_ms,
            next_second_ms: 1000,
        };
        log::info!(
            "Blitz match started ({}, {} rounds)",
            difficulty,
            m.session.max_rounds
        );
        m.start_round();
        m
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BlitzPhase::Finished
    }

    /// Hit percentage for the current round
    pub fn accuracy(&self) -> u32 {
        let attempts = self.hits + self.misses;
        if attempts == 0 {
            return 0;
        }
        round_half_up(self.hits as f32 / attempts as f32 * 100.0) as u32
    }

    fn start_round(&mut self) {
        self.session.player_score = 0;
        self.session.opponent_score = 0;
        self.cells = [None; BLITZ_CELLS];
        self.paused = false;
        self.bonus_round = self.session.current_round % 3 == 0;
        self.clock_ms = 0;
        self.time_left_secs = self.profile.round_time_secs;
        self.combo = 0;
        self.streak = 0;
        self.hits = 0;
        self.misses = 0;
        self.last_hit_ms = None;
        self.opening_spawns_done = 0;
        self.next_spawn_ms = self.profile.spawn_rate_ms;
        self.next_reaction_ms = self.profile.reaction_ms;
        self.next_second_ms = 1000;
        self.phase = BlitzPhase::Playing;

        self.events.push(GameEvent::RoundStarted {
            round: self.session.current_round,
            bonus: self.bonus_round,
        });
        self.events.push(GameEvent::Dialogue {
            category: DialogueCategory::BlitzStart,
        });
        self.events.push(GameEvent::TimeLeft {
            secs: self.time_left_secs,
        });
    }

    /// Start the next round after a `RoundOver`
    pub fn next_round(&mut self) -> bool {
        if self.phase != BlitzPhase::RoundOver {
            return false;
        }
        self.session.finish_round();
        self.start_round();
        true
    }

    /// Toggle pause while a round is running
    pub fn toggle_pause(&mut self) -> bool {
        if self.phase != BlitzPhase::Playing {
            return false;
        }
        self.paused = !self.paused;
        self.events.push(GameEvent::Paused {
            paused: self.paused,
        });
        if self.paused {
            self.events.push(GameEvent::Dialogue {
                category: DialogueCategory::Paused,
            });
        }
        true
    }

    /// Player clicks a grid cell. Returns false when the click is ignored.
    pub fn click(&mut self, cell: usize, dice: &mut impl Dice) -> bool {
        if self.phase != BlitzPhase::Playing || self.paused || cell >= BLITZ_CELLS {
            return false;
        }

        let Some(beer) = self.cells[cell].take() else {
            self.misses += 1;
            self.streak = 0;
            self.events.push(GameEvent::Missed { cell });
            return true;
        };

        let mut bonus = 0;
        let in_combo = self
            .last_hit_ms
            .is_some_and(|t| self.clock_ms - t < COMBO_WINDOW_MS);
        if in_combo {
            self.combo += 1;
            if self.combo >= 3 {
                bonus += self.combo as i64;
                self.events.push(GameEvent::Combo { count: self.combo });
            }
            if self.combo == 10 {
                bonus += 10;
            }
        } else {
            self.combo = 1;
        }
        self.max_combo = self.max_combo.max(self.combo);
        self.last_hit_ms = Some(self.clock_ms);

        self.streak += 1;
        if self.streak % 5 == 0 {
            bonus += 2;
            self.events.push(GameEvent::Streak {
                count: self.streak,
            });
        }

        let points = round_half_up(beer.points as f32 * self.profile.point_multiplier);
        self.session.award(Actor::Player, points);
        // Bonuses decide the round but stay out of the match total
        self.session.player_score += bonus;
        self.hits += 1;
        self.events.push(GameEvent::BeerTaken {
            cell,
            actor: Actor::Player,
            points,
        });

        if dice.chance(TAUNT_CHANCE) {
            self.events.push(GameEvent::Dialogue {
                category: dialogue::standing(
                    self.session.player_score,
                    self.session.opponent_score,
                ),
            });
        }
        true
    }

    /// Advance the round clock, firing every schedule in time order
    pub fn tick(&mut self, dt_ms: u32, dice: &mut impl Dice) {
        if self.phase != BlitzPhase::Playing || self.paused {
            return;
        }
        let end = self.clock_ms + dt_ms as u64;
        loop {
            let next = self.next_due();
            if next > end {
                self.clock_ms = end;
                return;
            }
            self.clock_ms = next;
            self.fire_due(dice);
            if self.phase != BlitzPhase::Playing {
                return;
            }
        }
    }

    fn opening_spawn_due(&self) -> Option<u64> {
        BLITZ_OPENING_SPAWNS_MS.get(self.opening_spawns_done).copied()
    }

    fn next_due(&self) -> u64 {
        let expiry = self
            .cells
            .iter()
            .flatten()
            .map(|beer| beer.expires_at_ms)
            .min()
            .unwrap_or(u64::MAX);
        [
            self.next_second_ms,
            self.next_spawn_ms,
            self.next_reaction_ms,
            self.opening_spawn_due().unwrap_or(u64::MAX),
            expiry,
        ]
        .into_iter()
        .min()
        .unwrap_or(u64::MAX)
    }

    fn fire_due(&mut self, dice: &mut impl Dice) {
        let now = self.clock_ms;

        for (cell, slot) in self.cells.iter_mut().enumerate() {
            if slot.is_some_and(|beer| beer.expires_at_ms <= now) {
                *slot = None;
                self.events.push(GameEvent::BeerExpired { cell });
            }
        }

        if self.next_second_ms <= now {
            self.next_second_ms += 1000;
            self.time_left_secs = self.time_left_secs.saturating_sub(1);
            self.events.push(GameEvent::TimeLeft {
                secs: self.time_left_secs,
            });
            if self.time_left_secs == 0 {
                self.end_round();
                return;
            }
        }

        while self.opening_spawn_due().is_some_and(|t| t <= now) {
            self.opening_spawns_done += 1;
            self.spawn_beer(dice);
        }
        if self.next_spawn_ms <= now {
            self.next_spawn_ms += self.profile.spawn_rate_ms.max(1);
            self.spawn_beer(dice);
        }
        if self.next_reaction_ms <= now {
            self.next_reaction_ms += self.profile.reaction_ms.max(1);
            self.opponent_turn(dice);
        }
    }

    fn spawn_beer(&mut self, dice: &mut impl Dice) {
        let empty: Vec<usize> = (0..BLITZ_CELLS)
            .filter(|i| self.cells[*i].is_none())
            .collect();
        if empty.is_empty() {
            return;
        }
        let cell = empty[dice.index(empty.len())];

        let roll = dice.roll();
        let golden = self.profile.golden_chance;
        let kind = if roll < golden {
            BeerKind::Golden
        } else if roll < golden + PENALTY_CHANCE && self.session.current_round > 2 {
            BeerKind::Penalty
        } else {
            BeerKind::Regular
        };

        self.cells[cell] = Some(Beer {
            kind,
            points: kind.points(self.bonus_round),
            expires_at_ms: self.clock_ms + self.profile.beer_lifetime_ms,
        });
        self.events.push(GameEvent::BeerSpawned { cell, kind });
    }

    fn opponent_turn(&mut self, dice: &mut impl Dice) {
        let occupied: Vec<usize> = (0..BLITZ_CELLS)
            .filter(|i| self.cells[*i].is_some())
            .collect();
        if occupied.is_empty() {
            return;
        }

        let accuracy =
            (self.profile.accuracy + self.session.current_round as f32 * 0.02).min(0.95);
        if !dice.chance(accuracy) {
            return;
        }

        let golden: Vec<usize> = occupied
            .iter()
            .copied()
            .filter(|i| self.cells[*i].is_some_and(|beer| beer.points > 2))
            .collect();
        let targets = if !golden.is_empty() && dice.chance(GOLDEN_PREFERENCE) {
            golden
        } else {
            occupied
        };
        let cell = targets[dice.index(targets.len())];

        if let Some(beer) = self.cells[cell].take() {
            let points = round_half_up(
                beer.points as f32 * self.profile.point_multiplier * OPPONENT_POINT_FACTOR,
            );
            self.session.award(Actor::Opponent, points);
            self.events.push(GameEvent::BeerTaken {
                cell,
                actor: Actor::Opponent,
                points,
            });
        }
    }

    fn end_round(&mut self) {
        self.cells = [None; BLITZ_CELLS];
        let round = self.session.current_round;
        let outcome = self.session.round_outcome();
        self.events.push(GameEvent::RoundEnded {
            round,
            winner: outcome.winner(),
            player_score: self.session.player_score,
            opponent_score: self.session.opponent_score,
        });
        self.events.push(GameEvent::Dialogue {
            category: dialogue::round_end(outcome),
        });
        log::info!(
            "Blitz round {} ended {}:{} (accuracy {}%)",
            round,
            self.session.player_score,
            self.session.opponent_score,
            self.accuracy()
        );

        if self.session.is_final_round() {
            self.session.finish_round();
            self.phase = BlitzPhase::Finished;
            let outcome = self.session.outcome();
            self.events.push(GameEvent::MatchFinished {
                outcome,
                player_total: self.session.total_player_score,
                opponent_total: self.session.total_opponent_score,
            });
            self.events.push(GameEvent::Dialogue {
                category: dialogue::game_end(outcome),
            });
        } else {
            self.phase = BlitzPhase::RoundOver;
        }
    }
}
