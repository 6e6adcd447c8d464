//! Mug sliding match ("Krug-Schieben")
//!
//! Turn state machine driven by a virtual clock. The player turn goes
//! Power -> Angle -> Sliding -> Done, the opponent skips straight to Sliding
//! with a shot from its policy. Timers live inside the phase itself, so
//! replacing the match discards every pending timer.

use serde::{Deserialize, Serialize};

use super::opponent::{Dice, opponent_shot};
use super::slide::{Shot, TableGeometry, resolve_slide};
use super::state::{Actor, GameEvent, GameMode, GameSession, TurnResult};
use crate::consts::*;
use crate::dialogue;
use crate::tuning::{Difficulty, Tuning};

/// Turn state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Next player turn starts when the timer runs out
    Waiting { remaining_ms: u32 },
    /// Player picks power
    Power,
    /// Player picks angle
    Angle { power: f32 },
    /// Mug in motion, input ignored
    Sliding {
        actor: Actor,
        shot: Shot,
        remaining_ms: u32,
    },
    /// Turn resolved, result on display
    Done { result: TurnResult, remaining_ms: u32 },
    /// Final round resolved
    Finished,
}

/// A mug sliding match in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleMatch {
    pub session: GameSession,
    pub phase: TurnPhase,
    /// Player result of the current round, once resolved
    pub player_turn: Option<TurnResult>,
    /// Every resolved turn, in order
    pub turns: Vec<TurnResult>,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl ShuffleMatch {
    pub fn new(difficulty: Difficulty, max_rounds: u32) -> Self {
        let session = GameSession::new(difficulty, max_rounds);
        let events = vec![
            GameEvent::MatchStarted {
                mode: GameMode::Schieben,
                difficulty,
                max_rounds: session.max_rounds,
            },
            GameEvent::Dialogue {
                category: dialogue::DialogueCategory::ShuffleStart,
            },
        ];
        log::info!(
            "Slide match started ({}, {} rounds)",
            difficulty,
            session.max_rounds
        );
        Self {
            session,
            phase: TurnPhase::Waiting {
                remaining_ms: MATCH_INTRO_MS,
            },
            player_turn: None,
            turns: Vec::new(),
            events,
        }
    }

    /// Take events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == TurnPhase::Finished
    }

    /// True while the action trigger does something
    pub fn accepts_action(&self) -> bool {
        matches!(self.phase, TurnPhase::Power | TurnPhase::Angle { .. })
    }

    /// Action trigger with the value sampled from the active indicator:
    /// power (0-100) in the power phase, angle (degrees) in the angle phase.
    /// Returns false when the trigger is ignored.
    pub fn action(&mut self, value: f32) -> bool {
        match self.phase {
            TurnPhase::Power => {
                let power = value.clamp(0.0, MAX_POWER);
                self.phase = TurnPhase::Angle { power };
                self.events.push(GameEvent::AnglePhase { power });
                true
            }
            TurnPhase::Angle { power } => {
                let angle = value.clamp(-MAX_ANGLE_DEGREES, MAX_ANGLE_DEGREES);
                self.start_slide(Actor::Player, Shot::new(power, angle));
                true
            }
            _ => {
                log::debug!("Action ignored in {:?}", self.phase);
                false
            }
        }
    }

    /// Advance the virtual clock. Leftover time carries through each
    /// transition, so the result does not depend on tick size.
    pub fn tick(
        &mut self,
        dt_ms: u32,
        tuning: &Tuning,
        geometry: &TableGeometry,
        dice: &mut impl Dice,
    ) {
        let mut budget = dt_ms;
        loop {
            let remaining = match &mut self.phase {
                TurnPhase::Waiting { remaining_ms }
                | TurnPhase::Sliding { remaining_ms, .. }
                | TurnPhase::Done { remaining_ms, .. } => remaining_ms,
                TurnPhase::Power | TurnPhase::Angle { .. } | TurnPhase::Finished => return,
            };
            if *remaining > budget {
                *remaining -= budget;
                return;
            }
            budget -= *remaining;
            self.timer_elapsed(tuning, geometry, dice);
        }
    }

    fn timer_elapsed(&mut self, tuning: &Tuning, geometry: &TableGeometry, dice: &mut impl Dice) {
        match self.phase {
            TurnPhase::Waiting { .. } => self.begin_player_turn(),
            TurnPhase::Sliding { actor, shot, .. } => self.resolve(actor, shot, tuning, geometry),
            TurnPhase::Done { result, .. } => match result.actor {
                Actor::Player => {
                    let shot = opponent_shot(tuning, self.session.difficulty, dice);
                    self.start_slide(Actor::Opponent, shot);
                }
                Actor::Opponent => self.end_round(),
            },
            TurnPhase::Power | TurnPhase::Angle { .. } | TurnPhase::Finished => {}
        }
    }

    fn begin_player_turn(&mut self) {
        self.session.player_score = 0;
        self.session.opponent_score = 0;
        self.player_turn = None;
        self.phase = TurnPhase::Power;
        self.events.push(GameEvent::PowerPhase {
            round: self.session.current_round,
        });
    }

    fn start_slide(&mut self, actor: Actor, shot: Shot) {
        self.phase = TurnPhase::Sliding {
            actor,
            shot,
            remaining_ms: SLIDE_DURATION_MS,
        };
        self.events.push(GameEvent::SlideStarted {
            actor,
            shot,
            duration_ms: SLIDE_DURATION_MS,
        });
    }

    fn resolve(&mut self, actor: Actor, shot: Shot, tuning: &Tuning, geometry: &TableGeometry) {
        let slide = resolve_slide(shot, tuning, geometry);
        let result = TurnResult {
            actor,
            power: shot.power,
            angle: shot.angle,
            distance: slide.distance,
            outcome: slide.outcome,
            score: slide.points(),
        };
        log::debug!(
            "Round {} {:?} slide: {:?} for {}",
            self.session.current_round,
            actor,
            result.outcome,
            result.score
        );

        self.session.award(actor, result.score as i64);
        self.turns.push(result);
        self.events.push(GameEvent::TurnResolved(result));
        self.events.push(GameEvent::Dialogue {
            category: dialogue::after_slide(actor, result.score),
        });

        let remaining_ms = match actor {
            Actor::Player => {
                self.player_turn = Some(result);
                RESULT_PAUSE_MS + OPPONENT_WINDUP_MS
            }
            Actor::Opponent => RESULT_PAUSE_MS,
        };
        self.phase = TurnPhase::Done {
            result,
            remaining_ms,
        };
    }

    fn end_round(&mut self) {
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
            "Round {} ended {}:{}",
            round,
            self.session.player_score,
            self.session.opponent_score
        );

        if self.session.finish_round() {
            self.phase = TurnPhase::Waiting {
                remaining_ms: ROUND_BREAK_MS,
            };
        } else {
            let outcome = self.session.outcome();
            self.phase = TurnPhase::Finished;
            self.events.push(GameEvent::MatchFinished {
                outcome,
                player_total: self.session.total_player_score,
                opponent_total: self.session.total_opponent_score,
            });
            self.events.push(GameEvent::Dialogue {
                category: dialogue::game_end(outcome),
            });
            log::info!(
                "Slide match finished {}:{} ({:?})",
                self.session.total_player_score,
                self.session.total_opponent_score,
                outcome
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::opponent::ScriptedDice;
    use crate::sim::state::Outcome;

    /// Time from the player's angle trigger to the next power phase
    const FULL_ROUND_MS: u32 = SLIDE_DURATION_MS
        + RESULT_PAUSE_MS
        + OPPONENT_WINDUP_MS
        + SLIDE_DURATION_MS
        + RESULT_PAUSE_MS
        + ROUND_BREAK_MS;

    fn setup() -> (Tuning, TableGeometry) {
        let tuning = Tuning::default();
        let geometry = TableGeometry::for_tuning(&tuning);
        (tuning, geometry)
    }

    /// Opponent always throws a perfect sweet-spot shot
    fn perfect_dice() -> ScriptedDice {
        ScriptedDice::new([0.0, 0.5, 0.5])
    }

    #[test]
    fn test_intro_then_power_phase() {
        let (tuning, geometry) = setup();
        let mut dice = perfect_dice();
        let mut m = ShuffleMatch::new(Difficulty::Medium, 5);
        assert!(!m.action(50.0));

        m.tick(MATCH_INTRO_MS - 1, &tuning, &geometry, &mut dice);
        assert!(matches!(m.phase, TurnPhase::Waiting { remaining_ms: 1 }));
        m.tick(1, &tuning, &geometry, &mut dice);
        assert_eq!(m.phase, TurnPhase::Power);

        let events = m.drain_events();
        assert!(matches!(events[0], GameEvent::MatchStarted { .. }));
        assert!(events.contains(&GameEvent::PowerPhase { round: 1 }));
    }

    #[test]
    fn test_actions_ignored_while_sliding() {
        let (tuning, geometry) = setup();
        let mut dice = perfect_dice();
        let mut m = ShuffleMatch::new(Difficulty::Medium, 5);
        m.tick(MATCH_INTRO_MS, &tuning, &geometry, &mut dice);

        assert!(m.action(60.0));
        assert_eq!(m.phase, TurnPhase::Angle { power: 60.0 });
        assert!(m.action(0.0));
        assert!(matches!(m.phase, TurnPhase::Sliding { actor: Actor::Player, .. }));
        assert!(!m.accepts_action());
        assert!(!m.action(10.0));

        m.tick(SLIDE_DURATION_MS - 1, &tuning, &geometry, &mut dice);
        assert!(!m.action(10.0));
        assert!(m.turns.is_empty());
        m.tick(1, &tuning, &geometry, &mut dice);
        assert_eq!(m.turns.len(), 1);
        assert!(matches!(m.phase, TurnPhase::Done { .. }));
    }

    #[test]
    fn test_input_clamped() {
        let (tuning, geometry) = setup();
        let mut dice = perfect_dice();
        let mut m = ShuffleMatch::new(Difficulty::Easy, 1);
        m.tick(MATCH_INTRO_MS, &tuning, &geometry, &mut dice);
        m.action(180.0);
        assert_eq!(m.phase, TurnPhase::Angle { power: MAX_POWER });
        m.action(-75.0);
        match m.phase {
            TurnPhase::Sliding { shot, .. } => assert_eq!(shot.angle, -MAX_ANGLE_DEGREES),
            other => panic!("unexpected phase {:?}", other),
        }
    }

    #[test]
    fn test_round_sequence_with_scripted_opponent() {
        let (tuning, geometry) = setup();
        let mut dice = perfect_dice();
        let mut m = ShuffleMatch::new(Difficulty::Medium, 5);
        m.tick(MATCH_INTRO_MS, &tuning, &geometry, &mut dice);
        m.drain_events();

        // Player misses short
        m.action(30.0);
        m.action(0.0);
        m.tick(SLIDE_DURATION_MS, &tuning, &geometry, &mut dice);
        assert_eq!(m.player_turn.map(|t| t.score), Some(0));
        assert_eq!(m.session.total_player_score, 0);

        // Opponent does not start before the result pause and wind-up
        m.tick(RESULT_PAUSE_MS + OPPONENT_WINDUP_MS - 1, &tuning, &geometry, &mut dice);
        assert!(matches!(m.phase, TurnPhase::Done { .. }));
        m.tick(1, &tuning, &geometry, &mut dice);
        assert!(matches!(m.phase, TurnPhase::Sliding { actor: Actor::Opponent, .. }));

        m.tick(SLIDE_DURATION_MS, &tuning, &geometry, &mut dice);
        assert_eq!(m.session.opponent_score, 100);
        assert_eq!(m.session.current_round, 1);

        m.tick(RESULT_PAUSE_MS, &tuning, &geometry, &mut dice);
        assert_eq!(m.session.current_round, 2);
        assert!(matches!(m.phase, TurnPhase::Waiting { .. }));

        let events = m.drain_events();
        assert!(events.contains(&GameEvent::RoundEnded {
            round: 1,
            winner: Some(Actor::Opponent),
            player_score: 0,
            opponent_score: 100,
        }));
        assert!(events.contains(&GameEvent::Dialogue {
            category: dialogue::DialogueCategory::OpponentTurn
        }));
        assert!(events.contains(&GameEvent::Dialogue {
            category: dialogue::DialogueCategory::OpponentGoodShot
        }));
        assert!(events.contains(&GameEvent::Dialogue {
            category: dialogue::DialogueCategory::OpponentWinsRound
        }));
    }

    #[test]
    fn test_match_finishes_on_last_round() {
        let (tuning, geometry) = setup();
        let mut dice = perfect_dice();
        let mut m = ShuffleMatch::new(Difficulty::Hard, 3);
        m.tick(MATCH_INTRO_MS, &tuning, &geometry, &mut dice);

        for round in 1..=3 {
            assert_eq!(m.session.current_round, round);
            assert_eq!(m.phase, TurnPhase::Power);
            m.action(tuning.sweet_spot_power());
            m.action(0.0);
            m.tick(FULL_ROUND_MS, &tuning, &geometry, &mut dice);
        }

        assert!(m.is_finished());
        assert!(!m.session.active);
        assert_eq!(m.session.current_round, 3);
        assert_eq!(m.session.total_player_score, 300);
        assert_eq!(m.session.total_opponent_score, 300);
        assert_eq!(m.turns.len(), 6);
        assert!(m.drain_events().contains(&GameEvent::MatchFinished {
            outcome: Outcome::Tie,
            player_total: 300,
            opponent_total: 300,
        }));

        // Nothing moves after the end
        assert!(!m.action(50.0));
        m.tick(60_000, &tuning, &geometry, &mut dice);
        assert_eq!(m.turns.len(), 6);
    }

    #[test]
    fn test_tick_size_does_not_change_outcome() {
        let (tuning, geometry) = setup();
        let mut coarse = ShuffleMatch::new(Difficulty::Medium, 2);
        let mut fine = ShuffleMatch::new(Difficulty::Medium, 2);
        let mut coarse_dice = ScriptedDice::new([0.9, 0.3, 0.2, 0.8, 0.1, 0.6]);
        let mut fine_dice = coarse_dice.clone();

        coarse.tick(MATCH_INTRO_MS, &tuning, &geometry, &mut coarse_dice);
        for _ in 0..MATCH_INTRO_MS / 16 + 1 {
            fine.tick(16, &tuning, &geometry, &mut fine_dice);
        }

        for m in [&mut coarse, &mut fine] {
            m.action(70.0);
            m.action(3.0);
        }
        coarse.tick(FULL_ROUND_MS, &tuning, &geometry, &mut coarse_dice);
        for _ in 0..FULL_ROUND_MS / 16 + 1 {
            fine.tick(16, &tuning, &geometry, &mut fine_dice);
        }

        assert_eq!(coarse.turns, fine.turns);
        assert_eq!(coarse.session, fine.session);
        assert_eq!(coarse.phase, TurnPhase::Power);
        assert_eq!(fine.phase, TurnPhase::Power);
    }
}
