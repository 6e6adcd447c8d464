//! Game controller
//!
//! Owns everything a running game needs between frames: the active match,
//! the random source, tuning, storage, highscores and settings. The
//! presentation layer feeds it input and elapsed time and drains the
//! resulting events.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::highscores::{DEFAULT_NAME, HighScores};
use crate::platform::{self, KeyValueStore};
use crate::settings::Settings;
use crate::sim::{
    BlitzMatch, Dice, GameEvent, GameMode, GameSession, Outcome, ShuffleMatch, TableGeometry,
};
use crate::tuning::{Difficulty, Tuning};

/// Final numbers of a finished match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub outcome: Outcome,
    pub player_total: i64,
    pub opponent_total: i64,
    pub rounds_played: u32,
}

impl MatchSummary {
    fn from_session(mode: GameMode, session: &GameSession) -> Self {
        Self {
            mode,
            difficulty: session.difficulty,
            outcome: session.outcome(),
            player_total: session.total_player_score,
            opponent_total: session.total_opponent_score,
            rounds_played: session.current_round,
        }
    }

    /// Score submitted to the leaderboard (negative totals count as 0)
    pub fn highscore_score(&self) -> u64 {
        self.player_total.max(0) as u64
    }
}

/// Where the game currently is
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Menu,
    Shuffle(ShuffleMatch),
    Blitz(BlitzMatch),
    /// Match over with a qualifying score, waiting for the player's name
    AwaitingName { summary: MatchSummary },
    /// Results screen
    Over { summary: MatchSummary },
}

impl Stage {
    pub fn is_playing(&self) -> bool {
        matches!(self, Stage::Shuffle(_) | Stage::Blitz(_))
    }
}

/// Game controller
pub struct Game<D: Dice = Pcg32> {
    tuning: Tuning,
    geometry: TableGeometry,
    settings: Settings,
    highscores: HighScores,
    store: Box<dyn KeyValueStore>,
    dice: D,
    stage: Stage,
    events: Vec<GameEvent>,
}

impl<D: Dice> Game<D> {
    /// Create a controller, loading settings and highscores from the store
    pub fn new(store: Box<dyn KeyValueStore>, dice: D) -> Self {
        let settings = Settings::load(store.as_ref());
        let highscores = HighScores::load(store.as_ref());
        let tuning = Tuning::default();
        let geometry = TableGeometry::for_tuning(&tuning);
        Self {
            tuning,
            geometry,
            settings,
            highscores,
            store,
            dice,
            stage: Stage::Menu,
            events: Vec::new(),
        }
    }

    /// Replace the tuning; the table geometry follows the new target position
    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.geometry = TableGeometry::for_tuning(&tuning);
        self.tuning = tuning;
        self
    }

    /// Override the table geometry (e.g. measured from the rendered table)
    pub fn set_geometry(&mut self, geometry: TableGeometry) {
        self.geometry = geometry;
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist the settings
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// Start a new match. Any running match is dropped with its timers.
    pub fn start(&mut self, mode: GameMode, difficulty: Difficulty) {
        self.settle_name_entry();
        let rounds = self.settings.rounds_for(mode);
        self.stage = match mode {
            GameMode::Schieben => Stage::Shuffle(ShuffleMatch::new(difficulty, rounds)),
            GameMode::BierBlitz => {
                let profile = &self.tuning.profile(difficulty).blitz;
                Stage::Blitz(BlitzMatch::new(difficulty, rounds, profile))
            }
        };

        if self.settings.difficulty != difficulty {
            let mut settings = self.settings.clone();
            settings.difficulty = difficulty;
            self.update_settings(settings);
        }
        self.collect();
    }

    /// Action trigger of the slide match (power, then angle)
    pub fn action(&mut self, value: f32) -> bool {
        let handled = match &mut self.stage {
            Stage::Shuffle(m) => m.action(value),
            _ => false,
        };
        self.collect();
        handled
    }

    /// Grid click of the blitz match
    pub fn click(&mut self, cell: usize) -> bool {
        let handled = match &mut self.stage {
            Stage::Blitz(m) => m.click(cell, &mut self.dice),
            _ => false,
        };
        self.collect();
        handled
    }

    pub fn toggle_pause(&mut self) -> bool {
        let handled = match &mut self.stage {
            Stage::Blitz(m) => m.toggle_pause(),
            _ => false,
        };
        self.collect();
        handled
    }

    /// Advance the virtual clock of the running match
    pub fn tick(&mut self, dt_ms: u32) {
        match &mut self.stage {
            Stage::Shuffle(m) => m.tick(dt_ms, &self.tuning, &self.geometry, &mut self.dice),
            Stage::Blitz(m) => m.tick(dt_ms, &mut self.dice),
            _ => return,
        }
        self.collect();
    }

    /// Continue a blitz match after a round break
    pub fn next_round(&mut self) -> bool {
        let handled = match &mut self.stage {
            Stage::Blitz(m) => m.next_round(),
            _ => false,
        };
        self.collect();
        handled
    }

    /// Enter the qualifying score under `name`. Returns the rank achieved.
    pub fn submit_name(&mut self, name: &str) -> Option<usize> {
        let Stage::AwaitingName { summary } = self.stage else {
            return None;
        };

        let rank = self.highscores.commit(
            name,
            summary.highscore_score(),
            summary.mode,
            Some(summary.difficulty),
            &platform::today(),
        );
        if let Err(e) = self.highscores.save(self.store.as_mut()) {
            log::warn!("Failed to save high scores: {}", e);
        }
        if let Some(rank) = rank {
            self.events.push(GameEvent::HighscoreSaved { rank });
        }
        self.stage = Stage::Over { summary };
        rank
    }

    /// Abandon whatever is running. A skipped name entry keeps its score.
    pub fn back_to_menu(&mut self) {
        self.settle_name_entry();
        if self.stage.is_playing() {
            log::info!("Match abandoned");
        }
        self.stage = Stage::Menu;
    }

    /// Commit a pending qualifying score under the default name
    fn settle_name_entry(&mut self) {
        if matches!(self.stage, Stage::AwaitingName { .. }) {
            self.submit_name(DEFAULT_NAME);
        }
    }

    /// Take events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pull events out of the running match and handle its end
    fn collect(&mut self) {
        let summary = match &mut self.stage {
            Stage::Shuffle(m) => {
                self.events.extend(m.drain_events());
                m.is_finished()
                    .then(|| MatchSummary::from_session(GameMode::Schieben, &m.session))
            }
            Stage::Blitz(m) => {
                self.events.extend(m.drain_events());
                m.is_finished()
                    .then(|| MatchSummary::from_session(GameMode::BierBlitz, &m.session))
            }
            _ => None,
        };
        if let Some(summary) = summary {
            self.finish(summary);
        }
    }

    fn finish(&mut self, summary: MatchSummary) {
        let score = summary.highscore_score();
        if self.highscores.qualifies(score, summary.mode) {
            log::info!(
                "Score {} qualifies at rank {:?}",
                score,
                self.highscores.potential_rank(score, summary.mode)
            );
            self.events.push(GameEvent::HighscoreQualified { score });
            self.stage = Stage::AwaitingName { summary };
        } else {
            self.stage = Stage::Over { summary };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::platform::MemoryStore;
    use crate::sim::{Actor, Ring, ScriptedDice, SlideOutcome, TurnPhase, TurnResult};

    fn game(rolls: &[f32]) -> Game<ScriptedDice> {
        Game::new(Box::new(MemoryStore::new()), ScriptedDice::new(rolls.to_vec()))
    }

    fn one_round_settings() -> Settings {
        Settings {
            shuffle_rounds: 1,
            blitz_rounds: 1,
            ..Settings::default()
        }
    }

    #[test]
    fn test_starts_in_menu() {
        let mut g = game(&[0.5]);
        assert!(matches!(g.stage(), Stage::Menu));
        assert!(!g.action(50.0));
        assert!(!g.click(0));
        g.tick(10_000);
        assert!(g.drain_events().is_empty());
    }

    #[test]
    fn test_single_round_slide_match_to_name_entry() {
        // Opponent misses the near-perfect roll and throws long into the middle ring
        let mut g = game(&[0.99, 0.9, 0.0, 0.5]);
        g.update_settings(one_round_settings());
        g.start(GameMode::Schieben, Difficulty::Medium);

        g.tick(MATCH_INTRO_MS);
        let sweet = g.tuning().sweet_spot_power();
        assert!(g.action(sweet));
        assert!(g.action(0.0));
        g.tick(60_000);

        let Stage::AwaitingName { summary } = *g.stage() else {
            panic!("expected name entry, got {:?}", g.stage());
        };
        assert_eq!(summary.player_total, 100);
        assert_eq!(summary.outcome, Outcome::PlayerWins);
        assert!(
            g.drain_events()
                .contains(&GameEvent::HighscoreQualified { score: 100 })
        );

        assert_eq!(g.submit_name("  Henry "), Some(1));
        assert!(matches!(g.stage(), Stage::Over { .. }));
        assert_eq!(g.drain_events(), vec![GameEvent::HighscoreSaved { rank: 1 }]);

        let entry = &g.highscores().top(GameMode::Schieben)[0];
        assert_eq!(entry.name, "Henry");
        assert_eq!(entry.difficulty, Some(Difficulty::Medium));
        assert_eq!(g.submit_name("again"), None);
    }

    /// One round of straight sweet spot shots, returning the player's turn
    fn play_sweet_spot_round(g: &mut Game<ScriptedDice>) -> TurnResult {
        g.update_settings(one_round_settings());
        g.start(GameMode::Schieben, Difficulty::Medium);
        g.tick(MATCH_INTRO_MS);
        let sweet = g.tuning().sweet_spot_power();
        assert!(g.action(sweet));
        assert!(g.action(0.0));
        g.tick(60_000);
        g.drain_events()
            .into_iter()
            .find_map(|e| match e {
                GameEvent::TurnResolved(turn) if turn.actor == Actor::Player => Some(turn),
                _ => None,
            })
            .expect("player turn resolved")
    }

    #[test]
    fn test_table_geometry_drives_scoring() {
        let mut g = game(&[0.99, 0.9, 0.0, 0.5]);
        let turn = play_sweet_spot_round(&mut g);
        assert_eq!(turn.outcome, SlideOutcome::Ring(Ring::Bullseye));

        // Target moved close to the start, the same shot now sails past it
        let mut g = game(&[0.99, 0.9, 0.0, 0.5]);
        g.set_geometry(TableGeometry::new(TABLE_LENGTH, TABLE_WIDTH, 0.3, RING_RADII));
        let turn = play_sweet_spot_round(&mut g);
        assert_eq!(turn.outcome, SlideOutcome::Miss);
        assert_eq!(turn.score, 0);
    }

    #[test]
    fn test_leaving_name_entry_keeps_the_score() {
        let mut g = game(&[0.99, 0.9, 0.0, 0.5]);
        play_sweet_spot_round(&mut g);
        assert!(matches!(g.stage(), Stage::AwaitingName { .. }));

        g.back_to_menu();
        assert!(matches!(g.stage(), Stage::Menu));
        assert_eq!(g.drain_events(), vec![GameEvent::HighscoreSaved { rank: 1 }]);
        let top = g.highscores().top(GameMode::Schieben);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, DEFAULT_NAME);
        assert_eq!(top[0].score, 100);
    }

    #[test]
    fn test_restart_from_name_entry_keeps_the_score() {
        let mut g = game(&[0.99, 0.9, 0.0, 0.5]);
        play_sweet_spot_round(&mut g);
        assert!(matches!(g.stage(), Stage::AwaitingName { .. }));

        g.start(GameMode::BierBlitz, Difficulty::Easy);
        assert!(matches!(g.stage(), Stage::Blitz(_)));
        assert!(
            g.drain_events()
                .contains(&GameEvent::HighscoreSaved { rank: 1 })
        );
        assert_eq!(g.highscores().top_score(GameMode::Schieben), Some(100));
        assert_eq!(g.submit_name("late"), None);
    }

    #[test]
    fn test_zero_score_goes_straight_to_results() {
        let mut g = game(&[0.0, 0.5, 0.5]);
        g.update_settings(one_round_settings());
        g.start(GameMode::Schieben, Difficulty::Easy);
        g.tick(MATCH_INTRO_MS);
        g.action(0.0);
        g.action(0.0);
        g.tick(60_000);
        let Stage::Over { summary } = *g.stage() else {
            panic!("expected results, got {:?}", g.stage());
        };
        assert_eq!(summary.player_total, 0);
        assert_eq!(summary.outcome, Outcome::OpponentWins);
    }

    #[test]
    fn test_restart_discards_pending_timers() {
        let mut g = game(&[0.0, 0.5, 0.5]);
        g.start(GameMode::Schieben, Difficulty::Medium);
        g.tick(MATCH_INTRO_MS);
        g.action(70.0);
        g.action(0.0);
        g.tick(SLIDE_DURATION_MS - 1);

        g.start(GameMode::Schieben, Difficulty::Hard);
        g.drain_events();
        g.tick(1);
        let Stage::Shuffle(m) = g.stage() else {
            panic!("expected slide match");
        };
        assert!(m.turns.is_empty());
        assert_eq!(m.session.total_player_score, 0);
        assert!(matches!(m.phase, TurnPhase::Waiting { .. }));
        assert!(g.drain_events().is_empty());
    }

    #[test]
    fn test_start_remembers_difficulty() {
        let mut g = game(&[0.5]);
        g.start(GameMode::BierBlitz, Difficulty::Extreme);
        assert_eq!(g.settings().difficulty, Difficulty::Extreme);
        assert!(g.toggle_pause());
        assert!(!g.click(3));
        g.back_to_menu();
        assert!(!g.toggle_pause());
    }

    #[test]
    fn test_loads_persisted_state() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.commit("Ana", 80, GameMode::BierBlitz, None, "1.1.2025");
        scores.save(&mut store).unwrap();
        Settings {
            blitz_rounds: 3,
            ..Settings::default()
        }
        .save(&mut store)
        .unwrap();

        let g = Game::new(Box::new(store), ScriptedDice::new([0.5]));
        assert_eq!(g.highscores().top_score(GameMode::BierBlitz), Some(80));
        assert_eq!(g.settings().rounds_for(GameMode::BierBlitz), 3);
    }
}
