//! Browser entry point
//!
//! `WebGame` is the surface the JS presentation layer drives: it forwards
//! input and frame time to the `Game` controller, plays audio cues and hands
//! events back as JSON.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::game::{Game, Stage};
use crate::platform::LocalStorage;
use crate::settings::Settings;
use crate::sim::{GameMode, TableGeometry, TurnPhase, angle_from_meter, power_from_meter};
use crate::tuning::Difficulty;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Henry's Bierolympiade starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    audio: AudioManager,
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(Box::new(LocalStorage::new()), Pcg32::seed_from_u64(seed));
        let mut audio = AudioManager::new();
        audio.apply_settings(game.settings());
        log::info!("Game initialized with seed: {}", seed);
        WebGame { game, audio }
    }

    /// Start a match; unknown mode or difficulty names are rejected
    pub fn start(&mut self, mode: &str, difficulty: &str) -> bool {
        let Some(mode) = GameMode::from_str(mode) else {
            log::warn!("Unknown game mode: {}", mode);
            return false;
        };
        let difficulty = Difficulty::from_str(difficulty).unwrap_or_else(|| {
            log::warn!("Unknown difficulty {}, using medium", difficulty);
            Difficulty::Medium
        });
        // Start is a user gesture, so audio may resume now
        self.audio.resume();
        self.game.start(mode, difficulty);
        true
    }

    /// Action trigger with a raw power (0-100) or angle (degrees)
    pub fn action(&mut self, value: f32) -> bool {
        self.game.action(value)
    }

    /// Action trigger with the fill fraction (0-1) of the active meter
    pub fn action_from_meter(&mut self, fill: f32) -> bool {
        let value = match self.game.stage() {
            Stage::Shuffle(m) => match m.phase {
                TurnPhase::Power => power_from_meter(fill),
                TurnPhase::Angle { .. } => angle_from_meter(fill - 0.5),
                _ => return false,
            },
            _ => return false,
        };
        self.game.action(value)
    }

    pub fn click(&mut self, cell: usize) -> bool {
        self.game.click(cell)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.game.toggle_pause()
    }

    /// Advance by the frame time in milliseconds
    pub fn tick(&mut self, dt_ms: f64) {
        let dt = dt_ms.clamp(0.0, u32::MAX as f64) as u32;
        self.game.tick(dt);
    }

    pub fn next_round(&mut self) -> bool {
        self.game.next_round()
    }

    pub fn submit_name(&mut self, name: &str) -> Option<u32> {
        self.game.submit_name(name).map(|rank| rank as u32)
    }

    pub fn back_to_menu(&mut self) {
        self.game.back_to_menu();
    }

    /// Events since the last call as a JSON array; their sounds play here
    pub fn take_events(&mut self) -> String {
        let events = self.game.drain_events();
        for event in &events {
            self.audio.play_event(event);
        }
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Failed to serialize events: {}", e);
            "[]".to_string()
        })
    }

    /// Current stage with the full match state as JSON
    pub fn state_json(&self) -> String {
        serde_json::to_string(self.game.stage()).unwrap_or_else(|_| "null".to_string())
    }

    /// Top entries of one mode as JSON
    pub fn highscores_json(&self, mode: &str) -> String {
        let Some(mode) = GameMode::from_str(mode) else {
            return "[]".to_string();
        };
        serde_json::to_string(&self.game.highscores().top(mode))
            .unwrap_or_else(|_| "[]".to_string())
    }

    pub fn settings_json(&self) -> String {
        serde_json::to_string(self.game.settings()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Replace the settings from JSON. Returns false for unreadable input.
    pub fn update_settings_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => {
                self.audio.apply_settings(&settings);
                self.game.update_settings(settings);
                true
            }
            Err(e) => {
                log::warn!("Rejected settings: {}", e);
                false
            }
        }
    }

    /// Power that lands on the target center
    /// Table layout measured by the page; rejected JSON keeps the current one
    pub fn set_geometry_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<TableGeometry>(json) {
            Ok(geometry) => {
                self.game.set_geometry(geometry);
                true
            }
            Err(e) => {
                log::warn!("Rejected table geometry: {}", e);
                false
            }
        }
    }

    /// Page focus changed (mutes audio when configured to)
    pub fn set_focused(&mut self, focused: bool) {
        self.audio.set_focused(focused);
    }

    pub fn reduced_motion(&self) -> bool {
        self.game.settings().reduced_motion
    }

    pub fn sweet_spot(&self) -> f32 {
        self.game.tuning().sweet_spot_power()
    }
}
