//! Game settings and preferences
//!
//! Persisted separately from the highscores under their own key.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ROUNDS;
use crate::platform::{KeyValueStore, StorageError};
use crate::sim::GameMode;
use crate::tuning::Difficulty;

/// Upper bound for configurable rounds per match
pub const MAX_ROUNDS: u32 = 20;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preselected difficulty on the menu
    pub difficulty: Difficulty,

    // === Match length ===
    /// Rounds per mug-sliding match
    pub shuffle_rounds: u32,
    /// Rounds per Bier-Blitz match
    pub blitz_rounds: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (skip mug wobble and flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,

            shuffle_rounds: DEFAULT_ROUNDS,
            blitz_rounds: DEFAULT_ROUNDS,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "henrysBierolympiadeSettings";

    /// Rounds per match for a mode, clamped to [1, MAX_ROUNDS]
    pub fn rounds_for(&self, mode: GameMode) -> u32 {
        let rounds = match mode {
            GameMode::Schieben => self.shuffle_rounds,
            GameMode::BierBlitz => self.blitz_rounds,
        };
        rounds.clamp(1, MAX_ROUNDS)
    }

    /// Volume applied to sound effects (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective volume while the page has (or lacks) focus
    pub fn volume_when(&self, focused: bool) -> f32 {
        if !focused && self.mute_on_blur {
            0.0
        } else {
            self.effective_volume()
        }
    }

    /// Load settings from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Discarding unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
