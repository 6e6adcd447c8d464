//! High score leaderboard system
//!
//! One collection for all game modes, persisted as a whole under a single
//! key. Each mode keeps its top 10, sorted descending by score; an earlier
//! submission stays ahead of a later one with the same score.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::platform::{KeyValueStore, StorageError};
use crate::sim::GameMode;
use crate::tuning::Difficulty;

/// Maximum number of high scores to keep per mode
pub const MAX_HIGH_SCORES: usize = 10;

/// Name used when the player leaves the name field empty
pub const DEFAULT_NAME: &str = "Anonym";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "clamped_score")]
    pub score: u64,
    /// Display date, as formatted when the score was set
    #[serde(default)]
    pub date: String,
    #[serde(rename = "game")]
    pub mode: GameMode,
    /// Not present in every stored version
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_difficulty"
    )]
    pub difficulty: Option<Difficulty>,
}

/// Older saves may hold negative blitz totals; those read as 0
fn clamped_score<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.max(0) as u64)
}

/// Unknown or mistyped difficulty values read as absent
fn lenient_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(Difficulty::from_str))
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "henrysBierolympiadeHighscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All entries, sorted descending by score
    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    /// Entries of one mode, best first
    pub fn for_mode(&self, mode: GameMode) -> impl Iterator<Item = &HighScoreEntry> {
        self.entries.iter().filter(move |e| e.mode == mode)
    }

    /// Top entries of one mode, at most `MAX_HIGH_SCORES`
    pub fn top(&self, mode: GameMode) -> Vec<&HighScoreEntry> {
        self.for_mode(mode).take(MAX_HIGH_SCORES).collect()
    }

    /// Check if a score qualifies for a mode's leaderboard
    pub fn qualifies(&self, score: u64, mode: GameMode) -> bool {
        if score == 0 {
            return false;
        }
        let mut count = 0;
        let mut lowest = None;
        for entry in self.for_mode(mode) {
            count += 1;
            lowest = Some(entry.score);
        }
        if count < MAX_HIGH_SCORES {
            return true;
        }
        lowest.map(|min| score > min).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64, mode: GameMode) -> Option<usize> {
        if !self.qualifies(score, mode) {
            return None;
        }
        Some(self.for_mode(mode).filter(|e| e.score >= score).count() + 1)
    }

    /// Add a new score to a mode's leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn commit(
        &mut self,
        name: &str,
        score: u64,
        mode: GameMode,
        difficulty: Option<Difficulty>,
        date: &str,
    ) -> Option<usize> {
        if !self.qualifies(score, mode) {
            return None;
        }

        let name = name.trim();
        let entry = HighScoreEntry {
            name: if name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                name.to_string()
            },
            score,
            date: date.to_string(),
            mode,
            difficulty,
        };

        // Insert after every entry with an equal or better score
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        let rank = self.entries[..pos].iter().filter(|e| e.mode == mode).count() + 1;
        self.entries.insert(pos, entry);
        self.trim();

        log::info!("High score {} for {} at rank {}", score, mode.as_str(), rank);
        Some(rank)
    }

    /// Drop everything past the top 10 of each mode
    fn trim(&mut self) {
        let mut counts: HashMap<GameMode, usize> = HashMap::new();
        self.entries.retain(|e| {
            let count = counts.entry(e.mode).or_insert(0);
            *count += 1;
            *count <= MAX_HIGH_SCORES
        });
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score of a mode (if any)
    pub fn top_score(&self, mode: GameMode) -> Option<u64> {
        self.for_mode(mode).next().map(|e| e.score)
    }

    /// Parse stored data. Malformed data reads as empty, malformed entries
    /// are skipped.
    pub fn from_json(json: &str) -> Self {
        let raw: Vec<serde_json::Value> = match serde_json::from_str(json) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Discarding unreadable high scores: {}", e);
                return Self::new();
            }
        };

        let mut entries: Vec<HighScoreEntry> = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value(value) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::warn!("Skipping malformed high score entry: {}", e),
            }
        }

        // Stable sort keeps stored order among equal scores
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        let mut scores = Self { entries };
        scores.trim();
        scores
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    /// Load high scores from the store
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Some(json) => {
                let scores = Self::from_json(&json);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            None => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    /// Save the whole collection to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        store.set(Self::STORAGE_KEY, &self.to_json())?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use proptest::prelude::*;

    const SHUFFLE: GameMode = GameMode::Schieben;
    const BLITZ: GameMode = GameMode::BierBlitz;

    fn filled(mode: GameMode, scores: &[u64]) -> HighScores {
        let mut hs = HighScores::new();
        for (i, score) in scores.iter().enumerate() {
            hs.commit(&format!("p{}", i), *score, mode, None, "1.1.2025");
        }
        hs
    }

    #[test]
    fn test_zero_never_qualifies() {
        let hs = HighScores::new();
        assert!(!hs.qualifies(0, SHUFFLE));
        assert!(!hs.qualifies(0, BLITZ));
        assert!(hs.qualifies(1, SHUFFLE));
    }

    #[test]
    fn test_full_board_needs_better_than_lowest() {
        let hs = filled(SHUFFLE, &[100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);
        assert!(!hs.qualifies(10, SHUFFLE));
        assert!(hs.qualifies(11, SHUFFLE));
        // The other mode is unaffected
        assert!(hs.qualifies(1, BLITZ));
        assert_eq!(hs.potential_rank(95, SHUFFLE), Some(2));
        assert_eq!(hs.potential_rank(5, SHUFFLE), None);
    }

    #[test]
    fn test_commit_sorts_and_trims() {
        let mut hs = filled(SHUFFLE, &[30, 100, 10, 70, 50, 20, 90, 40, 80, 60]);
        let scores: Vec<u64> = hs.for_mode(SHUFFLE).map(|e| e.score).collect();
        assert_eq!(scores, vec![100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);

        assert_eq!(hs.commit("new", 65, SHUFFLE, None, "2.1.2025"), Some(5));
        let scores: Vec<u64> = hs.for_mode(SHUFFLE).map(|e| e.score).collect();
        assert_eq!(scores, vec![100, 90, 80, 70, 65, 60, 50, 40, 30, 20]);

        assert_eq!(hs.commit("low", 5, SHUFFLE, None, "2.1.2025"), None);
        assert_eq!(hs.for_mode(SHUFFLE).count(), MAX_HIGH_SCORES);
    }

    #[test]
    fn test_earlier_submission_wins_ties() {
        let mut hs = HighScores::new();
        hs.commit("first", 50, SHUFFLE, None, "");
        assert_eq!(hs.commit("second", 50, SHUFFLE, None, ""), Some(2));
        let names: Vec<&str> = hs.for_mode(SHUFFLE).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_modes_bounded_independently() {
        let mut hs = HighScores::new();
        for i in 1..=15 {
            hs.commit("s", i * 10, SHUFFLE, None, "");
            hs.commit("b", i, BLITZ, Some(Difficulty::Hard), "");
        }
        assert_eq!(hs.top(SHUFFLE).len(), 10);
        assert_eq!(hs.top(BLITZ).len(), 10);
        assert_eq!(hs.top_score(SHUFFLE), Some(150));
        assert_eq!(hs.top_score(BLITZ), Some(15));
        assert_eq!(hs.for_mode(BLITZ).last().map(|e| e.score), Some(6));
    }

    #[test]
    fn test_empty_name_defaults() {
        let mut hs = HighScores::new();
        hs.commit("   ", 42, BLITZ, None, "");
        hs.commit("  Henry  ", 41, BLITZ, None, "");
        let names: Vec<&str> = hs.for_mode(BLITZ).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![DEFAULT_NAME, "Henry"]);
    }

    #[test]
    fn test_loads_older_entry_shapes() {
        let json = r#"[
            {"name":"Ana","score":40,"date":"1.5.2024","difficulty":"hard","game":"schieben"},
            {"name":"Ben","score":90,"date":"2.5.2024","game":"schieben"},
            {"name":"Cem","score":12,"date":"3.5.2024","difficulty":"legendary","game":"bier-blitz"},
            {"name":"Dan","score":7,"date":"4.5.2024","difficulty":3,"game":"bier-blitz"},
            {"name":"Eve","score":-15,"date":"5.5.2024","game":"bier-blitz"}
        ]"#;
        let hs = HighScores::from_json(json);
        let shuffle: Vec<&HighScoreEntry> = hs.for_mode(SHUFFLE).collect();
        assert_eq!(shuffle[0].name, "Ben");
        assert_eq!(shuffle[0].difficulty, None);
        assert_eq!(shuffle[1].difficulty, Some(Difficulty::Hard));
        let blitz: Vec<&HighScoreEntry> = hs.for_mode(BLITZ).collect();
        assert_eq!(blitz.len(), 3);
        assert!(blitz.iter().all(|e| e.difficulty.is_none()));
        assert_eq!((blitz[2].name.as_str(), blitz[2].score), ("Eve", 0));
    }

    #[test]
    fn test_malformed_data_reads_as_empty() {
        assert!(HighScores::from_json("not json").is_empty());
        assert!(HighScores::from_json("{\"entries\":[]}").is_empty());

        let partial = r#"[{"name":"ok","score":5,"game":"schieben"},{"score":"lots"},{"name":"x","score":3,"game":"darts"}]"#;
        let hs = HighScores::from_json(partial);
        assert_eq!(hs.entries().len(), 1);
        assert_eq!(hs.entries()[0].date, "");
    }

    #[test]
    fn test_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(HighScores::load(&store).is_empty());

        let mut hs = filled(SHUFFLE, &[20, 100, 50]);
        hs.commit("Blitzer", 33, BLITZ, Some(Difficulty::Extreme), "9.9.2025");
        hs.save(&mut store).unwrap();

        let loaded = HighScores::load(&store);
        assert_eq!(loaded, hs);
    }

    #[test]
    fn test_stored_shape_is_a_bare_array() {
        let hs = filled(BLITZ, &[5]);
        let json = hs.to_json();
        assert!(json.starts_with('['));
        assert!(json.contains("\"game\":\"bier-blitz\""));
        assert!(!json.contains("difficulty"));
    }

    proptest! {
        #[test]
        fn prop_bounded_and_sorted(commits in prop::collection::vec((0u64..500, any::<bool>()), 0..60)) {
            let mut hs = HighScores::new();
            for (score, blitz) in commits {
                let mode = if blitz { BLITZ } else { SHUFFLE };
                hs.commit("p", score, mode, None, "");
                for mode in GameMode::ALL {
                    let scores: Vec<u64> = hs.for_mode(mode).map(|e| e.score).collect();
                    prop_assert!(scores.len() <= MAX_HIGH_SCORES);
                    prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));
                    prop_assert!(!scores.contains(&0));
                }
            }
        }
    }
}
