//! In-memory game source for tests and dry runs.

use super::GameSource;
use crate::error::FetchError;
use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct MemorySource {
    schedule: Vec<String>,
    games: FxHashMap<String, (Value, Value)>,
    in_progress: FxHashSet<String>,
    /// Remaining transient failures to inject per game.
    flaky: Mutex<FxHashMap<String, u32>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a played game (appended to the schedule).
    pub fn with_game(mut self, game_id: &str, play_by_play: Value, box_score: Value) -> Self {
        self.schedule.push(game_id.to_string());
        self.games
            .insert(game_id.to_string(), (play_by_play, box_score));
        self
    }

    /// Add a scheduled game with no data yet.
    pub fn with_unplayed(mut self, game_id: &str) -> Self {
        self.schedule.push(game_id.to_string());
        self
    }

    pub fn with_in_progress(mut self, game_id: &str) -> Self {
        self.schedule.push(game_id.to_string());
        self.in_progress.insert(game_id.to_string());
        self
    }

    /// Fail the next `failures` play-by-play fetches for a game.
    pub fn with_transient_failures(self, game_id: &str, failures: u32) -> Self {
        self.flaky.lock().insert(game_id.to_string(), failures);
        self
    }

    fn lookup(&self, game_id: &str) -> Result<&(Value, Value), FetchError> {
        if self.in_progress.contains(game_id) {
            return Err(FetchError::InProgress {
                game_id: game_id.to_string(),
            });
        }
        self.games.get(game_id).ok_or_else(|| FetchError::NotYetPlayed {
            game_id: game_id.to_string(),
        })
    }
}

#[async_trait]
impl GameSource for MemorySource {
    async fn schedule(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.schedule.clone())
    }

    async fn play_by_play(&self, game_id: &str) -> Result<Value, FetchError> {
        if let Some(remaining) = self.flaky.lock().get_mut(game_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FetchError::Transient {
                    game_id: game_id.to_string(),
                    message: "injected failure".to_string(),
                });
            }
        }
        self.lookup(game_id).map(|(pbp, _)| pbp.clone())
    }

    async fn box_score(&self, game_id: &str) -> Result<Value, FetchError> {
        self.lookup(game_id).map(|(_, box_score)| box_score.clone())
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}
