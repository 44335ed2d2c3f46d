//! Game source abstractions.
//!
//! Defines the GameSource trait the batch runner pulls schedules, play-by-play
//! logs and box scores through, so the replay core never knows where the data
//! came from (provider dumps on disk, an in-memory fixture, ...).

use crate::error::FetchError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub mod json_dir;
pub mod memory;

pub use json_dir::JsonDirSource;
pub use memory::MemorySource;

/// Pluggable supplier of raw per-game payloads.
#[async_trait]
pub trait GameSource: Send + Sync {
    /// Season schedule: game ids in schedule order.
    async fn schedule(&self) -> Result<Vec<String>, FetchError>;

    /// Raw play-by-play payload (live or legacy schema).
    async fn play_by_play(&self, game_id: &str) -> Result<Value, FetchError>;

    /// Raw box-score payload.
    async fn box_score(&self, game_id: &str) -> Result<Value, FetchError>;

    /// Source name for logging.
    fn source_name(&self) -> &str;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScheduleEntry {
    Id(String),
    Game {
        #[serde(rename = "gameId")]
        game_id: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchedulePayload {
    List(Vec<ScheduleEntry>),
    Wrapped { games: Vec<ScheduleEntry> },
}

/// Parse a schedule payload: either a list of ids / `{"gameId": ..}` objects,
/// or the same list under a `games` key.
pub fn parse_schedule(value: Value) -> Result<Vec<String>, FetchError> {
    let payload: SchedulePayload =
        serde_json::from_value(value).map_err(|e| FetchError::SchemaMismatch {
            game_id: "schedule".to_string(),
            message: e.to_string(),
        })?;
    let entries = match payload {
        SchedulePayload::List(entries) => entries,
        SchedulePayload::Wrapped { games } => games,
    };
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            ScheduleEntry::Id(id) => id,
            ScheduleEntry::Game { game_id } => game_id,
        })
        .collect())
}
