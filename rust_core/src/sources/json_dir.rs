//! Game source backed by provider JSON dumps on disk.
//!
//! Layout under the root directory:
//! - `schedule.json`
//! - `pbp/{game_id}.json`
//! - `boxscore/{game_id}.json`
//!
//! A missing or empty play-by-play dump means the game has not been played.
//! A play-by-play dump without a box score, or a box score reporting
//! `gameStatus: 2`, means the game is still in progress.

use super::{parse_schedule, GameSource};
use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const STATUS_IN_PROGRESS: u64 = 2;

#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

enum Dump {
    Missing,
    Empty,
    Json(Value),
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pbp_path(&self, game_id: &str) -> PathBuf {
        self.root.join("pbp").join(format!("{game_id}.json"))
    }

    fn box_path(&self, game_id: &str) -> PathBuf {
        self.root.join("boxscore").join(format!("{game_id}.json"))
    }

    async fn read_dump(&self, game_id: &str, path: &Path) -> Result<Dump, FetchError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Dump::Missing),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(FetchError::SchemaMismatch {
                    game_id: game_id.to_string(),
                    message: format!("{} is not UTF-8", path.display()),
                })
            }
            Err(e) => {
                return Err(FetchError::Transient {
                    game_id: game_id.to_string(),
                    message: format!("{}: {e}", path.display()),
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Dump::Empty);
        }
        serde_json::from_str(&content)
            .map(Dump::Json)
            .map_err(|e| FetchError::SchemaMismatch {
                game_id: game_id.to_string(),
                message: format!("{}: {e}", path.display()),
            })
    }
}

#[async_trait]
impl GameSource for JsonDirSource {
    async fn schedule(&self) -> Result<Vec<String>, FetchError> {
        let path = self.root.join("schedule.json");
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| FetchError::SchemaMismatch {
                game_id: "schedule".to_string(),
                message: e.to_string(),
            })?;
        parse_schedule(value)
    }

    async fn play_by_play(&self, game_id: &str) -> Result<Value, FetchError> {
        match self.read_dump(game_id, &self.pbp_path(game_id)).await? {
            Dump::Json(value) => Ok(value),
            Dump::Missing | Dump::Empty => {
                debug!(game_id, "No play-by-play dump");
                Err(FetchError::NotYetPlayed {
                    game_id: game_id.to_string(),
                })
            }
        }
    }

    async fn box_score(&self, game_id: &str) -> Result<Value, FetchError> {
        match self.read_dump(game_id, &self.box_path(game_id)).await? {
            Dump::Json(value) => {
                let status = value
                    .get("gameStatus")
                    .or_else(|| value.pointer("/boxScoreTraditional/gameStatus"))
                    .and_then(Value::as_u64);
                if status == Some(STATUS_IN_PROGRESS) {
                    return Err(FetchError::InProgress {
                        game_id: game_id.to_string(),
                    });
                }
                Ok(value)
            }
            Dump::Missing | Dump::Empty => Err(FetchError::InProgress {
                game_id: game_id.to_string(),
            }),
        }
    }

    fn source_name(&self) -> &str {
        "json_dir"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn source() -> (tempfile::TempDir, JsonDirSource) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pbp")).unwrap();
        fs::create_dir_all(dir.path().join("boxscore")).unwrap();
        let source = JsonDirSource::new(dir.path());
        (dir, source)
    }

    #[tokio::test]
    async fn test_schedule_and_payloads() {
        let (dir, source) = source();
        fs::write(dir.path().join("schedule.json"), r#"["0022500001"]"#).unwrap();
        fs::write(
            dir.path().join("pbp/0022500001.json"),
            r#"{"game": {"actions": []}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("boxscore/0022500001.json"),
            r#"{"gameStatus": 3}"#,
        )
        .unwrap();

        assert_eq!(source.schedule().await.unwrap(), vec!["0022500001"]);
        assert!(source.play_by_play("0022500001").await.unwrap().get("game").is_some());
        assert!(source.box_score("0022500001").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_and_empty_dumps_are_not_yet_played() {
        let (dir, source) = source();
        fs::write(dir.path().join("pbp/0022500002.json"), "  ").unwrap();

        assert!(matches!(
            source.play_by_play("0022500001").await,
            Err(FetchError::NotYetPlayed { .. })
        ));
        assert!(matches!(
            source.play_by_play("0022500002").await,
            Err(FetchError::NotYetPlayed { .. })
        ));
    }

    #[tokio::test]
    async fn test_in_progress_box_score() {
        let (dir, source) = source();
        fs::write(
            dir.path().join("boxscore/0022500003.json"),
            r#"{"boxScoreTraditional": {"gameStatus": 2}}"#,
        )
        .unwrap();

        assert!(matches!(
            source.box_score("0022500003").await,
            Err(FetchError::InProgress { .. })
        ));
        assert!(matches!(
            source.box_score("0022500004").await,
            Err(FetchError::InProgress { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_dump_is_schema_mismatch() {
        let (dir, source) = source();
        fs::write(dir.path().join("pbp/0022500005.json"), "{ nope").unwrap();
        assert!(matches!(
            source.play_by_play("0022500005").await,
            Err(FetchError::SchemaMismatch { .. })
        ));
    }
}
