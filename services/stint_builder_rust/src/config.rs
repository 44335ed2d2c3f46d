//! Configuration constants and environment loading for the stint builder
//!
//! This module manages all runtime configuration:
//! - Input dumps and output table locations
//! - Schedule selection (game id prefix and range)
//! - Fetch retry and pacing
//! - Lineup inference and worker settings
//! - Reference table paths

use anyhow::{Context, Result};
use courtedge_core::batch::{BatchOptions, DEFAULT_GAME_ID_PREFIX, DEFAULT_PAUSE_MS};
use courtedge_core::lineup::{KnownCorrections, DEFAULT_SCAN_WINDOW};
use courtedge_core::retry::{RetryPolicy, DEFAULT_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS};
use courtedge_core::roster::{HeightIndex, NameCorrections, PlayerDirectory};
use courtedge_core::{ReferenceTables, ReplayOptions, TeamTableStore};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory holding `schedule.json`, `pbp/` and `boxscore/`
pub const DEFAULT_DATA_DIR: &str = "data/raw";

/// Default directory for the per-team tables
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default per-team table name prefix
pub const DEFAULT_TABLE_PREFIX: &str = "S2";

/// Default season label in per-team table names
pub const DEFAULT_SEASON_LABEL: &str = "2025_26";

pub const DEFAULT_NAME_CORRECTIONS_PATH: &str = "data/name_corrections.json";
pub const DEFAULT_LINEUP_CORRECTIONS_PATH: &str = "data/lineup_corrections.json";

/// Configuration for one stint builder run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub table_prefix: String,
    pub season_label: String,
    pub game_id_prefix: String,
    pub range_start: usize,
    pub range_end: Option<usize>,
    pub fetch_max_attempts: u32,
    pub fetch_backoff: Vec<Duration>,
    pub fetch_pause: Duration,
    pub scan_window: usize,
    /// 0 keeps the rayon default.
    pub worker_threads: usize,
    pub active_roster_path: Option<PathBuf>,
    pub player_table_path: Option<PathBuf>,
    pub player_reference_path: Option<PathBuf>,
    pub name_corrections_path: PathBuf,
    pub lineup_corrections_path: PathBuf,
}

impl PipelineConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());
        let path = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };

        let fetch_backoff = lookup("FETCH_BACKOFF_SECS")
            .map(|v| parse_backoff(&v))
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_BACKOFF_SECS
                    .iter()
                    .map(|s| Duration::from_secs(*s))
                    .collect()
            });

        Self {
            data_dir: path("DATA_DIR").unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            output_dir: path("OUTPUT_DIR").unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            table_prefix: lookup("TABLE_PREFIX")
                .unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string()),
            season_label: lookup("SEASON_LABEL")
                .unwrap_or_else(|| DEFAULT_SEASON_LABEL.to_string()),
            game_id_prefix: lookup("GAME_ID_PREFIX")
                .unwrap_or_else(|| DEFAULT_GAME_ID_PREFIX.to_string()),
            range_start: parsed("GAME_RANGE_START").unwrap_or(0),
            range_end: parsed("GAME_RANGE_END"),
            fetch_max_attempts: lookup("FETCH_MAX_ATTEMPTS")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(DEFAULT_MAX_ATTEMPTS)
                .max(1),
            fetch_backoff,
            fetch_pause: Duration::from_millis(
                lookup("FETCH_PAUSE_MS")
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(DEFAULT_PAUSE_MS),
            ),
            scan_window: parsed("LINEUP_SCAN_WINDOW")
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_SCAN_WINDOW),
            worker_threads: parsed("WORKER_THREADS").unwrap_or(0),
            active_roster_path: path("ACTIVE_ROSTER_PATH"),
            player_table_path: path("PLAYER_TABLE_PATH"),
            player_reference_path: path("PLAYER_REFERENCE_PATH"),
            name_corrections_path: path("NAME_CORRECTIONS_PATH")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_NAME_CORRECTIONS_PATH)),
            lineup_corrections_path: path("LINEUP_CORRECTIONS_PATH")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LINEUP_CORRECTIONS_PATH)),
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            game_id_prefix: self.game_id_prefix.clone(),
            range_start: self.range_start,
            range_end: self.range_end,
            retry: RetryPolicy::new(self.fetch_max_attempts, self.fetch_backoff.clone()),
            pause: self.fetch_pause,
            replay: ReplayOptions {
                scan_window: self.scan_window,
            },
        }
    }

    pub fn store(&self) -> TeamTableStore {
        TeamTableStore::new(&self.output_dir, &self.table_prefix, &self.season_label)
    }

    /// Load every reference table. Name corrections load first: they are
    /// applied to the other tables as they load.
    pub fn load_tables(&self) -> Result<ReferenceTables> {
        let names = NameCorrections::load(&self.name_corrections_path)?;
        let directory = PlayerDirectory::load(
            self.active_roster_path.as_deref(),
            self.player_table_path.as_deref(),
            &names,
        )
        .context("Failed to load player directory")?;
        let heights = match self.player_reference_path.as_deref() {
            Some(path) => HeightIndex::load(path, &names)?,
            None => HeightIndex::new(),
        };
        let lineups = KnownCorrections::load(&self.lineup_corrections_path)?;

        Ok(ReferenceTables {
            names,
            directory,
            heights,
            lineups,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Parse a comma-separated list of backoff seconds, ignoring bad entries.
pub fn parse_backoff(raw: &str) -> Vec<Duration> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> PipelineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PipelineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.table_prefix, "S2");
        assert_eq!(config.season_label, "2025_26");
        assert_eq!(config.game_id_prefix, "0022");
        assert_eq!(config.fetch_max_attempts, 3);
        assert_eq!(config.fetch_backoff.len(), 3);
        assert_eq!(config.fetch_pause, Duration::from_millis(500));
        assert_eq!(config.scan_window, 150);
        assert_eq!(config.range_end, None);
        assert!(config.player_reference_path.is_none());
        assert_eq!(
            config.store().table_path("HOU"),
            PathBuf::from("output/S2_HOU_2025_26.csv")
        );
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("GAME_ID_PREFIX", "0012"),
            ("GAME_RANGE_START", "10"),
            ("GAME_RANGE_END", "20"),
            ("FETCH_MAX_ATTEMPTS", "0"),
            ("FETCH_BACKOFF_SECS", "5, x,7"),
            ("LINEUP_SCAN_WINDOW", "0"),
            ("PLAYER_REFERENCE_PATH", "refs/players.csv"),
        ]);
        assert_eq!(config.game_id_prefix, "0012");
        assert_eq!((config.range_start, config.range_end), (10, Some(20)));
        assert_eq!(config.fetch_max_attempts, 1);
        assert_eq!(
            config.fetch_backoff,
            vec![Duration::from_secs(5), Duration::from_secs(7)]
        );
        assert_eq!(config.scan_window, 150);
        assert_eq!(
            config.player_reference_path,
            Some(PathBuf::from("refs/players.csv"))
        );

        let options = config.batch_options();
        assert_eq!(options.range_start, 10);
        assert_eq!(options.retry.max_attempts, 1);
    }

    #[test]
    fn test_parse_backoff() {
        assert!(parse_backoff("").is_empty());
        assert_eq!(parse_backoff("21,33,42").len(), 3);
    }

    #[test]
    fn test_load_tables_with_missing_files() {
        let config = config(&[
            ("NAME_CORRECTIONS_PATH", "/nonexistent/names.json"),
            ("LINEUP_CORRECTIONS_PATH", "/nonexistent/lineups.json"),
        ]);
        let tables = config.load_tables().unwrap();
        assert!(tables.names.is_empty());
        assert!(tables.lineups.is_empty());
        assert!(tables.heights.is_empty());
    }
}
