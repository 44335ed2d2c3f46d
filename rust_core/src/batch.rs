//! Season batch runner.
//!
//! This module provides:
//! - Schedule selection by game id prefix and range
//! - Sequential fetching with retry and a fixed pause between games
//! - Parallel replay of fetched games (rayon)
//! - A per-run aggregation context flushed to the per-team store
//!
//! The batch stops at the first game that has not been played yet or is still
//! in progress: the schedule is in date order, so every later game is in the
//! same state.

use crate::error::GameError;
use crate::models::TeamGameRecord;
use crate::normalize::RawPlayByPlay;
use crate::replay::{
    replay_game, GameInput, GameReplay, ReferenceTables, ReplayDiagnostics, ReplayOptions,
};
use crate::retry::{fetch_with_retry, RetryPolicy};
use crate::roster::BoxScore;
use crate::sources::GameSource;
use crate::store::TeamTableStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Regular season game ids.
pub const DEFAULT_GAME_ID_PREFIX: &str = "0022";
pub const DEFAULT_PAUSE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub game_id_prefix: String,
    /// Start of the `[start, end)` slice of the filtered schedule.
    pub range_start: usize,
    pub range_end: Option<usize>,
    pub retry: RetryPolicy,
    /// Pause between consecutive game fetches.
    pub pause: Duration,
    pub replay: ReplayOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            game_id_prefix: DEFAULT_GAME_ID_PREFIX.to_string(),
            range_start: 0,
            range_end: None,
            retry: RetryPolicy::default(),
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
            replay: ReplayOptions::default(),
        }
    }
}

/// Filter the schedule by prefix (dropping repeats) and take the configured
/// slice.
pub fn select_games(schedule: &[String], options: &BatchOptions) -> Vec<String> {
    let mut seen = rustc_hash::FxHashSet::default();
    let filtered: Vec<String> = schedule
        .iter()
        .filter(|id| id.starts_with(&options.game_id_prefix))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    let end = options
        .range_end
        .unwrap_or(filtered.len())
        .min(filtered.len());
    let start = options.range_start.min(end);
    filtered[start..end].to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGame {
    pub game_id: String,
    pub reason: String,
}

/// Result of the fetch phase.
#[derive(Debug, Default)]
pub struct FetchedGames {
    pub inputs: Vec<GameInput>,
    pub skipped: Vec<SkippedGame>,
    /// First game that was not played yet or still in progress.
    pub stopped_at: Option<String>,
}

async fn fetch_game(
    source: &dyn GameSource,
    game_id: &str,
    retry: &RetryPolicy,
) -> Result<GameInput, GameError> {
    let pbp = fetch_with_retry(game_id, retry, || source.play_by_play(game_id)).await?;
    let box_json = fetch_with_retry(game_id, retry, || source.box_score(game_id)).await?;

    let play_by_play = RawPlayByPlay::from_json(game_id, &pbp)?;
    let box_score = BoxScore::from_json(game_id, box_json)?;
    Ok(GameInput {
        game_id: game_id.to_string(),
        box_score,
        play_by_play,
    })
}

/// Fetch games in schedule order until the first unplayed game.
pub async fn fetch_games(
    source: &dyn GameSource,
    game_ids: &[String],
    options: &BatchOptions,
) -> FetchedGames {
    let mut fetched = FetchedGames::default();

    for (i, game_id) in game_ids.iter().enumerate() {
        if i > 0 && !options.pause.is_zero() {
            tokio::time::sleep(options.pause).await;
        }

        match fetch_game(source, game_id, &options.retry).await {
            Ok(input) => fetched.inputs.push(input),
            Err(GameError::Fetch(e)) if e.is_terminal() => {
                info!(game_id = %game_id, reason = %e, "Stopping batch");
                fetched.stopped_at = Some(game_id.clone());
                break;
            }
            Err(e) => {
                error!(game_id = %game_id, error = %e, "Skipping game");
                fetched.skipped.push(SkippedGame {
                    game_id: game_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        source = source.source_name(),
        fetched = fetched.inputs.len(),
        skipped = fetched.skipped.len(),
        "Fetch phase complete"
    );
    fetched
}

/// Replay games in parallel. Output order follows `inputs`.
pub fn replay_all(
    inputs: &[GameInput],
    tables: &ReferenceTables,
    options: ReplayOptions,
) -> Vec<(String, Result<GameReplay, GameError>)> {
    inputs
        .par_iter()
        .map(|input| (input.game_id.clone(), replay_game(input, tables, options)))
        .collect()
}

/// Per-run accumulation of records keyed by team abbreviation.
#[derive(Debug, Default)]
pub struct AggregationContext {
    by_team: BTreeMap<String, Vec<TeamGameRecord>>,
}

impl AggregationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, records: Vec<TeamGameRecord>) {
        for record in records {
            self.by_team
                .entry(record.team.clone())
                .or_default()
                .push(record);
        }
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.by_team.keys().map(String::as_str)
    }

    pub fn records(&self, team: &str) -> &[TeamGameRecord] {
        self.by_team.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> usize {
        self.by_team.values().map(Vec::len).sum()
    }

    /// Append every team's rows to the store and renumber its games.
    pub fn flush(self, store: &TeamTableStore) -> Result<usize> {
        let mut written = 0;
        for (team, records) in self.by_team {
            written += store
                .append(&team, &records)
                .with_context(|| format!("Failed to append rows for {team}"))?;
            store
                .assign_game_numbers(&team)
                .with_context(|| format!("Failed to renumber games for {team}"))?;
        }
        Ok(written)
    }
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scheduled: usize,
    pub replayed: usize,
    pub skipped: Vec<SkippedGame>,
    pub stopped_at: Option<String>,
    pub rows_written: usize,
    pub diagnostics: Vec<ReplayDiagnostics>,
}

impl BatchSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Events excluded across all games for incomplete lineups.
    pub fn excluded_events(&self) -> usize {
        self.diagnostics.iter().map(|d| d.excluded_events).sum()
    }
}

/// Fetch, replay and store one batch.
pub async fn run_batch(
    source: &dyn GameSource,
    tables: Arc<ReferenceTables>,
    store: &TeamTableStore,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    let started_at = Utc::now();

    let schedule = source
        .schedule()
        .await
        .with_context(|| format!("Failed to load schedule from {}", source.source_name()))?;
    let game_ids = select_games(&schedule, options);
    info!(
        scheduled = schedule.len(),
        selected = game_ids.len(),
        prefix = %options.game_id_prefix,
        "Starting batch"
    );

    let FetchedGames {
        inputs,
        mut skipped,
        stopped_at,
    } = fetch_games(source, &game_ids, options).await;

    let replay_options = options.replay;
    let results = tokio::task::spawn_blocking(move || replay_all(&inputs, &tables, replay_options))
        .await
        .context("Replay workers panicked")?;

    let mut context = AggregationContext::new();
    let mut diagnostics = Vec::new();
    for (game_id, result) in results {
        match result {
            Ok(replay) => {
                if replay.diagnostics.excluded_events > 0 {
                    warn!(
                        game_id = %game_id,
                        excluded = replay.diagnostics.excluded_events,
                        "Events excluded for incomplete lineups"
                    );
                }
                context.add(replay.records);
                diagnostics.push(replay.diagnostics);
            }
            Err(e) => {
                error!(game_id = %game_id, error = %e, "Replay failed");
                skipped.push(SkippedGame {
                    game_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    let rows_written = context.flush(store)?;
    let summary = BatchSummary {
        started_at,
        finished_at: Utc::now(),
        scheduled: game_ids.len(),
        replayed: diagnostics.len(),
        skipped,
        stopped_at,
        rows_written,
        diagnostics,
    };

    info!(
        replayed = summary.replayed,
        skipped = summary.skipped.len(),
        stopped_at = summary.stopped_at.as_deref().unwrap_or("-"),
        rows = summary.rows_written,
        elapsed_ms = summary.elapsed().num_milliseconds(),
        "Batch complete"
    );
    Ok(summary)
}
