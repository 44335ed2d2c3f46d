//! Single-game replay: normalize, track lineups, aggregate stints.
//!
//! One call owns every piece of mutable state for its game, so games can be
//! replayed on any worker thread. Within a game the scan is strictly ordered.

use crate::elapsed::elapsed_minutes;
use crate::error::GameError;
use crate::lineup::{
    InferenceContext, KnownCorrections, LineupDiagnostics, LineupTracker, DEFAULT_SCAN_WINDOW,
};
use crate::models::{TeamGameRecord, TeamSide};
use crate::normalize::{EventNormalizer, NormalizeReport, RawPlayByPlay};
use crate::roster::{BoxScore, HeightIndex, NameCorrections, PlayerDirectory, TeamResolver};
use crate::stints::StintAggregator;
use tracing::info;

/// Everything fetched for one game.
#[derive(Debug, Clone)]
pub struct GameInput {
    pub game_id: String,
    pub box_score: BoxScore,
    pub play_by_play: RawPlayByPlay,
}

/// Read-only lookup tables shared by every replay in a batch.
#[derive(Debug, Default)]
pub struct ReferenceTables {
    pub names: NameCorrections,
    pub directory: PlayerDirectory,
    pub heights: HeightIndex,
    pub lineups: KnownCorrections,
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub scan_window: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            scan_window: DEFAULT_SCAN_WINDOW,
        }
    }
}

/// Non-fatal problems met while replaying one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayDiagnostics {
    pub game_id: String,
    pub normalize: NormalizeReport,
    pub lineup: LineupDiagnostics,
    pub events: usize,
    /// Events skipped because a side had no trusted five on court while the
    /// clock ran up to them.
    pub excluded_events: usize,
    pub stints: usize,
}

#[derive(Debug, Clone)]
pub struct GameReplay {
    pub records: Vec<TeamGameRecord>,
    pub diagnostics: ReplayDiagnostics,
}

/// Replay one game into per-stint records.
pub fn replay_game(
    input: &GameInput,
    tables: &ReferenceTables,
    options: ReplayOptions,
) -> Result<GameReplay, GameError> {
    let game_id = input.game_id.as_str();
    let box_score = &input.box_score;
    if !box_score.teams_resolved() {
        return Err(GameError::UnresolvedTeams {
            game_id: game_id.to_string(),
        });
    }

    let teams = TeamResolver::new(box_score, &tables.names);
    let normalizer = EventNormalizer::new(game_id, &teams, &tables.directory);
    let (events, mut report) = normalizer.normalize(&input.play_by_play);
    if events.is_empty() {
        return Err(GameError::schema(
            game_id,
            format!("no usable events in {} raw rows", report.raw_rows),
        ));
    }

    // Starters and rosters go through the same name resolution as events so
    // a player keeps one spelling across every lineup key.
    let mut tracker_for = |side: TeamSide| {
        let starters = box_score
            .starting_five(side, &tables.names)
            .into_iter()
            .map(|p| normalizer.player_ref(p.id, &mut report))
            .collect();
        let roster = box_score
            .roster(side, &tables.names)
            .into_iter()
            .map(|p| normalizer.player_ref(p.id, &mut report))
            .collect();
        LineupTracker::new(side, starters, roster)
    };
    let mut home = tracker_for(TeamSide::Home);
    let mut away = tracker_for(TeamSide::Away);

    let ctx = InferenceContext {
        game_id,
        corrections: &tables.lineups,
        scan_window: options.scan_window,
    };

    let mut aggregator = StintAggregator::new();
    let mut previous: Option<(u8, f64)> = None;
    let mut excluded_events = 0;

    for (idx, event) in events.iter().enumerate() {
        home.prepare(&events, idx, &ctx);
        away.prepare(&events, idx, &ctx);

        let previous_remaining = previous
            .filter(|(period, _)| *period == event.period)
            .map(|(_, clock)| clock);
        let elapsed = elapsed_minutes(
            previous_remaining,
            event.clock_remaining,
            event.is_period_start(),
        );
        previous = Some((event.period, event.clock_remaining));

        // The fives that were on court while the clock ran up to this event,
        // before its own substitution moves anyone.
        let on_court = (home.is_complete() && away.is_complete())
            .then(|| (home.state().lineup(), away.state().lineup()));

        home.apply(event, &ctx);
        away.apply(event, &ctx);

        let Some((home_lineup, away_lineup)) = on_court else {
            excluded_events += 1;
            continue;
        };
        if event.is_period_start() {
            continue;
        }
        aggregator.record(event, elapsed, &home_lineup, &away_lineup);
    }

    let mut lineup = home.into_diagnostics();
    lineup.merge(&away.into_diagnostics());

    let stints = aggregator.len();
    let records = aggregator.into_records(game_id, box_score, &tables.heights);

    info!(
        game_id,
        events = events.len(),
        excluded = excluded_events,
        stints,
        "Replayed game"
    );

    Ok(GameReplay {
        records,
        diagnostics: ReplayDiagnostics {
            game_id: game_id.to_string(),
            normalize: report,
            lineup,
            events: events.len(),
            excluded_events,
            stints,
        },
    })
}
