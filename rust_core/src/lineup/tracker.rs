//! Per-side lineup state machine.
//!
//! The tracker starts from the box-score starting five and applies
//! substitutions in event order. When bookkeeping can no longer be trusted
//! (a new period, or a set that stays the wrong size once a substitution
//! burst is over) it re-derives the five from a bounded forward scan:
//! players seen acting, or subbed out before being subbed in, are on court.
//! Known corrections fill whatever the scan cannot.
//!
//! A set is only trusted once it came from the starters or from an inference
//! that found all five. Substitutions on top of a short inference can reach
//! five players who were never on court together, so such a set stays
//! untrusted until a later inference succeeds.

use super::corrections::KnownCorrections;
use super::state::LineupState;
use crate::models::{
    Action, GameEvent, PlayerId, PlayerRef, SubstitutionKind, TeamSide, LINEUP_SIZE,
};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

/// Default number of events the forward scan may look at.
pub const DEFAULT_SCAN_WINDOW: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// Starters loaded, no event seen yet.
    WarmingUp,
    Active,
    /// A period > 1 began; the set is re-derived at the next event.
    PeriodTransition,
}

/// Game-level inputs shared by both sides' trackers.
#[derive(Debug, Clone, Copy)]
pub struct InferenceContext<'a> {
    pub game_id: &'a str,
    pub corrections: &'a KnownCorrections,
    pub scan_window: usize,
}

/// What lineup tracking had to work around in one game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineupDiagnostics {
    pub failed_substitutions: u32,
    pub reinferences: u32,
    pub corrections_applied: u32,
    /// (side, period) pairs left without a complete inferred lineup.
    pub incomplete_periods: Vec<(TeamSide, u8)>,
}

impl LineupDiagnostics {
    pub fn merge(&mut self, other: &LineupDiagnostics) {
        self.failed_substitutions += other.failed_substitutions;
        self.reinferences += other.reinferences;
        self.corrections_applied += other.corrections_applied;
        for entry in &other.incomplete_periods {
            if !self.incomplete_periods.contains(entry) {
                self.incomplete_periods.push(*entry);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineupTracker {
    side: TeamSide,
    state: LineupState,
    phase: TrackerPhase,
    period: u8,
    needs_repair: bool,
    trusted: bool,
    /// The side's full roster, for mapping correction names to players.
    roster: Vec<PlayerRef>,
    diagnostics: LineupDiagnostics,
}

impl LineupTracker {
    pub fn new(side: TeamSide, starters: Vec<PlayerRef>, roster: Vec<PlayerRef>) -> Self {
        let state = LineupState::with_players(side, starters);
        let trusted = state.is_complete();
        Self {
            side,
            needs_repair: !trusted,
            trusted,
            state,
            phase: TrackerPhase::WarmingUp,
            period: 1,
            roster,
            diagnostics: LineupDiagnostics::default(),
        }
    }

    pub fn side(&self) -> TeamSide {
        self.side
    }

    pub fn state(&self) -> &LineupState {
        &self.state
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Exactly five players, all known to be on court together.
    pub fn is_complete(&self) -> bool {
        self.trusted && self.state.is_complete()
    }

    pub fn diagnostics(&self) -> &LineupDiagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> LineupDiagnostics {
        self.diagnostics
    }

    /// Advance over `events[idx]`. Must be called for every event, in order.
    pub fn observe(&mut self, events: &[GameEvent], idx: usize, ctx: &InferenceContext<'_>) {
        self.prepare(events, idx, ctx);
        if let Some(event) = events.get(idx) {
            self.apply(event, ctx);
        }
    }

    /// First half of [`observe`](Self::observe): period transitions and
    /// repair. Afterwards the state is the set that was on court while the
    /// clock ran up to `events[idx]`.
    pub fn prepare(&mut self, events: &[GameEvent], idx: usize, ctx: &InferenceContext<'_>) {
        let Some(event) = events.get(idx) else {
            return;
        };

        if event.period != self.period {
            self.period = event.period;
            if event.period > 1 {
                self.phase = TrackerPhase::PeriodTransition;
            }
        }

        match self.phase {
            TrackerPhase::WarmingUp => self.phase = TrackerPhase::Active,
            TrackerPhase::PeriodTransition => {
                self.reinfer(events, idx, ctx);
                self.phase = TrackerPhase::Active;
                return;
            }
            TrackerPhase::Active => {}
        }

        if !event.is_substitution() && self.needs_repair {
            warn!(
                game_id = ctx.game_id,
                side = %self.side,
                period = event.period,
                on_court = self.state.len(),
                trusted = self.trusted,
                "Lineup bookkeeping drifted, re-inferring on-court players"
            );
            self.reinfer(events, idx, ctx);
        }
    }

    /// Second half of [`observe`](Self::observe): apply the event's own
    /// substitution, if it belongs to this side.
    pub fn apply(&mut self, event: &GameEvent, ctx: &InferenceContext<'_>) {
        match &event.action {
            Action::Substitution(kind) if event.side == Some(self.side) => {
                self.apply_substitution(kind, event, ctx);
            }
            Action::Substitution(_) => {}
            _ => self.needs_repair = false,
        }
    }

    fn apply_substitution(
        &mut self,
        kind: &SubstitutionKind,
        event: &GameEvent,
        ctx: &InferenceContext<'_>,
    ) {
        let Some(player) = event.player.as_ref() else {
            return;
        };
        let applied = match kind {
            SubstitutionKind::In => self.state.add(player.clone()),
            SubstitutionKind::Out => self.state.remove(player.id),
            SubstitutionKind::Swap { incoming } => {
                self.state.apply_substitution(player.id, incoming.clone())
            }
        };
        if !applied {
            self.diagnostics.failed_substitutions += 1;
            debug!(
                game_id = ctx.game_id,
                side = %self.side,
                sequence_index = event.sequence_index,
                "Substitution skipped"
            );
        }
        self.needs_repair = !self.is_complete();
    }

    /// Re-derive the on-court set starting at `events[start]`.
    fn reinfer(&mut self, events: &[GameEvent], start: usize, ctx: &InferenceContext<'_>) {
        let period = events.get(start).map_or(self.period, |e| e.period);
        let (mut on_court, entered) = scan_on_court(events, start, self.side, ctx.scan_window);
        self.diagnostics.reinferences += 1;

        if on_court.len() < LINEUP_SIZE {
            for name in ctx.corrections.players_for(ctx.game_id, self.side, period) {
                if on_court.len() == LINEUP_SIZE {
                    break;
                }
                let Some(player) = self.roster.iter().find(|p| p.name == name.trim()) else {
                    warn!(
                        game_id = ctx.game_id,
                        side = %self.side,
                        player = name,
                        "Lineup correction names a player missing from the roster"
                    );
                    continue;
                };
                if !entered.contains(&player.id) && !on_court.iter().any(|p| p.id == player.id) {
                    on_court.push(player.clone());
                    self.diagnostics.corrections_applied += 1;
                }
            }
        }

        self.trusted = on_court.len() == LINEUP_SIZE;
        if !self.trusted {
            warn!(
                game_id = ctx.game_id,
                side = %self.side,
                period,
                found = on_court.len(),
                "Could not infer a complete lineup"
            );
            if !self.diagnostics.incomplete_periods.contains(&(self.side, period)) {
                self.diagnostics.incomplete_periods.push((self.side, period));
            }
        }

        self.state.reset(on_court);
        self.needs_repair = false;
    }
}

/// Forward scan over the rest of `events[start]`'s period, bounded by
/// `window` events.
///
/// Returns up to five players confirmed on court for `side` (first seen
/// acting, or subbed out without having been subbed in first), plus every
/// player seen entering, who cannot have been on court at `start`.
pub fn scan_on_court(
    events: &[GameEvent],
    start: usize,
    side: TeamSide,
    window: usize,
) -> (Vec<PlayerRef>, FxHashSet<PlayerId>) {
    let mut on_court: Vec<PlayerRef> = Vec::with_capacity(LINEUP_SIZE);
    let mut entered: FxHashSet<PlayerId> = FxHashSet::default();

    let Some(period) = events.get(start).map(|e| e.period) else {
        return (on_court, entered);
    };

    for event in events[start..]
        .iter()
        .take_while(|e| e.period == period)
        .take(window)
    {
        if event.side != Some(side) {
            continue;
        }
        let Some(player) = event.player.as_ref() else {
            continue;
        };
        match &event.action {
            Action::Substitution(SubstitutionKind::In) => {
                entered.insert(player.id);
            }
            Action::Substitution(SubstitutionKind::Swap { incoming }) => {
                note_on_court(&mut on_court, &entered, player);
                entered.insert(incoming.id);
            }
            _ => note_on_court(&mut on_court, &entered, player),
        }
        if on_court.len() >= LINEUP_SIZE {
            break;
        }
    }

    (on_court, entered)
}

fn note_on_court(
    on_court: &mut Vec<PlayerRef>,
    entered: &FxHashSet<PlayerId>,
    player: &PlayerRef,
) {
    if !entered.contains(&player.id) && !on_court.iter().any(|p| p.id == player.id) {
        on_court.push(player.clone());
    }
}
