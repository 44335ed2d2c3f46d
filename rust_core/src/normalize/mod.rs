//! Event Normalizer: raw provider play-by-play to canonical [`GameEvent`]s.
//!
//! This module provides:
//! - Schema detection for the live (`game.actions`) and legacy
//!   (`resultSets`) payloads
//! - Team side resolution through the game's box score
//! - Tiered player name resolution with the `unknown` sentinel
//! - Clock parsing to seconds remaining and defensive qualifier parsing

pub mod clock;
pub mod legacy;
pub mod literal;
pub mod live;
pub mod qualifiers;

use crate::error::FetchError;
use crate::models::{Action, GameEvent, PlayerId, PlayerRef, QualifierSet};
use crate::roster::{NameSource, PlayerDirectory, TeamResolver};
use clock::parse_clock;
use legacy::{LegacyConverter, LegacyRow};
use live::LiveAction;
use serde_json::Value;
use tracing::{debug, warn};

/// Schema-independent intermediate row, before side and name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub sequence_index: u32,
    pub period: u8,
    pub clock: String,
    pub action: Action,
    pub person_id: Option<PlayerId>,
    pub team_id: Option<u64>,
    pub tricode: Option<String>,
    pub qualifiers: QualifierSet,
    pub description: String,
}

/// A game's raw event log, tagged by schema.
#[derive(Debug, Clone)]
pub enum RawPlayByPlay {
    Live(Vec<LiveAction>),
    Legacy(Vec<LegacyRow>),
}

impl RawPlayByPlay {
    /// Detect the schema of a provider payload and parse it.
    pub fn from_json(game_id: &str, value: &Value) -> Result<Self, FetchError> {
        if value.get("game").is_some() {
            live::actions_from_json(game_id, value).map(RawPlayByPlay::Live)
        } else if value.get("resultSets").is_some() {
            legacy::rows_from_json(game_id, value).map(RawPlayByPlay::Legacy)
        } else {
            Err(FetchError::SchemaMismatch {
                game_id: game_id.to_string(),
                message: "payload matches neither the live nor the legacy schema".to_string(),
            })
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawPlayByPlay::Live(actions) => actions.len(),
            RawPlayByPlay::Legacy(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters for rows the normalizer could not use as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub raw_rows: usize,
    pub dropped_rows: usize,
    pub unparseable_clocks: usize,
    pub unresolved_sides: usize,
    pub unknown_players: usize,
}

/// Per-game normalizer. Borrows the lookups built once for the game.
pub struct EventNormalizer<'a> {
    game_id: &'a str,
    teams: &'a TeamResolver,
    directory: &'a PlayerDirectory,
}

impl<'a> EventNormalizer<'a> {
    pub fn new(game_id: &'a str, teams: &'a TeamResolver, directory: &'a PlayerDirectory) -> Self {
        Self {
            game_id,
            teams,
            directory,
        }
    }

    /// Resolve a player id to a [`PlayerRef`], logging sentinel fallbacks.
    pub fn player_ref(&self, id: PlayerId, report: &mut NormalizeReport) -> PlayerRef {
        let (name, source) = self.directory.resolve(id, self.teams.box_name(id));
        if source == NameSource::Unknown {
            warn!(game_id = self.game_id, player_id = id.0, "Player id not found in any name table");
            report.unknown_players += 1;
        }
        PlayerRef::new(id, name)
    }

    /// Normalize a whole game. Output is ordered by `sequence_index`.
    pub fn normalize(&self, raw: &RawPlayByPlay) -> (Vec<GameEvent>, NormalizeReport) {
        let mut report = NormalizeReport {
            raw_rows: raw.len(),
            ..Default::default()
        };

        let mut events = Vec::with_capacity(raw.len());
        match raw {
            RawPlayByPlay::Live(actions) => {
                for action in actions {
                    match live::to_raw_event(action) {
                        Some(row) => events.extend(self.finish(row, &mut report)),
                        None => report.dropped_rows += 1,
                    }
                }
            }
            RawPlayByPlay::Legacy(rows) => {
                // Offensive rebound inference needs rows in source order.
                let mut ordered: Vec<&LegacyRow> = rows.iter().collect();
                ordered.sort_by_key(|r| r.event_num);

                let mut converter = LegacyConverter::new();
                for row in ordered {
                    let converted = converter.convert(row, self.teams, |id| {
                        self.player_ref(id, &mut report)
                    });
                    match converted {
                        Some(row) => events.extend(self.finish(row, &mut report)),
                        None => report.dropped_rows += 1,
                    }
                }
            }
        }

        events.sort_by_key(|e| e.sequence_index);
        debug!(
            game_id = self.game_id,
            raw = report.raw_rows,
            kept = events.len(),
            "Normalized play-by-play"
        );
        (events, report)
    }

    fn finish(&self, row: RawEvent, report: &mut NormalizeReport) -> Option<GameEvent> {
        let is_boundary = matches!(row.action, Action::PeriodBoundary(_));

        // Team rebounds, team turnovers, timeouts and the like.
        if row.person_id.is_none() && !is_boundary {
            report.dropped_rows += 1;
            return None;
        }

        let Some(clock_remaining) = parse_clock(&row.clock) else {
            warn!(
                game_id = self.game_id,
                sequence_index = row.sequence_index,
                clock = row.clock.as_str(),
                "Unparseable clock, dropping event"
            );
            report.unparseable_clocks += 1;
            report.dropped_rows += 1;
            return None;
        };

        let side = self
            .teams
            .resolve(row.team_id, row.tricode.as_deref(), row.person_id);
        if side.is_none() && !is_boundary {
            warn!(
                game_id = self.game_id,
                sequence_index = row.sequence_index,
                team_id = row.team_id,
                "Could not resolve team side, dropping event"
            );
            report.unresolved_sides += 1;
            report.dropped_rows += 1;
            return None;
        }

        let player = row.person_id.map(|id| self.player_ref(id, report));

        Some(GameEvent {
            sequence_index: row.sequence_index,
            period: row.period,
            clock_remaining,
            action: row.action,
            player,
            side: if is_boundary { None } else { side },
            qualifiers: row.qualifiers,
            description: row.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundaryKind, SubstitutionKind, TeamSide};
    use crate::roster::boxscore::fixtures::sample_box_score;
    use crate::roster::{NameCorrections, UNKNOWN_PLAYER};
    use serde_json::json;

    fn resolver() -> TeamResolver {
        TeamResolver::new(&sample_box_score(), &NameCorrections::new())
    }

    #[test]
    fn test_detects_schema() {
        let live = json!({"game": {"actions": []}});
        assert!(matches!(
            RawPlayByPlay::from_json("g", &live),
            Ok(RawPlayByPlay::Live(_))
        ));

        let legacy = json!({"resultSets": [{
            "name": "PlayByPlay",
            "headers": ["EVENTNUM", "EVENTMSGTYPE", "PERIOD", "PCTIMESTRING", "PLAYER1_ID", "PLAYER1_TEAM_ID"],
            "rowSet": []
        }]});
        assert!(matches!(
            RawPlayByPlay::from_json("g", &legacy),
            Ok(RawPlayByPlay::Legacy(_))
        ));

        assert!(matches!(
            RawPlayByPlay::from_json("g", &json!({"rows": []})),
            Err(FetchError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_live_normalization_orders_and_resolves() {
        let teams = resolver();
        let mut directory = PlayerDirectory::new();
        directory.insert_active(PlayerId(1), "Jalen Green");

        let raw = RawPlayByPlay::from_json(
            "g",
            &json!({"game": {"actions": [
                {"actionNumber": 3, "period": 1, "clock": "PT11M30.00S", "teamId": 1610612745,
                 "personId": 1, "actionType": "2pt", "shotResult": "Missed"},
                {"actionNumber": 1, "period": 1, "clock": "PT12M00.00S", "personId": 0,
                 "actionType": "period", "subType": "start"},
                {"actionNumber": 2, "period": 1, "clock": "PT11M50.00S", "teamTricode": "LAL",
                 "personId": 12, "actionType": "foul", "subType": "personal"},
                {"actionNumber": 4, "period": 1, "clock": "PT11M29.00S", "teamId": 1610612745,
                 "personId": 0, "actionType": "rebound", "subType": "team"},
                {"actionNumber": 5, "period": 1, "clock": "banana", "teamId": 1610612745,
                 "personId": 2, "actionType": "turnover"},
                {"actionNumber": 6, "period": 1, "clock": "PT11M00.00S", "teamId": 1610612745,
                 "personId": 777, "actionType": "foul"}
            ]}}),
        )
        .unwrap();

        let (events, report) = EventNormalizer::new("g", &teams, &directory).normalize(&raw);
        let order: Vec<u32> = events.iter().map(|e| e.sequence_index).collect();
        assert_eq!(order, vec![1, 2, 3, 6]);

        assert_eq!(events[0].action, Action::PeriodBoundary(BoundaryKind::Start));
        assert_eq!(events[0].side, None);
        assert_eq!(events[0].clock_remaining, 720.0);

        assert_eq!(events[1].side, Some(TeamSide::Away));
        assert_eq!(events[1].player.as_ref().unwrap().name, "LAL P12");
        assert_eq!(events[2].player.as_ref().unwrap().name, "Jalen Green");
        assert_eq!(events[3].player.as_ref().unwrap().name, UNKNOWN_PLAYER);

        assert_eq!(report.raw_rows, 6);
        assert_eq!(report.dropped_rows, 2);
        assert_eq!(report.unparseable_clocks, 1);
        assert_eq!(report.unknown_players, 1);
    }

    #[test]
    fn test_legacy_swap_resolves_incoming_name() {
        let teams = resolver();
        let directory = PlayerDirectory::new();
        let raw = RawPlayByPlay::from_json(
            "g",
            &json!({"resultSets": [{
                "name": "PlayByPlay",
                "headers": ["EVENTNUM", "EVENTMSGTYPE", "EVENTMSGACTIONTYPE", "PERIOD",
                            "PCTIMESTRING", "HOMEDESCRIPTION", "VISITORDESCRIPTION",
                            "NEUTRALDESCRIPTION", "PLAYER1_ID", "PLAYER1_TEAM_ID", "PLAYER2_ID"],
                "rowSet": [
                    [20, 8, 0, 2, "7:12", "SUB: P6 FOR P5", null, null, 5, 1610612745, 6],
                    [10, 12, 0, 2, "12:00", null, null, "Start of 2nd Period", null, null, null]
                ]
            }]}),
        )
        .unwrap();

        let (events, _) = EventNormalizer::new("g", &teams, &directory).normalize(&raw);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_period_start());
        assert_eq!(events[1].clock_remaining, 432.0);
        assert_eq!(
            events[1].action,
            Action::Substitution(SubstitutionKind::Swap {
                incoming: PlayerRef::new(PlayerId(6), "HOU P6")
            })
        );
        assert_eq!(events[1].player.as_ref().unwrap().name, "HOU P5");
    }
}
