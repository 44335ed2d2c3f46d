//! Adapter for the numeric-coded legacy play-by-play schema.
//!
//! Payload shape: `{"resultSets": [{"name": "PlayByPlay", "headers": [...],
//! "rowSet": [[...], ...]}]}`. Substitutions arrive as one row carrying the
//! outgoing (`PLAYER1`) and incoming (`PLAYER2`) player.

use super::qualifiers::{mentions_assist, mentions_miss, mentions_technical, mentions_three};
use super::RawEvent;
use crate::error::FetchError;
use crate::models::{
    Action, BoundaryKind, PlayerId, PlayerRef, QualifierSet, ReboundKind, ShotResult, ShotValue,
    SubstitutionKind, TeamSide,
};
use crate::roster::TeamResolver;
use serde_json::Value;

const MSG_MADE_FG: u32 = 1;
const MSG_MISSED_FG: u32 = 2;
const MSG_FREE_THROW: u32 = 3;
const MSG_REBOUND: u32 = 4;
const MSG_TURNOVER: u32 = 5;
const MSG_FOUL: u32 = 6;
const MSG_SUBSTITUTION: u32 = 8;
const MSG_PERIOD_START: u32 = 12;
const MSG_PERIOD_END: u32 = 13;

/// Technical/non-personal foul action types.
const TECHNICAL_FOUL_TYPES: [u32; 6] = [11, 13, 16, 18, 19, 25];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyRow {
    pub event_num: u32,
    pub msg_type: u32,
    pub msg_action_type: Option<u32>,
    pub period: u8,
    pub clock: String,
    pub player1_id: Option<u64>,
    pub player1_team_id: Option<u64>,
    pub player2_id: Option<u64>,
    pub home_description: Option<String>,
    pub visitor_description: Option<String>,
    pub neutral_description: Option<String>,
}

impl LegacyRow {
    /// First non-empty description, starting with the acting side's column.
    ///
    /// A block or steal puts the defender's text in the other column, so
    /// the actor's own line must win for shot-value and miss detection.
    pub fn description_for(&self, side: Option<TeamSide>) -> String {
        let columns = match side {
            Some(TeamSide::Away) => [
                &self.visitor_description,
                &self.home_description,
                &self.neutral_description,
            ],
            Some(TeamSide::Home) | None => [
                &self.home_description,
                &self.visitor_description,
                &self.neutral_description,
            ],
        };
        columns
            .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract rows from the `PlayByPlay` result set.
pub fn rows_from_json(game_id: &str, value: &Value) -> Result<Vec<LegacyRow>, FetchError> {
    let mismatch = |message: String| FetchError::SchemaMismatch {
        game_id: game_id.to_string(),
        message,
    };

    let sets = value
        .get("resultSets")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch("legacy payload has no resultSets".to_string()))?;
    let set = sets
        .iter()
        .find(|s| s.get("name").and_then(Value::as_str) == Some("PlayByPlay"))
        .or_else(|| sets.first())
        .ok_or_else(|| mismatch("legacy payload has an empty resultSets".to_string()))?;

    let headers: Vec<&str> = set
        .get("headers")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch("result set has no headers".to_string()))?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let required = |name: &str| column(name).ok_or_else(|| mismatch(format!("missing column {name}")));

    let event_num = required("EVENTNUM")?;
    let msg_type = required("EVENTMSGTYPE")?;
    let period = required("PERIOD")?;
    let clock = required("PCTIMESTRING")?;
    let player1_id = required("PLAYER1_ID")?;
    let player1_team_id = required("PLAYER1_TEAM_ID")?;
    let msg_action_type = column("EVENTMSGACTIONTYPE");
    let player2_id = column("PLAYER2_ID");
    let home_desc = column("HOMEDESCRIPTION");
    let visitor_desc = column("VISITORDESCRIPTION");
    let neutral_desc = column("NEUTRALDESCRIPTION");

    let rows = set
        .get("rowSet")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch("result set has no rowSet".to_string()))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row
                .as_array()
                .filter(|cells| cells.len() == headers.len())
                .ok_or_else(|| mismatch(format!("row {i} does not match header width")))?;
            let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).unwrap_or(&Value::Null);

            Ok(LegacyRow {
                event_num: as_u64(&cells[event_num])
                    .ok_or_else(|| mismatch(format!("row {i} has no EVENTNUM")))?
                    as u32,
                msg_type: as_u64(&cells[msg_type])
                    .ok_or_else(|| mismatch(format!("row {i} has no EVENTMSGTYPE")))?
                    as u32,
                msg_action_type: as_u64(cell(msg_action_type)).map(|v| v as u32),
                period: as_u64(&cells[period])
                    .ok_or_else(|| mismatch(format!("row {i} has no PERIOD")))?
                    as u8,
                clock: as_string(&cells[clock]).unwrap_or_default(),
                player1_id: as_u64(&cells[player1_id]).filter(|id| *id != 0),
                player1_team_id: as_u64(&cells[player1_team_id]).filter(|id| *id != 0),
                player2_id: as_u64(cell(player2_id)).filter(|id| *id != 0),
                home_description: as_string(cell(home_desc)),
                visitor_description: as_string(cell(visitor_desc)),
                neutral_description: as_string(cell(neutral_desc)),
            })
        })
        .collect()
}

/// Stateful converter: offensive rebounds are inferred from the side of the
/// most recent missed shot, so rows must be fed in source order.
#[derive(Debug, Default)]
pub struct LegacyConverter {
    last_miss_side: Option<TeamSide>,
}

impl LegacyConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert one row. `None` means the row is dropped.
    pub fn convert(
        &mut self,
        row: &LegacyRow,
        teams: &TeamResolver,
        resolve_incoming: impl FnOnce(PlayerId) -> PlayerRef,
    ) -> Option<RawEvent> {
        let person = row
            .player1_id
            // Team rebounds/turnovers carry the team id in PLAYER1_ID.
            .filter(|id| !teams.is_team_id(*id))
            .map(PlayerId);
        let side = teams.resolve(row.player1_team_id, None, person);
        let description = row.description_for(side);

        let action = match row.msg_type {
            MSG_MADE_FG | MSG_MISSED_FG => {
                let result = if row.msg_type == MSG_MADE_FG {
                    ShotResult::Made
                } else {
                    self.last_miss_side = side;
                    ShotResult::Missed
                };
                Action::Shot {
                    value: if mentions_three(&description) {
                        ShotValue::Three
                    } else {
                        ShotValue::Two
                    },
                    result,
                    assisted: row.msg_type == MSG_MADE_FG && mentions_assist(&description),
                }
            }
            MSG_FREE_THROW => {
                let result = if mentions_miss(&description) {
                    self.last_miss_side = side;
                    ShotResult::Missed
                } else {
                    ShotResult::Made
                };
                Action::Shot {
                    value: ShotValue::FreeThrow,
                    result,
                    assisted: false,
                }
            }
            MSG_REBOUND => {
                let offensive = side.is_some() && side == self.last_miss_side;
                self.last_miss_side = None;
                Action::Rebound(if offensive {
                    ReboundKind::Offensive
                } else {
                    ReboundKind::Defensive
                })
            }
            MSG_TURNOVER => Action::Turnover,
            MSG_FOUL => {
                let technical = row
                    .msg_action_type
                    .is_some_and(|t| TECHNICAL_FOUL_TYPES.contains(&t))
                    || mentions_technical(&description);
                if technical {
                    return None;
                }
                Action::Foul
            }
            MSG_SUBSTITUTION => {
                let incoming = resolve_incoming(PlayerId(row.player2_id?));
                Action::Substitution(SubstitutionKind::Swap { incoming })
            }
            MSG_PERIOD_START => Action::PeriodBoundary(BoundaryKind::Start),
            MSG_PERIOD_END => Action::PeriodBoundary(BoundaryKind::End),
            _ => Action::Other,
        };

        Some(RawEvent {
            sequence_index: row.event_num,
            period: row.period,
            clock: row.clock.clone(),
            action,
            person_id: person,
            team_id: row.player1_team_id,
            tricode: None,
            qualifiers: QualifierSet::empty(),
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::boxscore::fixtures::sample_box_score;
    use crate::roster::NameCorrections;
    use serde_json::json;

    const HEADERS: [&str; 11] = [
        "GAME_ID",
        "EVENTNUM",
        "EVENTMSGTYPE",
        "EVENTMSGACTIONTYPE",
        "PERIOD",
        "PCTIMESTRING",
        "HOMEDESCRIPTION",
        "VISITORDESCRIPTION",
        "PLAYER1_ID",
        "PLAYER1_TEAM_ID",
        "PLAYER2_ID",
    ];

    fn payload(rows: Vec<Value>) -> Value {
        json!({
            "resultSets": [{ "name": "PlayByPlay", "headers": HEADERS, "rowSet": rows }]
        })
    }

    fn resolver() -> TeamResolver {
        TeamResolver::new(&sample_box_score(), &NameCorrections::new())
    }

    fn no_name(id: PlayerId) -> PlayerRef {
        PlayerRef::new(id, format!("#{id}"))
    }

    #[test]
    fn test_rows_from_json() {
        let rows = rows_from_json(
            "g",
            &payload(vec![json!([
                "g", 7, 1, 1, 1, "11:02", "Green 3PT Jump Shot (Sengun 1 AST)", null, 1, 1610612745, 2
            ])]),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event_num, 7);
        assert_eq!(rows[0].clock, "11:02");
        assert_eq!(rows[0].player2_id, Some(2));
        assert_eq!(
            rows[0].description_for(Some(TeamSide::Home)),
            "Green 3PT Jump Shot (Sengun 1 AST)"
        );
    }

    #[test]
    fn test_missing_required_column_is_mismatch() {
        let value = json!({
            "resultSets": [{ "name": "PlayByPlay", "headers": ["EVENTNUM"], "rowSet": [] }]
        });
        let err = rows_from_json("g", &value).unwrap_err();
        assert!(err.to_string().contains("EVENTMSGTYPE"));
    }

    #[test]
    fn test_ragged_row_is_mismatch() {
        let err = rows_from_json("g", &payload(vec![json!(["g", 1])])).unwrap_err();
        assert!(matches!(err, FetchError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_made_three_assisted() {
        let row = LegacyRow {
            event_num: 3,
            msg_type: MSG_MADE_FG,
            period: 1,
            clock: "10:00".into(),
            player1_id: Some(1),
            player1_team_id: Some(1610612745),
            home_description: Some("Green 26' 3PT Jump Shot (3 PTS) (Sengun 1 AST)".into()),
            ..Default::default()
        };
        let raw = LegacyConverter::new()
            .convert(&row, &resolver(), no_name)
            .unwrap();
        assert_eq!(
            raw.action,
            Action::Shot {
                value: ShotValue::Three,
                result: ShotResult::Made,
                assisted: true
            }
        );
    }

    #[test]
    fn test_blocked_away_three_reads_visitor_description() {
        let row = LegacyRow {
            event_num: 5,
            msg_type: MSG_MISSED_FG,
            period: 1,
            clock: "9:12".into(),
            player1_id: Some(11),
            player1_team_id: Some(1610612747),
            home_description: Some("Sengun BLOCK (1 BLK)".into()),
            visitor_description: Some("MISS James 25' 3PT Jump Shot".into()),
            ..Default::default()
        };
        let raw = LegacyConverter::new()
            .convert(&row, &resolver(), no_name)
            .unwrap();
        assert_eq!(raw.description, "MISS James 25' 3PT Jump Shot");
        assert_eq!(
            raw.action,
            Action::Shot {
                value: ShotValue::Three,
                result: ShotResult::Missed,
                assisted: false
            }
        );
    }

    #[test]
    fn test_missed_away_free_throw_beside_home_text() {
        let row = LegacyRow {
            event_num: 6,
            msg_type: MSG_FREE_THROW,
            period: 1,
            player1_id: Some(11),
            player1_team_id: Some(1610612747),
            home_description: Some("Green Foul (P1.T1)".into()),
            visitor_description: Some("MISS James Free Throw 1 of 2".into()),
            ..Default::default()
        };
        let raw = LegacyConverter::new()
            .convert(&row, &resolver(), no_name)
            .unwrap();
        assert_eq!(
            raw.action,
            Action::Shot {
                value: ShotValue::FreeThrow,
                result: ShotResult::Missed,
                assisted: false
            }
        );
    }

    #[test]
    fn test_offensive_rebound_inferred_from_last_miss() {
        let teams = resolver();
        let mut converter = LegacyConverter::new();
        let miss = LegacyRow {
            event_num: 1,
            msg_type: MSG_MISSED_FG,
            period: 1,
            player1_id: Some(1),
            player1_team_id: Some(1610612745),
            home_description: Some("MISS Green 13' Jump Shot".into()),
            ..Default::default()
        };
        let home_board = LegacyRow {
            event_num: 2,
            msg_type: MSG_REBOUND,
            period: 1,
            player1_id: Some(2),
            player1_team_id: Some(1610612745),
            ..Default::default()
        };
        converter.convert(&miss, &teams, no_name);
        let raw = converter.convert(&home_board, &teams, no_name).unwrap();
        assert_eq!(raw.action, Action::Rebound(ReboundKind::Offensive));

        // Nothing missed since: the next board is defensive.
        let raw = converter.convert(&home_board, &teams, no_name).unwrap();
        assert_eq!(raw.action, Action::Rebound(ReboundKind::Defensive));
    }

    #[test]
    fn test_substitution_swap_and_technical_drop() {
        let teams = resolver();
        let mut converter = LegacyConverter::new();
        let sub = LegacyRow {
            event_num: 9,
            msg_type: MSG_SUBSTITUTION,
            period: 2,
            player1_id: Some(5),
            player1_team_id: Some(1610612745),
            player2_id: Some(6),
            home_description: Some("SUB: P6 FOR P5".into()),
            ..Default::default()
        };
        let raw = converter.convert(&sub, &teams, no_name).unwrap();
        assert_eq!(raw.person_id, Some(PlayerId(5)));
        assert_eq!(
            raw.action,
            Action::Substitution(SubstitutionKind::Swap {
                incoming: PlayerRef::new(PlayerId(6), "#6")
            })
        );

        let technical = LegacyRow {
            event_num: 10,
            msg_type: MSG_FOUL,
            msg_action_type: Some(11),
            period: 2,
            player1_id: Some(5),
            player1_team_id: Some(1610612745),
            ..Default::default()
        };
        assert!(converter.convert(&technical, &teams, no_name).is_none());
    }

    #[test]
    fn test_team_rebound_has_no_person() {
        let row = LegacyRow {
            event_num: 4,
            msg_type: MSG_REBOUND,
            period: 1,
            player1_id: Some(1610612747),
            ..Default::default()
        };
        let raw = LegacyConverter::new()
            .convert(&row, &resolver(), no_name)
            .unwrap();
        assert_eq!(raw.person_id, None);
    }
}
