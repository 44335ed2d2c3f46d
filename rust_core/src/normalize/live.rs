//! Adapter for the string-typed live play-by-play schema.
//!
//! Payload shape: `{"game": {"actions": [ {...}, ... ]}}`. Substitutions
//! arrive as two discrete `in`/`out` actions.

use super::qualifiers::{mentions_assist, mentions_miss, parse_qualifiers};
use super::RawEvent;
use crate::error::FetchError;
use crate::models::{
    Action, BoundaryKind, PlayerId, ReboundKind, ShotResult, ShotValue, SubstitutionKind,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveAction {
    pub action_number: u32,
    #[serde(default)]
    pub order_number: Option<u32>,
    pub period: u8,
    #[serde(default)]
    pub clock: String,
    #[serde(default)]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub team_tricode: Option<String>,
    #[serde(default)]
    pub person_id: Option<u64>,
    pub action_type: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub shot_result: Option<String>,
    #[serde(default)]
    pub qualifiers: Value,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assist_person_id: Option<u64>,
}

/// Extract the action list from a live payload.
pub fn actions_from_json(game_id: &str, value: &Value) -> Result<Vec<LiveAction>, FetchError> {
    let actions = value
        .get("game")
        .and_then(|g| g.get("actions"))
        .ok_or_else(|| FetchError::SchemaMismatch {
            game_id: game_id.to_string(),
            message: "live payload has no game.actions".to_string(),
        })?;
    serde_json::from_value(actions.clone()).map_err(|e| FetchError::SchemaMismatch {
        game_id: game_id.to_string(),
        message: format!("live action: {e}"),
    })
}

fn shot_result(action: &LiveAction, description: &str) -> Option<ShotResult> {
    let reported = action
        .shot_result
        .as_deref()
        .map(|r| r.trim().to_ascii_lowercase());
    match reported.as_deref() {
        Some("made") => Some(ShotResult::Made),
        Some("missed") => Some(ShotResult::Missed),
        // Free throws occasionally omit shotResult.
        _ if action.action_type.eq_ignore_ascii_case("freethrow") => {
            if mentions_miss(description) {
                Some(ShotResult::Missed)
            } else {
                Some(ShotResult::Made)
            }
        }
        _ => None,
    }
}

/// Convert one live action. `None` means the row is dropped.
pub fn to_raw_event(action: &LiveAction) -> Option<RawEvent> {
    let sub_type = action
        .sub_type
        .as_deref()
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if sub_type == "technical" {
        return None;
    }

    let description = action.description.clone().unwrap_or_default();
    let kind = action.action_type.trim().to_ascii_lowercase();

    let parsed = match kind.as_str() {
        "2pt" | "3pt" => {
            let value = if kind == "3pt" {
                ShotValue::Three
            } else {
                ShotValue::Two
            };
            Action::Shot {
                value,
                result: shot_result(action, &description)?,
                assisted: action.assist_person_id.is_some_and(|id| id != 0)
                    || mentions_assist(&description),
            }
        }
        "freethrow" => Action::Shot {
            value: ShotValue::FreeThrow,
            result: shot_result(action, &description)?,
            assisted: false,
        },
        "rebound" => Action::Rebound(if sub_type == "offensive" {
            ReboundKind::Offensive
        } else {
            ReboundKind::Defensive
        }),
        "turnover" => Action::Turnover,
        "foul" => Action::Foul,
        "substitution" => match sub_type.as_str() {
            "in" => Action::Substitution(SubstitutionKind::In),
            "out" => Action::Substitution(SubstitutionKind::Out),
            _ => return None,
        },
        "period" => match sub_type.as_str() {
            "start" => Action::PeriodBoundary(BoundaryKind::Start),
            "end" => Action::PeriodBoundary(BoundaryKind::End),
            _ => Action::Other,
        },
        _ => Action::Other,
    };

    Some(RawEvent {
        sequence_index: action.order_number.unwrap_or(action.action_number),
        period: action.period,
        clock: action.clock.clone(),
        action: parsed,
        person_id: action.person_id.filter(|id| *id != 0).map(PlayerId),
        team_id: action.team_id.filter(|id| *id != 0),
        tricode: action.team_tricode.clone().filter(|t| !t.trim().is_empty()),
        qualifiers: parse_qualifiers(&action.qualifiers),
        description,
    })
}
