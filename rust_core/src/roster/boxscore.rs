//! Per-game box score: rosters, starting designations and side resolution.

use super::corrections::NameCorrections;
use crate::error::FetchError;
use crate::models::{PlayerId, PlayerRef, TeamSide, LINEUP_SIZE};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxPlayer {
    pub person_id: u64,
    pub first_name: String,
    pub family_name: String,
    /// Set only for starters.
    #[serde(default)]
    pub position: Option<String>,
}

impl BoxPlayer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.family_name.trim())
            .trim()
            .to_string()
    }

    pub fn has_position(&self) -> bool {
        self.position
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamBox {
    pub team_id: u64,
    pub team_tricode: String,
    /// Box-score listing order.
    #[serde(default)]
    pub players: Vec<BoxPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxScore {
    pub game_id: String,
    pub home_team: TeamBox,
    pub away_team: TeamBox,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxScoreEnvelope {
    box_score_traditional: BoxScore,
}

impl BoxScore {
    /// Parse a provider payload, either bare or wrapped in
    /// `{"boxScoreTraditional": {...}}`.
    pub fn from_json(game_id: &str, value: serde_json::Value) -> Result<Self, FetchError> {
        let parsed = if value.get("boxScoreTraditional").is_some() {
            serde_json::from_value::<BoxScoreEnvelope>(value).map(|e| e.box_score_traditional)
        } else {
            serde_json::from_value::<BoxScore>(value)
        };
        parsed.map_err(|e| FetchError::SchemaMismatch {
            game_id: game_id.to_string(),
            message: format!("box score: {e}"),
        })
    }

    pub fn team(&self, side: TeamSide) -> &TeamBox {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    pub fn tricode(&self, side: TeamSide) -> &str {
        &self.team(side).team_tricode
    }

    /// Both sides have distinct, non-empty team codes.
    pub fn teams_resolved(&self) -> bool {
        let home = self.home_team.team_tricode.trim();
        let away = self.away_team.team_tricode.trim();
        !home.is_empty() && !away.is_empty() && home != away
    }

    /// Starting five: the first five listed players with a position.
    pub fn starting_five(&self, side: TeamSide, corrections: &NameCorrections) -> Vec<PlayerRef> {
        self.team(side)
            .players
            .iter()
            .filter(|p| p.has_position())
            .take(LINEUP_SIZE)
            .map(|p| PlayerRef::new(PlayerId(p.person_id), corrections.apply(&p.full_name())))
            .collect()
    }

    /// Every listed player for a side, names corrected.
    pub fn roster(&self, side: TeamSide, corrections: &NameCorrections) -> Vec<PlayerRef> {
        self.team(side)
            .players
            .iter()
            .map(|p| PlayerRef::new(PlayerId(p.person_id), corrections.apply(&p.full_name())))
            .collect()
    }
}

/// Team and player → side lookup, built once per game from the box score.
#[derive(Debug, Clone, Default)]
pub struct TeamResolver {
    by_team_id: FxHashMap<u64, TeamSide>,
    by_tricode: FxHashMap<String, TeamSide>,
    by_player: FxHashMap<PlayerId, TeamSide>,
    box_names: FxHashMap<PlayerId, String>,
}

impl TeamResolver {
    pub fn new(box_score: &BoxScore, corrections: &NameCorrections) -> Self {
        let mut resolver = Self::default();
        for side in TeamSide::BOTH {
            let team = box_score.team(side);
            resolver.by_team_id.insert(team.team_id, side);
            resolver
                .by_tricode
                .insert(team.team_tricode.trim().to_uppercase(), side);
            for player in &team.players {
                let id = PlayerId(player.person_id);
                resolver.by_player.insert(id, side);
                resolver
                    .box_names
                    .insert(id, corrections.apply(&player.full_name()));
            }
        }
        resolver
    }

    /// Resolve a side from whatever the raw row carries, most specific first.
    pub fn resolve(
        &self,
        team_id: Option<u64>,
        tricode: Option<&str>,
        player: Option<PlayerId>,
    ) -> Option<TeamSide> {
        team_id
            .and_then(|id| self.by_team_id.get(&id).copied())
            .or_else(|| {
                tricode.and_then(|code| self.by_tricode.get(&code.trim().to_uppercase()).copied())
            })
            .or_else(|| player.and_then(|p| self.by_player.get(&p).copied()))
    }

    pub fn is_team_id(&self, id: u64) -> bool {
        self.by_team_id.contains_key(&id)
    }

    /// Box-score spelling of a player's name, if listed.
    pub fn box_name(&self, id: PlayerId) -> Option<&str> {
        self.box_names.get(&id).map(|s| s.as_str())
    }
}
