use super::lineup::Lineup;
use serde::{Deserialize, Serialize};

/// One output row: a finished stint for (game, team, period, lineup).
///
/// Field order is the column order of the per-team tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameRecord {
    pub game_id: String,
    pub team: String,
    pub opponent: String,
    pub team_avg_height: Option<f64>,
    pub opp_avg_height: Option<f64>,
    pub lineup: Lineup,
    pub minutes_played: f64,
    pub period: u8,
    pub points: u32,
    pub opp_points: u32,
    pub rebounds: u32,
    pub opp_rebounds: u32,
    pub assists: u32,
    pub opp_assists: u32,
    pub turnovers: u32,
    pub opp_turnovers: u32,
    pub fouls_committed: u32,
    pub fouls_drawn: u32,
    pub possessions: f64,
    pub opp_possessions: f64,
    pub fastbreak: u32,
    pub from_turnover: u32,
    pub second_chance: u32,
    pub points_in_paint: u32,
    pub opp_from_turnover: u32,
    pub opp_fastbreak: u32,
    pub opp_second_chance: u32,
    pub opp_points_in_paint: u32,
    /// Possessions for both sides; scaled by minutes only after aggregation.
    pub unscaled_pace: f64,
    /// Dense rank of `game_id` within the team's table; filled by the store.
    #[serde(default)]
    pub game_number: Option<u32>,
}
