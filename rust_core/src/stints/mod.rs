//! Stint Aggregator: counting stats keyed by (side, period, lineup).
//!
//! Every event observed while both sides have a complete five is charged to
//! one stint per side: the acting side's stint counts it as its own, the
//! other side's stint counts it as the opponent's. Elapsed time goes to the
//! fives on court before the event, so a substitution closes out the
//! outgoing lineup's time. Stints are created on first sight, so a key with
//! no events is never emitted.

pub mod counters;

pub use counters::SideCounters;

use crate::models::{GameEvent, Lineup, TeamGameRecord, TeamSide};
use crate::possessions::{estimate_possessions, unscaled_pace};
use crate::roster::{BoxScore, HeightIndex};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StintKey {
    pub side: TeamSide,
    pub period: u8,
    pub lineup: Lineup,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stint {
    pub own: SideCounters,
    pub opp: SideCounters,
    pub minutes_played: f64,
    pub events: u32,
    /// Opponent five at the stint's most recent event.
    pub last_opponent: Option<Lineup>,
}

#[derive(Debug, Default)]
pub struct StintAggregator {
    stints: BTreeMap<StintKey, Stint>,
}

impl StintAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge one complete-lineup event and its elapsed minutes to both
    /// sides' current stints.
    pub fn record(
        &mut self,
        event: &GameEvent,
        elapsed_minutes: f64,
        home: &Lineup,
        away: &Lineup,
    ) {
        // A substitution carries nothing but the time that ran before it.
        if event.is_substitution() && elapsed_minutes <= 0.0 {
            return;
        }
        for side in TeamSide::BOTH {
            let (lineup, opponent) = match side {
                TeamSide::Home => (home, away),
                TeamSide::Away => (away, home),
            };
            let stint = self
                .stints
                .entry(StintKey {
                    side,
                    period: event.period,
                    lineup: lineup.clone(),
                })
                .or_default();

            stint.minutes_played += elapsed_minutes;
            stint.events += 1;
            if stint.last_opponent.as_ref() != Some(opponent) {
                stint.last_opponent = Some(opponent.clone());
            }

            match event.side {
                Some(acting) if acting == side => stint.own.record(event),
                Some(_) => stint.opp.record(event),
                None => {}
            }
        }
    }

    pub fn get(&self, key: &StintKey) -> Option<&Stint> {
        self.stints.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StintKey, &Stint)> {
        self.stints.iter()
    }

    pub fn len(&self) -> usize {
        self.stints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stints.is_empty()
    }

    /// Snapshot every stint into an output row, ordered by side, period and
    /// lineup.
    pub fn into_records(
        self,
        game_id: &str,
        box_score: &BoxScore,
        heights: &HeightIndex,
    ) -> Vec<TeamGameRecord> {
        self.stints
            .into_iter()
            .filter(|(_, stint)| stint.events > 0)
            .map(|(key, stint)| {
                let own = &stint.own;
                let opp = &stint.opp;
                let team = box_score.tricode(key.side);
                let opponent = box_score.tricode(key.side.opponent());
                TeamGameRecord {
                    game_id: game_id.to_string(),
                    team: team.to_string(),
                    opponent: opponent.to_string(),
                    team_avg_height: heights.lineup_average(game_id, team, &key.lineup),
                    opp_avg_height: stint
                        .last_opponent
                        .as_ref()
                        .and_then(|l| heights.lineup_average(game_id, opponent, l)),
                    minutes_played: stint.minutes_played,
                    period: key.period,
                    points: own.points(),
                    opp_points: opp.points(),
                    rebounds: own.rebounds,
                    opp_rebounds: opp.rebounds,
                    assists: own.assists,
                    opp_assists: opp.assists,
                    turnovers: own.turnovers,
                    opp_turnovers: opp.turnovers,
                    fouls_committed: own.fouls,
                    fouls_drawn: opp.fouls,
                    possessions: estimate_possessions(own),
                    opp_possessions: estimate_possessions(opp),
                    fastbreak: own.fastbreak,
                    from_turnover: own.from_turnover,
                    second_chance: own.second_chance,
                    points_in_paint: own.points_in_paint,
                    opp_from_turnover: opp.from_turnover,
                    opp_fastbreak: opp.fastbreak,
                    opp_second_chance: opp.second_chance,
                    opp_points_in_paint: opp.points_in_paint,
                    unscaled_pace: unscaled_pace(own, opp),
                    game_number: None,
                    lineup: key.lineup,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Action, PlayerId, PlayerRef, QualifierSet, ShotResult, ShotValue, SubstitutionKind,
    };
    use crate::roster::boxscore::fixtures::sample_box_score;

    fn home() -> Lineup {
        Lineup::from_names(["H1", "H2", "H3", "H4", "H5"])
    }

    fn away() -> Lineup {
        Lineup::from_names(["A1", "A2", "A3", "A4", "A5"])
    }

    fn event(side: TeamSide, action: Action) -> GameEvent {
        GameEvent {
            sequence_index: 1,
            period: 2,
            clock_remaining: 500.0,
            action,
            player: Some(PlayerRef::new(PlayerId(1), "H1")),
            side: Some(side),
            qualifiers: QualifierSet::empty(),
            description: "H1 26' 3PT Jump Shot (3 PTS) (H2 1 AST)".to_string(),
        }
    }

    fn key(side: TeamSide, lineup: Lineup) -> StintKey {
        StintKey {
            side,
            period: 2,
            lineup,
        }
    }

    #[test]
    fn test_made_three_touches_only_acting_side_counters() {
        let mut agg = StintAggregator::new();
        let three = Action::Shot {
            value: ShotValue::Three,
            result: ShotResult::Made,
            assisted: true,
        };
        agg.record(&event(TeamSide::Home, three), 0.25, &home(), &away());

        let h = agg.get(&key(TeamSide::Home, home())).unwrap();
        assert_eq!(h.own.made_3pt, 1);
        assert_eq!(h.own.assists, 1);
        assert_eq!(h.opp, SideCounters::default());

        let a = agg.get(&key(TeamSide::Away, away())).unwrap();
        assert_eq!(a.own, SideCounters::default());
        assert_eq!(a.opp.made_3pt, 1);
        assert_eq!(a.minutes_played, 0.25);
    }

    #[test]
    fn test_turnover_and_foul_mirror_to_opponent() {
        let mut agg = StintAggregator::new();
        agg.record(&event(TeamSide::Away, Action::Turnover), 0.0, &home(), &away());
        agg.record(&event(TeamSide::Away, Action::Foul), 0.0, &home(), &away());

        let records = agg.into_records("g", &sample_box_score(), &HeightIndex::new());
        let home_row = records.iter().find(|r| r.team == "HOU").unwrap();
        assert_eq!(home_row.opponent, "LAL");
        assert_eq!(home_row.opp_turnovers, 1);
        assert_eq!(home_row.fouls_drawn, 1);
        assert_eq!(home_row.fouls_committed, 0);

        let away_row = records.iter().find(|r| r.team == "LAL").unwrap();
        assert_eq!(away_row.turnovers, 1);
        assert_eq!(away_row.fouls_committed, 1);
        assert_eq!(away_row.team_avg_height, None);
    }

    #[test]
    fn test_minutes_split_by_lineup_within_period() {
        let mut agg = StintAggregator::new();
        let second = Lineup::from_names(["H1", "H2", "H3", "H4", "H6"]);
        agg.record(&event(TeamSide::Home, Action::Other), 1.0, &home(), &away());
        agg.record(&event(TeamSide::Home, Action::Other), 0.5, &second, &away());
        agg.record(&event(TeamSide::Home, Action::Other), 0.5, &home(), &away());

        assert_eq!(agg.len(), 3);
        assert_eq!(agg.get(&key(TeamSide::Home, home())).unwrap().minutes_played, 1.5);
        assert_eq!(agg.get(&key(TeamSide::Home, second)).unwrap().minutes_played, 0.5);
        assert_eq!(agg.get(&key(TeamSide::Away, away())).unwrap().minutes_played, 2.0);

        let records = agg.into_records("g", &sample_box_score(), &HeightIndex::new());
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.period == 2 && r.game_number.is_none()));
    }

    #[test]
    fn test_substitution_only_carries_time_before_it() {
        let mut agg = StintAggregator::new();
        let swap = Action::Substitution(SubstitutionKind::Swap {
            incoming: PlayerRef::new(PlayerId(6), "H6"),
        });
        agg.record(&event(TeamSide::Home, swap.clone()), 0.0, &home(), &away());
        assert!(agg.is_empty());

        agg.record(&event(TeamSide::Home, swap), 0.5, &home(), &away());
        let h = agg.get(&key(TeamSide::Home, home())).unwrap();
        assert_eq!(h.minutes_played, 0.5);
        assert_eq!(h.own, SideCounters::default());
    }
}
