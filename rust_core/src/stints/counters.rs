//! Counting stats for one side of a stint.

use crate::models::{Action, GameEvent, Qualifier, ReboundKind, ShotResult, ShotValue};
use serde::{Deserialize, Serialize};

/// Box-score style counters accumulated for one side.
///
/// Shot-origin counters (`fastbreak`, `from_turnover`, `second_chance`,
/// `points_in_paint`) hold points, not makes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideCounters {
    pub made_2pt: u32,
    pub missed_2pt: u32,
    pub made_3pt: u32,
    pub missed_3pt: u32,
    pub made_ft: u32,
    pub missed_ft: u32,
    pub rebounds: u32,
    pub off_rebounds: u32,
    pub assists: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub fastbreak: u32,
    pub from_turnover: u32,
    pub second_chance: u32,
    pub points_in_paint: u32,
}

impl SideCounters {
    /// Count an event this side performed.
    pub fn record(&mut self, event: &GameEvent) {
        match event.action {
            Action::Shot {
                value,
                result,
                assisted,
            } => {
                let made = result == ShotResult::Made;
                match value {
                    ShotValue::Two if made => self.made_2pt += 1,
                    ShotValue::Two => self.missed_2pt += 1,
                    ShotValue::Three if made => self.made_3pt += 1,
                    ShotValue::Three => self.missed_3pt += 1,
                    ShotValue::FreeThrow if made => self.made_ft += 1,
                    ShotValue::FreeThrow => self.missed_ft += 1,
                }

                if value == ShotValue::FreeThrow {
                    return;
                }
                if assisted {
                    self.assists += 1;
                }
                if made {
                    let points = value.points();
                    for qualifier in event.qualifiers.iter() {
                        match qualifier {
                            Qualifier::Fastbreak => self.fastbreak += points,
                            Qualifier::FromTurnover => self.from_turnover += points,
                            Qualifier::SecondChance => self.second_chance += points,
                            Qualifier::PointsInPaint => self.points_in_paint += points,
                        }
                    }
                }
            }
            Action::Rebound(kind) => {
                self.rebounds += 1;
                if kind == ReboundKind::Offensive {
                    self.off_rebounds += 1;
                }
            }
            Action::Turnover => self.turnovers += 1,
            Action::Foul => self.fouls += 1,
            Action::Substitution(_) | Action::PeriodBoundary(_) | Action::Other => {}
        }
    }

    pub fn points(&self) -> u32 {
        2 * self.made_2pt + 3 * self.made_3pt + self.made_ft
    }

    pub fn field_goal_attempts(&self) -> u32 {
        self.made_2pt + self.missed_2pt + self.made_3pt + self.missed_3pt
    }

    pub fn free_throw_attempts(&self) -> u32 {
        self.made_ft + self.missed_ft
    }
}
