//! Possession Estimator.

use crate::stints::SideCounters;

/// Weight of a free-throw attempt in the possession estimate.
pub const FREE_THROW_WEIGHT: f64 = 0.44;

/// `FGA - OffReb + TOV + 0.44 * FTA`.
pub fn estimate_possessions(counters: &SideCounters) -> f64 {
    counters.field_goal_attempts() as f64 - counters.off_rebounds as f64
        + counters.turnovers as f64
        + FREE_THROW_WEIGHT * counters.free_throw_attempts() as f64
}

/// Both sides' possessions over the same stint window.
pub fn unscaled_pace(own: &SideCounters, opp: &SideCounters) -> f64 {
    estimate_possessions(own) + estimate_possessions(opp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters() -> SideCounters {
        SideCounters {
            made_2pt: 4,
            missed_2pt: 3,
            made_3pt: 1,
            missed_3pt: 2,
            made_ft: 3,
            missed_ft: 2,
            off_rebounds: 2,
            turnovers: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_possession_formula() {
        // FGA 10 - OREB 2 + TOV 3 + 0.44 * FTA 5
        let poss = estimate_possessions(&counters());
        assert!((poss - 13.2).abs() < 1e-9);
    }

    #[test]
    fn test_derivation_is_reproducible() {
        let c = counters();
        assert_eq!(estimate_possessions(&c), estimate_possessions(&c.clone()));
        assert_eq!(estimate_possessions(&SideCounters::default()), 0.0);
    }

    #[test]
    fn test_pace_sums_both_sides() {
        let own = counters();
        let opp = SideCounters {
            made_2pt: 2,
            turnovers: 1,
            ..Default::default()
        };
        assert!((unscaled_pace(&own, &opp) - 16.2).abs() < 1e-9);
    }
}
