//! Elapsed game time between consecutive events.

/// Minutes of game clock that ran between two events of the same period.
///
/// A period-start event always yields 0, whatever the previous event's clock
/// read. A missing previous event, or a clock that ran backwards, also
/// yields 0.
pub fn elapsed_minutes(
    previous_remaining: Option<f64>,
    current_remaining: f64,
    is_period_start: bool,
) -> f64 {
    if is_period_start {
        return 0.0;
    }
    match previous_remaining {
        Some(previous) => (previous - current_remaining).max(0.0) / 60.0,
        None => 0.0,
    }
}
