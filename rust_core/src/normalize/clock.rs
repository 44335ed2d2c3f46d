//! Game-clock parsing.

/// Parse a period clock into seconds remaining.
///
/// Accepts `MM:SS` (optionally fractional, `0:04.3`), a bare seconds value,
/// and ISO-8601 durations as emitted by the live feed (`PT11M24.00S`,
/// `PT45.2S`). Returns `None` when the string is not a clock.
pub fn parse_clock(clock: &str) -> Option<f64> {
    let clock = clock.trim();
    if let Some(iso) = clock.strip_prefix("PT") {
        return parse_iso_duration(iso);
    }

    let parts: Vec<&str> = clock.split(':').collect();
    let seconds = match parts.len() {
        2 => {
            let mins = parts[0].parse::<u32>().ok()?;
            let secs = parts[1].parse::<f64>().ok()?;
            mins as f64 * 60.0 + secs
        }
        1 => parts[0].parse::<f64>().ok()?,
        _ => return None,
    };
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

fn parse_iso_duration(rest: &str) -> Option<f64> {
    let rest = rest.strip_suffix('S').unwrap_or(rest);
    let (minutes, seconds) = match rest.split_once('M') {
        Some((m, s)) => (m.parse::<u32>().ok()?, s),
        None => (0, rest),
    };
    let seconds = if seconds.is_empty() {
        0.0
    } else {
        seconds.parse::<f64>().ok()?
    };
    let total = minutes as f64 * 60.0 + seconds;
    (total.is_finite() && total >= 0.0).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_seconds() {
        assert_eq!(parse_clock("12:00"), Some(720.0));
        assert_eq!(parse_clock("5:07"), Some(307.0));
        assert_eq!(parse_clock("0:04.5"), Some(4.5));
        assert_eq!(parse_clock("42"), Some(42.0));
    }

    #[test]
    fn test_parse_iso_duration() {
        assert_eq!(parse_clock("PT11M24.00S"), Some(684.0));
        assert_eq!(parse_clock("PT00M00.00S"), Some(0.0));
        assert_eq!(parse_clock("PT45.20S"), Some(45.2));
        assert_eq!(parse_clock("PT12M"), Some(720.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_clock(""), None);
        assert_eq!(parse_clock("abc"), None);
        assert_eq!(parse_clock("1:2:3"), None);
        assert_eq!(parse_clock("PTxxM"), None);
        assert_eq!(parse_clock("-5"), None);
    }
}
