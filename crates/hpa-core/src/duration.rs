//! Duration strings used in scenario files: `"30s"`, `"5m"`, `"500ms"`,
//! `"1h"`, or a bare number of seconds.

use std::time::Duration;

/// Parse a duration string like "30s", "5m", "500ms", "1h" or "10".
///
/// Values that do not fit in a `u64` number of seconds are rejected.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (value, unit) = s.split_at(digits);
    let value: u64 = value.parse().ok()?;

    match unit.trim() {
        "" | "s" => Some(Duration::from_secs(value)),
        "ms" => Some(Duration::from_millis(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs),
        "h" => value.checked_mul(60 * 60).map(Duration::from_secs),
        _ => None,
    }
}

/// Render a duration in the shortest form [`parse_duration`] reads back.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis % 1000 != 0 {
        format!("{millis}ms")
    } else {
        let secs = d.as_secs();
        if secs != 0 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{secs}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seconds() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration(" 0s "), Some(Duration::ZERO));
    }

    #[test]
    fn parses_milliseconds() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
    }

    #[test]
    fn parses_minutes() {
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
    }

    #[test]
    fn parses_hours() {
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
    }

    #[test]
    fn unit_may_follow_a_space() {
        assert_eq!(parse_duration("30 s"), Some(Duration::from_secs(30)));
    }

    #[test]
    fn overflowing_minutes_and_hours_are_rejected() {
        // u64::MAX / 60 = 307445734561825860
        assert_eq!(
            parse_duration("307445734561825860m"),
            Some(Duration::from_secs(307_445_734_561_825_860 * 60))
        );
        assert_eq!(parse_duration("307445734561825861m"), None);
        // u64::MAX / 3600 = 5124095576030431
        assert_eq!(parse_duration("5124095576030432h"), None);
        // does not fit in a u64 at all
        assert_eq!(parse_duration("18446744073709551616s"), None);
    }

    #[test]
    fn plain_number_is_seconds() {
        assert_eq!(parse_duration("15"), Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("-5s"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("5d"), None);
        assert_eq!(parse_duration("1.5s"), None);
    }

    #[test]
    fn format_picks_shortest_unit() {
        assert_eq!(format_duration(Duration::from_secs(300)), "5m");
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }
}
