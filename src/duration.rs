use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:[.,]\d+)?S)?)?$",
    )
    .unwrap()
});

/// Outcome of parsing an ISO-8601 duration.
///
/// Absent and malformed inputs both fall back to zero seconds, but stay
/// distinguishable for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsoDuration {
    Parsed(u64),
    Absent,
    Malformed(String),
}

impl IsoDuration {
    pub fn seconds(&self) -> u64 {
        match self {
            IsoDuration::Parsed(secs) => *secs,
            IsoDuration::Absent | IsoDuration::Malformed(_) => 0,
        }
    }
}

/// Parse a duration like `PT4M13S` into whole seconds.
pub fn parse_iso_duration(input: Option<&str>) -> IsoDuration {
    let raw = match input.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => {
            debug!("Duration absent, using 0 seconds");
            return IsoDuration::Absent;
        }
    };

    match iso_seconds(raw) {
        Some(secs) => IsoDuration::Parsed(secs),
        None => {
            warn!("Malformed ISO-8601 duration '{}', using 0 seconds", raw);
            IsoDuration::Malformed(raw.to_string())
        }
    }
}

fn iso_seconds(raw: &str) -> Option<u64> {
    // "P", "PT" and "P1DT" carry a designator without a value
    if raw.ends_with('T') || raw == "P" {
        return None;
    }
    let caps = ISO_DURATION.captures(raw)?;

    const UNITS: [(usize, u64); 5] = [(1, 604_800), (2, 86_400), (3, 3_600), (4, 60), (5, 1)];
    let mut total: u64 = 0;
    for (group, scale) in UNITS {
        if let Some(m) = caps.get(group) {
            let value: u64 = m.as_str().parse().ok()?;
            total = total.checked_add(value.checked_mul(scale)?)?;
        }
    }
    Some(total)
}

/// Render a millisecond count as `minutes:seconds`, seconds zero-padded.
pub fn format_millis(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_component_sums() {
        assert_eq!(parse_iso_duration(Some("PT4M13S")), IsoDuration::Parsed(253));
        assert_eq!(parse_iso_duration(Some("PT1H2M3S")).seconds(), 3723);
        assert_eq!(parse_iso_duration(Some("PT3M")).seconds(), 180);
        assert_eq!(parse_iso_duration(Some("PT45S")).seconds(), 45);
        assert_eq!(parse_iso_duration(Some("PT0S")), IsoDuration::Parsed(0));
        assert_eq!(parse_iso_duration(Some("P1DT1S")).seconds(), 86_401);
        assert_eq!(parse_iso_duration(Some("P1W")).seconds(), 604_800);
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        assert_eq!(parse_iso_duration(Some("PT1M1.75S")).seconds(), 61);
    }

    #[test]
    fn malformed_input_falls_back_to_zero() {
        for bad in ["P", "PT", "P1DT", "4M13S", "PT4X", "P1Y", "garbage", "PT-3S"] {
            let parsed = parse_iso_duration(Some(bad));
            assert_eq!(parsed, IsoDuration::Malformed(bad.to_string()), "input {bad}");
            assert_eq!(parsed.seconds(), 0);
        }
    }

    #[test]
    fn absent_is_distinct_from_malformed() {
        assert_eq!(parse_iso_duration(None), IsoDuration::Absent);
        assert_eq!(parse_iso_duration(Some("  ")), IsoDuration::Absent);
        assert_eq!(parse_iso_duration(Some("PT1S")), IsoDuration::Parsed(1));
    }

    #[test]
    fn overflow_is_malformed() {
        let huge = format!("PT{}H", u64::MAX);
        assert!(matches!(parse_iso_duration(Some(&huge)), IsoDuration::Malformed(_)));
    }

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_millis(198_000), "3:18");
        assert_eq!(format_millis(5_000), "0:05");
        assert_eq!(format_millis(0), "0:00");
        assert_eq!(format_millis(59_999), "0:59");
        assert_eq!(format_millis(3_600_000), "60:00");
    }
}
