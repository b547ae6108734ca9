use std::time::Duration;

const NANOS_PER_SECOND: u128 = 1_000_000_000;
const SECONDS_PER_DAY: u128 = 24 * 60 * 60;

/// Largest unit first; a month is 30 days and a year 365
const UNITS: [(&str, u128); 9] = [
    ("y", 365 * SECONDS_PER_DAY * NANOS_PER_SECOND),
    ("mo", 30 * SECONDS_PER_DAY * NANOS_PER_SECOND),
    ("d", SECONDS_PER_DAY * NANOS_PER_SECOND),
    ("h", 60 * 60 * NANOS_PER_SECOND),
    ("m", 60 * NANOS_PER_SECOND),
    ("s", NANOS_PER_SECOND),
    ("ms", 1_000_000),
    ("us", 1_000),
    ("ns", 1),
];

/// Human-friendly duration showing the two largest non-zero units,
/// e.g. `1h2m`, `3s250ms`, `0s`
pub fn format_duration_long(duration: Duration) -> String {
    let mut remaining = duration.as_nanos();
    let mut parts = Vec::with_capacity(2);
    for (name, factor) in UNITS {
        let value = remaining / factor;
        remaining %= factor;
        if value > 0 {
            parts.push(format!("{value}{name}"));
        }
        if parts.len() == 2 {
            break;
        }
    }
    if parts.is_empty() {
        return "0s".to_string();
    }
    parts.concat()
}
