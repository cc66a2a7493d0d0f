const SECOND: u64 = 1_000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Format a playback offset in milliseconds as `mm:ss`, or `hh:mm:ss`
/// once it reaches an hour. Partial seconds are dropped.
pub fn format_time(ms: u64) -> String {
    let hours = ms / HOUR;
    let minutes = ms % HOUR / MINUTE;
    let seconds = ms % MINUTE / SECOND;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Label for a speed option button, e.g. `2x` or `0.5x`.
pub fn format_speed(speed: f64) -> String {
    format!("{speed}x")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_all_zeros() {
        assert_eq!(format_time(0), "00:00");
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(format_time(999), "00:00");
        assert_eq!(format_time(61_500), "01:01");
        assert_eq!(format_time(59 * MINUTE + 59 * SECOND), "59:59");
    }

    #[test]
    fn hours_appear_when_non_zero() {
        assert_eq!(format_time(HOUR), "01:00:00");
        assert_eq!(format_time(3_661_000), "01:01:01");
    }

    #[test]
    fn speed_labels() {
        assert_eq!(format_speed(1.0), "1x");
        assert_eq!(format_speed(0.5), "0.5x");
    }
}
