use std::time::Duration;

/// Format a millisecond duration as `"H h M m S s"`.
///
/// Seconds are rounded, not truncated. Hour and minute segments are left
/// out entirely when they are zero and no larger unit was printed, so
/// `45000` becomes `"45 s"` but `3600000` becomes `"1 h 0 m 0 s"`.
pub fn format_duration(millis: f64) -> String {
    let mut out = String::new();
    let seconds = (millis / 1000.0).round();
    let mut minutes = (seconds / 60.0).floor();
    let hours = (minutes / 60.0).floor();

    if hours >= 1.0 {
        out.push_str(&format!("{} h ", number(hours)));
        minutes %= 60.0;
    }
    if hours >= 1.0 || minutes >= 1.0 {
        out.push_str(&format!("{} m ", number(minutes)));
    }
    out.push_str(&format!("{} s", number(seconds % 60.0)));
    out
}

pub fn format_std_duration(duration: Duration) -> String {
    format_duration(duration.as_secs_f64() * 1000.0)
}

/// Format the span between two epoch-millisecond timestamps.
pub fn format_elapsed(start_ms: i64, stop_ms: i64) -> String {
    format_duration(stop_ms.saturating_sub(start_ms) as f64)
}

// Whole values print without a fractional part; -0 prints as 0.
fn number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_documented_examples() {
        assert_eq!(format_duration(0.0), "0 s");
        assert_eq!(format_duration(45_000.0), "45 s");
        assert_eq!(format_duration(65_000.0), "1 m 5 s");
        assert_eq!(format_duration(3_665_000.0), "1 h 1 m 5 s");
        assert_eq!(format_duration(3_600_000.0), "1 h 0 m 0 s");
    }

    #[test]
    fn rounds_to_nearest_second() {
        assert_eq!(format_duration(1_499.0), "1 s");
        assert_eq!(format_duration(1_500.0), "2 s");
        assert_eq!(format_duration(59_600.0), "1 m 0 s");
        assert_eq!(format_duration(400.0), "0 s");
    }

    #[test]
    fn minutes_reset_after_each_hour() {
        assert_eq!(format_duration(7_384_000.0), "2 h 3 m 4 s");
        assert_eq!(format_duration(90_000_000.0), "25 h 0 m 0 s");
    }

    #[test]
    fn nan_does_not_panic() {
        assert_eq!(format_duration(f64::NAN), "NaN s");
    }

    #[test]
    fn std_and_elapsed_helpers_agree() {
        assert_eq!(format_std_duration(Duration::from_millis(65_000)), "1 m 5 s");
        assert_eq!(format_elapsed(1_000, 66_000), "1 m 5 s");
    }
}
