//! Human-readable time formatting for response assembly.
//!
//! Poll and scrap responses carry pre-formatted display strings rather than
//! raw timestamps. Both helpers take `now` explicitly so callers stay
//! deterministic under test.

use chrono::{DateTime, Utc};

/// Render the elapsed time since `from` as a relative display string.
///
/// # Examples
/// ```
/// use backend::domain::time::format_relative_time;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5 minutes ago");
/// ```
pub fn format_relative_time(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(from);
    if elapsed.num_seconds() < 60 {
        return "just now".to_owned();
    }
    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = elapsed.num_days();
    if days < 30 {
        return plural(days, "day");
    }
    from.format("%Y-%m-%d").to_string()
}

/// Render the time left until `until` as a countdown string.
///
/// Returns `D-n` while whole days remain, `D-DAY` on the final day, and
/// `closed` once the deadline has passed.
pub fn format_d_day(until: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = until.signed_duration_since(now);
    if remaining.num_seconds() < 0 {
        return "closed".to_owned();
    }
    let days = remaining.num_days();
    if days == 0 {
        "D-DAY".to_owned()
    } else {
        format!("D-{days}")
    }
}

fn plural(amount: i64, unit: &str) -> String {
    if amount == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{amount} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 14, 12, 0, 0).single().expect("valid timestamp")
    }

    #[rstest]
    #[case(Duration::seconds(10), "just now")]
    #[case(Duration::seconds(59), "just now")]
    #[case(Duration::minutes(1), "1 minute ago")]
    #[case(Duration::minutes(5), "5 minutes ago")]
    #[case(Duration::minutes(59), "59 minutes ago")]
    #[case(Duration::hours(1), "1 hour ago")]
    #[case(Duration::hours(23), "23 hours ago")]
    #[case(Duration::days(1), "1 day ago")]
    #[case(Duration::days(29), "29 days ago")]
    fn relative_time_buckets(#[case] elapsed: Duration, #[case] expected: &str) {
        assert_eq!(format_relative_time(now() - elapsed, now()), expected);
    }

    #[test]
    fn relative_time_falls_back_to_date_after_a_month() {
        let from = now() - Duration::days(45);
        assert_eq!(format_relative_time(from, now()), "2025-05-30");
    }

    #[rstest]
    #[case(Duration::hours(2), "D-DAY")]
    #[case(Duration::days(1), "D-1")]
    #[case(Duration::days(3), "D-3")]
    #[case(Duration::days(3) + Duration::hours(6), "D-3")]
    fn d_day_buckets(#[case] remaining: Duration, #[case] expected: &str) {
        assert_eq!(format_d_day(now() + remaining, now()), expected);
    }

    #[test]
    fn d_day_after_expiry_reads_closed() {
        assert_eq!(format_d_day(now() - Duration::seconds(1), now()), "closed");
    }
}
