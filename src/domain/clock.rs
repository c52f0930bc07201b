use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Parse a source timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Postgres text form: "2026-10-19 12:00:00.123+00"
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `YYYY-MM-DD` portion of a timestamp string.
pub fn date_prefix(raw: &str) -> Option<&str> {
    let prefix = raw.get(..10)?;
    let bytes = prefix.as_bytes();
    let shaped = bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    shaped.then_some(prefix)
}

/// Sort key for "newest" comparisons: parsed instant first, raw text as tie-break.
pub fn recency_key(raw: Option<&str>) -> (Option<DateTime<Utc>>, Option<&str>) {
    (raw.and_then(parse_timestamp), raw)
}

/// 24h `HH:MM` in UTC, as shown in feeds.
pub fn clock_time(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|ts| ts.format("%H:%M").to_string())
}

/// `MM/DD HH:MM` in UTC, as shown on task cards.
pub fn card_time(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|ts| ts.format("%m/%d %H:%M").to_string())
}

/// 12h `HH:MM AM` in UTC, as shown for restarts.
pub fn wall_time(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|ts| ts.format("%I:%M %p").to_string())
}

/// The instant a snapshot is taken, with the calendar keys derived from it.
#[derive(Debug, Clone)]
pub struct Clock {
    now: DateTime<Utc>,
    today: String,
    week_ago: String,
    month_start: String,
}

impl Clock {
    pub fn at(now: DateTime<Utc>) -> Self {
        let today = now.format("%Y-%m-%d").to_string();
        let week_ago = (now - Duration::days(7)).format("%Y-%m-%d").to_string();
        let month_start = now.format("%Y-%m-01").to_string();
        Self {
            now,
            today,
            week_ago,
            month_start,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Today's UTC date as `YYYY-MM-DD`
    pub fn today(&self) -> &str {
        &self.today
    }

    pub fn generated_at(&self) -> String {
        self.now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn is_today(&self, raw: Option<&str>) -> bool {
        raw.and_then(date_prefix) == Some(self.today.as_str())
    }

    /// True for timestamps on or after the date seven days back.
    pub fn is_within_week(&self, raw: Option<&str>) -> bool {
        raw.and_then(date_prefix)
            .is_some_and(|day| day >= self.week_ago.as_str())
    }

    pub fn is_this_month(&self, raw: Option<&str>) -> bool {
        raw.and_then(date_prefix)
            .is_some_and(|day| day >= self.month_start.as_str())
    }

    /// Exact time elapsed since `raw`; negative for timestamps in the future.
    pub fn elapsed_since(&self, raw: Option<&str>) -> Option<Duration> {
        Some(self.now - parse_timestamp(raw?)?)
    }

    /// Whole minutes elapsed since `raw`, never negative.
    pub fn minutes_since(&self, raw: Option<&str>) -> Option<i64> {
        let ts = parse_timestamp(raw?)?;
        Some((self.now - ts).num_minutes().max(0))
    }

    pub fn hours_since(&self, raw: Option<&str>) -> Option<i64> {
        let ts = parse_timestamp(raw?)?;
        Some((self.now - ts).num_hours().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> Clock {
        Clock::at(Utc.with_ymd_and_hms(2026, 3, 9, 14, 30, 0).unwrap())
    }

    #[test]
    fn parses_source_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2026-03-09T12:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-09T12:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-09T14:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-09 12:00:00+00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-09T12:00:00"), Some(expected));
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn date_prefix_requires_a_calendar_shape() {
        assert_eq!(date_prefix("2026-03-09T12:00:00Z"), Some("2026-03-09"));
        assert_eq!(date_prefix("2026-03-09"), Some("2026-03-09"));
        assert_eq!(date_prefix("2026/03/09"), None);
        assert_eq!(date_prefix("short"), None);
    }

    #[test]
    fn calendar_windows() {
        let clock = clock();
        assert_eq!(clock.today(), "2026-03-09");
        assert!(clock.is_today(Some("2026-03-09T00:01:00Z")));
        assert!(!clock.is_today(Some("2026-03-08T23:59:00Z")));
        assert!(!clock.is_today(None));
        assert!(clock.is_within_week(Some("2026-03-02T08:00:00Z")));
        assert!(!clock.is_within_week(Some("2026-03-01T23:00:00Z")));
        assert!(clock.is_this_month(Some("2026-03-01T00:00:00Z")));
        assert!(!clock.is_this_month(Some("2026-02-28T23:00:00Z")));
    }

    #[test]
    fn ages_are_whole_and_non_negative() {
        let clock = clock();
        assert_eq!(clock.minutes_since(Some("2026-03-09T14:00:00Z")), Some(30));
        assert_eq!(clock.minutes_since(Some("2026-03-09T15:00:00Z")), Some(0));
        assert_eq!(clock.hours_since(Some("2026-03-09T10:45:00Z")), Some(3));
        assert_eq!(clock.minutes_since(None), None);
        assert_eq!(
            clock.elapsed_since(Some("2026-03-09T13:59:15Z")),
            Some(Duration::seconds(30 * 60 + 45))
        );
    }

    #[test]
    fn display_formats() {
        assert_eq!(clock_time("2026-03-09T07:05:00Z").as_deref(), Some("07:05"));
        assert_eq!(card_time("2026-03-09T07:05:00Z").as_deref(), Some("03/09 07:05"));
        assert_eq!(wall_time("2026-03-09T19:05:00Z").as_deref(), Some("07:05 PM"));
    }
}
