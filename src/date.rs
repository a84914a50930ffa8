use std::fmt::{self, Display};

use chrono::{DateTime, Datelike as _, NaiveDate, TimeDelta, Timelike as _, Utc};
use tracing::warn;

/// Flat offset applied when showing times in Kyiv local time. No DST handling.
const KYIV_OFFSET_HOURS: i64 = 3;

/// A NOTAM date-time group: `YYMMDDHHMM` with an optional timezone suffix such as `EST`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotamDate {
    /// The ten digits read as UTC, year `20YY`.
    pub instant: DateTime<Utc>,
    /// Anything after the ten digits, trimmed. Ignored for comparisons.
    pub suffix: Option<String>,
}

impl NotamDate {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (digits, suffix) = value.split_at_checked(10)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            warn!("invalid NOTAM date: {value:?}");
            return None;
        }

        // ASCII digits only, slicing and parsing cannot fail
        let number = |range: std::ops::Range<usize>| digits[range].parse::<u32>().unwrap_or_default();
        let year = 2000 + number(0..2) as i32;

        let Some(instant) = NaiveDate::from_ymd_opt(year, number(2..4), number(4..6))
            .and_then(|date| date.and_hms_opt(number(6..8), number(8..10), 0))
            .map(|naive| naive.and_utc())
        else {
            warn!("NOTAM date out of range: {value:?}");
            return None;
        };

        let suffix = suffix.trim();
        Some(Self {
            instant,
            suffix: (!suffix.is_empty()).then(|| suffix.to_string()),
        })
    }

    pub fn is_before(&self, now: DateTime<Utc>) -> bool {
        self.instant < now
    }

    pub fn local(&self) -> LocalTime<'_> {
        LocalTime(self)
    }
}

/// Display form for humans: `EST` times are shown as written, everything else
/// is shifted to Kyiv time.
pub struct LocalTime<'a>(&'a NotamDate);

impl Display for LocalTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.0;
        if date.suffix.as_deref() == Some("EST") {
            let t = date.instant;
            write!(
                f,
                "{}.{}.{} {:02}:{:02} EST",
                t.day(),
                t.month(),
                t.year(),
                t.hour(),
                t.minute()
            )
        } else {
            let t = date.instant + TimeDelta::hours(KYIV_OFFSET_HOURS);
            write!(f, "{} Kyiv", t.format("%d.%m.%Y %H:%M"))
        }
    }
}

/// Shifts a `HHMM` UTC time of day to Kyiv time, wrapping at midnight.
/// Anything that is not four digits is returned unchanged.
pub fn utc_time_to_kyiv(hhmm: &str) -> String {
    if hhmm.len() != 4 || !hhmm.bytes().all(|b| b.is_ascii_digit()) {
        return hhmm.to_string();
    }
    let hours: i64 = hhmm[0..2].parse().unwrap_or_default();
    let minutes = &hhmm[2..4];
    format!("{:02}:{minutes}", (hours + KYIV_OFFSET_HOURS) % 24)
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone as _, Utc};

    use super::{utc_time_to_kyiv, NotamDate};

    #[test]
    fn test_parse() {
        let date = NotamDate::parse("2412312359").unwrap();
        assert_eq!(
            date.instant,
            Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap()
        );
        assert_eq!(date.suffix, None);

        let date = NotamDate::parse("2403150600EST").unwrap();
        assert_eq!(
            date.instant,
            Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap()
        );
        assert_eq!(date.suffix.as_deref(), Some("EST"));
    }

    #[test]
    fn test_parse_invalid() {
        for value in ["", "PERM", "24123123", "24AB312359", "2413312359", "2402302359"] {
            assert_eq!(NotamDate::parse(value), None, "{value}");
        }
    }

    #[test]
    fn test_is_before() {
        let date = NotamDate::parse("2406010000").unwrap();
        assert!(date.is_before(Utc.with_ymd_and_hms(2024, 6, 1, 0, 1, 0).unwrap()));
        assert!(!date.is_before(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_local_display() {
        let date = NotamDate::parse("2412312230").unwrap();
        assert_eq!(date.local().to_string(), "01.01.2025 01:30 Kyiv");

        let date = NotamDate::parse("2403050600 EST").unwrap();
        assert_eq!(date.local().to_string(), "5.3.2024 06:00 EST");
    }

    #[test]
    fn test_utc_time_to_kyiv() {
        assert_eq!(utc_time_to_kyiv("0600"), "09:00");
        assert_eq!(utc_time_to_kyiv("2215"), "01:15");
        assert_eq!(utc_time_to_kyiv("SR"), "SR");
    }
}
