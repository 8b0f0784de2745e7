//! Calendar-day keys and the clock abstraction.
//!
//! Streaks, test cadence and reflection windows are all computed on local
//! calendar days, never on raw timestamps. Operations that depend on "today"
//! receive a [`Clock`] so tests can pin the date.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar day in local time, formatted as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a key from year/month/day. Returns `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Calendar day of a timestamp, evaluated in the timestamp's own zone.
    pub fn from_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> Self {
        Self(ts.date_naive())
    }

    /// Today in the local time zone.
    pub fn today() -> Self {
        Self::from_timestamp(&Local::now())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day.
    pub fn pred(&self) -> Self {
        Self(self.0 - Duration::days(1))
    }

    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: DateKey) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Sunday that starts the week containing this day.
    pub fn week_start(&self) -> Self {
        let offset = self.0.weekday().num_days_from_sunday() as i64;
        Self(self.0 - Duration::days(offset))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> DateKey {
        DateKey::from_timestamp(&self.now())
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock pinned to a settable instant (tests, replays).
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Noon local time on the given day.
    pub fn at_day(day: DateKey) -> Self {
        Self::new(noon(day))
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn set_day(&self, day: DateKey) {
        self.now.set(noon(day));
    }

    pub fn advance_days(&self, days: i64) {
        self.now.set(self.now.get() + Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

fn noon(day: DateKey) -> DateTime<Local> {
    let naive = day.date().and_hms_opt(12, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(Local::now)
}

/// Parse a weekday name such as `sun`, `Sunday` or `mon`.
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse::<Weekday>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_roundtrip() {
        let key = DateKey::from_ymd(2024, 3, 9).unwrap();
        assert_eq!(key.to_string(), "2024-03-09");
        assert_eq!("2024-03-09".parse::<DateKey>().unwrap(), key);
    }

    #[test]
    fn stepping_days_crosses_month_boundaries() {
        let key = DateKey::from_ymd(2024, 3, 1).unwrap();
        assert_eq!(key.pred(), DateKey::from_ymd(2024, 2, 29).unwrap());
        assert_eq!(key.pred().add_days(1), key);
    }

    #[test]
    fn from_timestamp_uses_the_timestamps_zone() {
        let offset = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        // 2024-01-01 23:30 UTC is already Jan 2 at +09:00
        let ts = offset.with_ymd_and_hms(2024, 1, 2, 8, 30, 0).unwrap();
        assert_eq!(DateKey::from_timestamp(&ts).to_string(), "2024-01-02");
        let utc = ts.with_timezone(&chrono::Utc);
        assert_eq!(DateKey::from_timestamp(&utc).to_string(), "2024-01-01");
    }

    #[test]
    fn week_start_is_sunday() {
        // 2024-06-12 is a Wednesday
        let wed = DateKey::from_ymd(2024, 6, 12).unwrap();
        assert_eq!(wed.week_start().to_string(), "2024-06-09");
        let sun = DateKey::from_ymd(2024, 6, 9).unwrap();
        assert_eq!(sun.week_start(), sun);
    }

    #[test]
    fn serde_as_plain_string() {
        let key = DateKey::from_ymd(2025, 12, 31).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2025-12-31\"");
        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::at_day(DateKey::from_ymd(2024, 1, 31).unwrap());
        clock.advance_days(1);
        assert_eq!(clock.today().to_string(), "2024-02-01");
    }

    #[test]
    fn weekday_parsing() {
        assert_eq!(parse_weekday("sun"), Some(Weekday::Sun));
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("someday"), None);
    }
}
