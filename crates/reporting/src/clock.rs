//! Calendar day boundaries for reports.

use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::ReportError;

/// The time zone whose calendar day a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportClock {
    /// The server's local time zone, including its DST rules.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl ReportClock {
    /// Returns `[start_of_today, start_of_tomorrow)` as UTC instants, where
    /// "today" is the calendar day containing `now` in this clock's zone.
    pub fn day_bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            ReportClock::Local => bounds_in(&Local, now),
            ReportClock::Fixed(offset) => bounds_in(offset, now),
        }
    }
}

fn bounds_in<Tz: TimeZone>(tz: &Tz, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.with_timezone(tz).date_naive();
    let tomorrow = today.succ_opt().unwrap_or(NaiveDate::MAX);
    (start_of(tz, today), start_of(tz, tomorrow))
}

fn start_of<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return start.with_timezone(&Utc);
    }
    // Midnight skipped by a DST jump; the day starts at the first valid hour.
    (1..=3)
        .find_map(|h| {
            tz.from_local_datetime(&(midnight + Duration::hours(h)))
                .earliest()
        })
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

impl FromStr for ReportClock {
    type Err = ReportError;

    /// Accepts `local`, `Z`, or an offset such as `+07:00`, `-0530`, `+7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("local") {
            return Ok(ReportClock::Local);
        }
        let invalid = || ReportError::InvalidOffset(raw.to_string());
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return FixedOffset::east_opt(0)
                .map(ReportClock::Fixed)
                .ok_or_else(invalid);
        }

        let (sign, rest) = match raw.split_at_checked(1) {
            Some(("+", rest)) => (1, rest),
            Some(("-", rest)) => (-1, rest),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 => rest.split_at(2),
            None => (rest, "0"),
        };
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(ReportClock::Fixed)
            .ok_or_else(invalid)
    }
}
