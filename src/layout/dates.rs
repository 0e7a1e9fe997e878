//! Civil-date and wall-clock helpers shared by every builder.
//!
//! Dates are compared by their calendar fields only. Nothing here shifts
//! between timezones.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday,
};

use crate::error::{LayoutError, LayoutResult};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Minutes since midnight, `0..=1440`. `24:00` marks the end of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(u32);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(MINUTES_PER_DAY);

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_hm(hours: u32, minutes: u32) -> Option<Self> {
        if minutes >= 60 {
            return None;
        }
        hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(minutes))
            .and_then(Self::from_minutes)
    }

    pub fn of(time: NaiveTime) -> Self {
        Self(time.hour() * 60 + time.minute())
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hours(self) -> u32 {
        self.0 / 60
    }
}

impl FromStr for ClockTime {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time_to_minutes(s).map(ClockTime)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&minutes_to_time(self.0))
    }
}

/// Parse `HH:MM` into minutes since midnight.
pub fn time_to_minutes(raw: &str) -> LayoutResult<u32> {
    let invalid = || LayoutError::InvalidTimeFormat(raw.to_string());

    let (hours, minutes) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.trim().parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;

    ClockTime::from_hm(hours, minutes)
        .map(ClockTime::minutes)
        .ok_or_else(invalid)
}

pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// True when `day` falls inside the civil-date range of `[start, end]`.
///
/// The range is widened to whole days (00:00:00 on the start date through
/// 23:59:59.999 on the end date) and the day is tested at noon, so partial
/// timestamps on either bound never exclude a day they touch.
pub fn day_in_range(day: NaiveDate, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    let range_start = start.date().and_time(NaiveTime::MIN);
    let range_end = match end.date().and_hms_milli_opt(23, 59, 59, 999) {
        Some(dt) => dt,
        None => return false,
    };
    let noon = match day.and_hms_opt(12, 0, 0) {
        Some(dt) => dt,
        None => return false,
    };

    range_start <= noon && noon <= range_end
}

/// Signed number of civil days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

pub fn is_same_civil_date(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

pub fn days_in_month(year: i32, month: u32) -> LayoutResult<u32> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(LayoutError::InvalidMonth { year, month })?;

    Ok(days_between(first, next) as u32)
}

pub fn first_of_month(year: i32, month: u32) -> LayoutResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(LayoutError::InvalidMonth { year, month })
}

/// Weekday of the 1st, counted from Sunday (0) through Saturday (6).
pub fn first_weekday_of_month(year: i32, month: u32) -> LayoutResult<u32> {
    Ok(first_of_month(year, month)?.weekday().num_days_from_sunday())
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_sunday() as i64)
}

pub const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_from_sunday(index: u32) -> Weekday {
    WEEKDAYS_FROM_SUNDAY[(index % 7) as usize]
}

/// Parse a date as written upstream, keeping its wall-clock fields.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.fff]]` (also with a space
/// separator) and RFC 3339 with an offset or `Z`.
pub fn parse_civil_datetime(raw: &str) -> LayoutResult<NaiveDateTime> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| LayoutError::InvalidDate(raw.to_string()))
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
