use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Named, calendar-aligned slice of the draw history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    /// Trailing seven days ending now.
    RecentDays,
}

/// Inclusive range of draw timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whole calendar days `from..=to`.
    pub fn days(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            start: start_of_day(from),
            end: end_of_day(to),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 6] = [
        TimeWindow::Today,
        TimeWindow::Yesterday,
        TimeWindow::ThisWeek,
        TimeWindow::LastWeek,
        TimeWindow::ThisMonth,
        TimeWindow::RecentDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Today => "today",
            TimeWindow::Yesterday => "yesterday",
            TimeWindow::ThisWeek => "this_week",
            TimeWindow::LastWeek => "last_week",
            TimeWindow::ThisMonth => "this_month",
            TimeWindow::RecentDays => "recent_days",
        }
    }

    /// Human-readable phrase used inside report strings.
    pub fn describe(&self) -> &'static str {
        match self {
            TimeWindow::Today => "today",
            TimeWindow::Yesterday => "yesterday",
            TimeWindow::ThisWeek => "this week",
            TimeWindow::LastWeek => "last week",
            TimeWindow::ThisMonth => "this month",
            TimeWindow::RecentDays => "the last 7 days",
        }
    }

    /// Resolve to a concrete range. Weeks start on Sunday.
    pub fn resolve(&self, now: NaiveDateTime) -> DateRange {
        let today = now.date();
        match self {
            TimeWindow::Today => DateRange::days(today, today),
            TimeWindow::Yesterday => {
                let yesterday = today - Duration::days(1);
                DateRange::days(yesterday, yesterday)
            }
            TimeWindow::ThisWeek => {
                let start = week_start(today);
                DateRange::days(start, start + Duration::days(6))
            }
            TimeWindow::LastWeek => {
                let start = week_start(today) - Duration::days(7);
                DateRange::days(start, start + Duration::days(6))
            }
            TimeWindow::ThisMonth => {
                let start = today.with_day(1).unwrap_or(today);
                DateRange::days(start, last_day_of_month(today))
            }
            TimeWindow::RecentDays => DateRange::new(now - Duration::days(7), now),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .find(|w| w.as_str() == normalized)
            .copied()
            .ok_or_else(|| ParseError::UnknownWindow(s.to_string()))
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first_of_next| first_of_next - Duration::days(1))
        .unwrap_or(date)
}
