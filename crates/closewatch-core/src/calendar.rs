//! Reference-date resolution against exchange trading hours.
//!
//! A run anchors every instrument on one calendar date. While the exchange's
//! continuous session is open the day's close does not exist yet, so the
//! previous local date is used instead.

use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::{format_description, offset, time};
use time::{Date, OffsetDateTime, Time, UtcOffset};

use crate::ValidationError;

const COMPACT_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]");
const LABEL_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar date in the exchange's local time, rendered as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceDate(Date);

impl ReferenceDate {
    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    /// Parse a compact `YYYYMMDD` string.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidReferenceDate {
            value: input.to_owned(),
        };

        let trimmed = input.trim();
        if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        Date::parse(trimmed, COMPACT_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub const fn date(self) -> Date {
        self.0
    }

    pub fn compact(self) -> String {
        self.to_string()
    }
}

impl Display for ReferenceDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .0
            .format(COMPACT_FORMAT)
            .map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl Serialize for ReferenceDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReferenceDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Exchange time zone and continuous-session window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketCalendar {
    utc_offset: UtcOffset,
    session_open: Time,
    session_close: Time,
}

impl Default for MarketCalendar {
    fn default() -> Self {
        Self {
            utc_offset: offset!(+9),
            session_open: time!(09:00),
            session_close: time!(15:00),
        }
    }
}

impl MarketCalendar {
    pub fn new(
        utc_offset_hours: i8,
        session_open: Time,
        session_close: Time,
    ) -> Result<Self, ValidationError> {
        if !(-12..=14).contains(&utc_offset_hours) {
            return Err(ValidationError::InvalidUtcOffset {
                hours: utc_offset_hours,
            });
        }
        if session_open >= session_close {
            return Err(ValidationError::InvalidSession {
                open: format_hm(session_open),
                close: format_hm(session_close),
            });
        }

        let utc_offset = UtcOffset::from_hms(utc_offset_hours, 0, 0).map_err(|_| {
            ValidationError::InvalidUtcOffset {
                hours: utc_offset_hours,
            }
        })?;

        Ok(Self {
            utc_offset,
            session_open,
            session_close,
        })
    }

    pub const fn utc_offset(&self) -> UtcOffset {
        self.utc_offset
    }

    pub const fn session_open(&self) -> Time {
        self.session_open
    }

    pub const fn session_close(&self) -> Time {
        self.session_close
    }

    /// Date whose close a run started at `now` should report.
    ///
    /// Inside `[session_open, session_close)` local time this is yesterday,
    /// otherwise today.
    pub fn reference_date(&self, now: OffsetDateTime) -> ReferenceDate {
        let today = now.to_offset(self.utc_offset).date();

        if self.is_in_session(now) {
            ReferenceDate(today.previous_day().unwrap_or(today))
        } else {
            ReferenceDate(today)
        }
    }

    /// Whether `now` falls inside the continuous session, local time.
    pub fn is_in_session(&self, now: OffsetDateTime) -> bool {
        let time_of_day = now.to_offset(self.utc_offset).time();
        time_of_day >= self.session_open && time_of_day < self.session_close
    }

    /// Unix timestamp of local midnight on `date`.
    pub fn midnight_timestamp(&self, date: ReferenceDate) -> i64 {
        date.0
            .midnight()
            .assume_offset(self.utc_offset)
            .unix_timestamp()
    }

    /// Local calendar date of a provider timestamp, formatted `YYYY-MM-DD`.
    pub fn local_date_label(&self, timestamp: i64) -> Option<String> {
        OffsetDateTime::from_unix_timestamp(timestamp)
            .ok()?
            .to_offset(self.utc_offset)
            .date()
            .format(LABEL_FORMAT)
            .ok()
    }
}

/// Parse an `HH:MM` wall-clock time.
pub fn parse_hm(input: &str) -> Option<Time> {
    let (hours, minutes) = input.trim().split_once(':')?;
    let hours = hours.parse::<u8>().ok()?;
    let minutes = minutes.parse::<u8>().ok()?;
    Time::from_hms(hours, minutes, 0).ok()
}

fn format_hm(value: Time) -> String {
    format!("{:02}:{:02}", value.hour(), value.minute())
}
