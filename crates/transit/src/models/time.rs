//! Schedule time handling.
//!
//! GTFS times are wall-clock values relative to the start of a service day and
//! may run past `24:00:00` for trips that continue after midnight. Everything
//! here works in minutes since midnight of the service day; seconds are kept
//! only so a time can be re-rendered faithfully.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Timelike, Utc};

use crate::models::types::{Result, TransitError};

pub const MINUTES_PER_DAY: i32 = 24 * 60;

const MAX_HOURS: u32 = 99;

/// A `HH:MM:SS` schedule time, not bound to a calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl TimeOfDay {
    /// Build a time from its components.
    ///
    /// Hours may exceed 23 (post-midnight service); minutes and seconds must be
    /// below 60.
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self> {
        let time = Self {
            hours,
            minutes,
            seconds,
        };
        if hours > MAX_HOURS {
            return Err(malformed(&time.to_string(), "hours out of range"));
        }
        if minutes >= 60 {
            return Err(malformed(&time.to_string(), "minutes out of range"));
        }
        if seconds >= 60 {
            return Err(malformed(&time.to_string(), "seconds out of range"));
        }
        Ok(time)
    }

    /// Wall-clock time of `instant` once shifted into a zone `offset_minutes` east of UTC.
    pub fn from_instant(instant: DateTime<Utc>, offset_minutes: i32) -> Self {
        Self {
            hours: instant.hour(),
            minutes: instant.minute(),
            seconds: instant.second(),
        }
        .shifted(offset_minutes)
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Minutes since midnight of the service day. Seconds are ignored.
    pub fn minutes(&self) -> i32 {
        (self.hours * 60 + self.minutes) as i32
    }

    /// Move this time by `offset_minutes`, wrapping into a single day.
    ///
    /// The day overflow is discarded, so `25:30:00` shifted by zero becomes
    /// `01:30:00`. Seconds are preserved.
    pub fn shifted(&self, offset_minutes: i32) -> Self {
        let total = (self.minutes() + offset_minutes).rem_euclid(MINUTES_PER_DAY);
        Self {
            hours: (total / 60) as u32,
            minutes: (total % 60) as u32,
            seconds: self.seconds,
        }
    }

    /// `HH:MM` label used on timeline rows.
    pub fn clock_label(&self) -> String {
        format!("{:02}:{:02}", self.hours, self.minutes)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl FromStr for TimeOfDay {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() < 2 {
            return Err(malformed(s, "expected at least HH:MM"));
        }
        if parts.len() > 3 {
            return Err(malformed(s, "too many components"));
        }

        let hours = parse_component(parts[0]).ok_or_else(|| malformed(s, "hours are not numeric"))?;
        let minutes =
            parse_component(parts[1]).ok_or_else(|| malformed(s, "minutes are not numeric"))?;
        let seconds = match parts.get(2) {
            Some(part) => {
                parse_component(part).ok_or_else(|| malformed(s, "seconds are not numeric"))?
            }
            None => 0,
        };

        Self::new(hours, minutes, seconds).map_err(|_| malformed(s, "component out of range"))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn malformed(input: &str, reason: &str) -> TransitError {
    TransitError::MalformedTime {
        input: input.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Parse a schedule string straight to minutes since midnight.
pub fn parse_to_minutes(time: &str) -> Result<i32> {
    time.parse::<TimeOfDay>().map(|t| t.minutes())
}

/// Minutes since midnight in the display zone for a UTC instant.
///
/// Seconds are truncated, matching how schedule times are compared.
pub fn now_minutes_in_zone(instant: DateTime<Utc>, offset_minutes: i32) -> i32 {
    let utc_minutes = (instant.hour() * 60 + instant.minute()) as i32;
    (utc_minutes + offset_minutes).rem_euclid(MINUTES_PER_DAY)
}

/// Current wall-clock time in the display zone.
pub fn now_in_display_zone(offset_minutes: i32) -> TimeOfDay {
    TimeOfDay::from_instant(Utc::now(), offset_minutes)
}

/// Minutes from `now_minutes` until `scheduled`; negative once it has passed.
pub fn minutes_until(scheduled: &TimeOfDay, now_minutes: i32) -> f64 {
    f64::from(scheduled.minutes() - now_minutes)
}

/// Half-up rounding, so `-3.5` rounds to `-3` and `2.5` to `3`.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Human readable relative time: "3 min ago", "Just Arriving", "in 5 min", "1 hr 15 min".
pub fn format_relative(minutes: f64) -> String {
    if !minutes.is_finite() {
        return "--".to_owned();
    }
    if minutes < 0.0 {
        return format!("{} min ago", round_half_up(minutes).abs() as i64);
    }
    if minutes == 0.0 {
        return "Just Arriving".to_owned();
    }
    if minutes < 1.0 {
        return "< 1 min".to_owned();
    }
    if minutes < 60.0 {
        return format!("in {} min", round_half_up(minutes) as i64);
    }

    // Round the total first so 119.7 reads "2 hr" rather than "1 hr 60 min".
    let total = round_half_up(minutes) as i64;
    let (hours, mins) = (total / 60, total % 60);
    if mins == 0 {
        format!("{hours} hr")
    } else {
        format!("{hours} hr {mins} min")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_to_minutes() {
        assert_eq!(parse_to_minutes("08:05:00").unwrap(), 485);
        assert_eq!(parse_to_minutes("00:00:00").unwrap(), 0);
        assert_eq!(parse_to_minutes("25:30:59").unwrap(), 1530);
        assert_eq!(parse_to_minutes("7:09").unwrap(), 429);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "08", "08:", "ab:cd:ef", "08:5x:00", "08:60:00", "08:00:61", "1:2:3:4", "-1:00"] {
            let err = parse_to_minutes(input).unwrap_err();
            assert!(
                matches!(err, TransitError::MalformedTime { .. }),
                "{input} should be malformed"
            );
        }
    }

    #[test]
    fn test_render_round_trip() {
        for hours in [0, 7, 23, 24, 27] {
            for minutes in [0, 1, 30, 59] {
                for seconds in [0, 15, 59] {
                    let time = TimeOfDay::new(hours, minutes, seconds).unwrap();
                    let rendered = time.to_string();
                    assert_eq!(rendered.len(), 8);
                    let reparsed = t(&rendered);
                    assert_eq!(reparsed, time);
                    assert_eq!(reparsed.minutes(), (hours * 60 + minutes) as i32);
                }
            }
        }
    }

    #[test]
    fn test_shift_wraps_and_keeps_seconds() {
        assert_eq!(t("02:30:15").shifted(330).to_string(), "08:00:15");
        assert_eq!(t("20:00:00").shifted(330).to_string(), "01:30:00");
        assert_eq!(t("01:00:05").shifted(-90).to_string(), "23:30:05");
        assert_eq!(t("25:30:00").shifted(0).to_string(), "01:30:00");
    }

    #[test]
    fn test_shift_inverse() {
        for offset in [-720, -330, -1, 0, 1, 330, 345, 840, 1500] {
            for minutes in (0..MINUTES_PER_DAY).step_by(37) {
                let time = TimeOfDay::new((minutes / 60) as u32, (minutes % 60) as u32, 42).unwrap();
                assert_eq!(time.shifted(offset).shifted(-offset), time);
            }
        }
    }

    #[test]
    fn test_now_minutes_in_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 2, 10, 2, 35, 59).unwrap();
        assert_eq!(now_minutes_in_zone(instant, 330), 8 * 60 + 5);
        assert_eq!(now_minutes_in_zone(instant, -180), 23 * 60 + 35);
        assert_eq!(
            now_minutes_in_zone(instant, 330),
            TimeOfDay::from_instant(instant, 330).minutes()
        );
        assert_eq!(TimeOfDay::from_instant(instant, 330).to_string(), "08:05:59");
    }

    #[test]
    fn test_minutes_until() {
        assert_eq!(minutes_until(&t("08:20:00"), 485), 15.0);
        assert_eq!(minutes_until(&t("08:00:00"), 485), -5.0);
    }

    #[test]
    fn test_format_relative() {
        assert_eq!(format_relative(-3.4), "3 min ago");
        assert_eq!(format_relative(-3.5), "3 min ago");
        assert_eq!(format_relative(0.0), "Just Arriving");
        assert_eq!(format_relative(0.4), "< 1 min");
        assert_eq!(format_relative(1.0), "in 1 min");
        assert_eq!(format_relative(12.5), "in 13 min");
        assert_eq!(format_relative(60.0), "1 hr");
        assert_eq!(format_relative(75.0), "1 hr 15 min");
        assert_eq!(format_relative(119.7), "2 hr");
        assert_eq!(format_relative(f64::NAN), "--");
    }

    #[test]
    fn test_clock_label() {
        assert_eq!(t("09:15:00").clock_label(), "09:15");
        assert_eq!(t("26:05:30").clock_label(), "26:05");
    }
}
