/*
 * This file is part of TCN Reports.
 *
 * Copyright © 2024 The TCN Reports Authors
 *
 * TCN Reports is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * TCN Reports is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with TCN Reports.  If not, see <http://www.gnu.org/licenses/>.
 */

use std::time::Duration;

use time::{Date, OffsetDateTime, UtcOffset};

/// Number of seconds in a UTC day
pub const SECONDS_PER_DAY: u32 = 86_400;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
/// The key reports are filed and queried under
pub struct Bucket {
    /// The UTC calendar date
    pub date: Date,

    /// The sub-day interval within `date`
    pub interval_number: u32,
}

impl Bucket {
    /// Create a bucket from an explicit date and interval
    pub const fn new(date: Date, interval_number: u32) -> Self {
        Bucket {
            date,
            interval_number,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.date, self.interval_number)
    }
}

/// Project an instant onto the UTC calendar date containing it
///
/// The offset the instant happens to carry is irrelevant, only the instant itself is considered.
pub fn to_utc_date(instant: OffsetDateTime) -> Date {
    instant.to_offset(UtcOffset::UTC).date()
}

#[derive(Debug, thiserror::Error)]
/// Reasons an interval width can be rejected
pub enum IntervalError {
    /// Width of zero
    #[error("Interval width must be greater than zero")]
    Zero,

    /// Width contained a fraction of a second
    #[error("Interval width {0:?} is not a whole number of seconds")]
    Fractional(Duration),

    /// Width longer than a day
    #[error("Interval width {0:?} is longer than a day")]
    LongerThanDay(Duration),

    /// Width does not split a day into equal parts
    #[error("Interval width {0:?} does not divide a day evenly")]
    Uneven(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Splits each UTC day into fixed-width intervals
///
/// Interval numbers start at 0 at UTC midnight and count up to `per_day() - 1`. The width must
/// divide a day evenly so every day has the same number of intervals.
pub struct Intervals {
    width_seconds: u32,
}

impl Intervals {
    /// Six hour intervals, four per day
    pub const DEFAULT: Intervals = Intervals {
        width_seconds: 6 * 60 * 60,
    };

    /// Build an interval layout from a width
    pub fn new(width: Duration) -> Result<Self, IntervalError> {
        if width.subsec_nanos() != 0 {
            return Err(IntervalError::Fractional(width));
        }

        let seconds = width.as_secs();

        if seconds == 0 {
            return Err(IntervalError::Zero);
        }

        if seconds > u64::from(SECONDS_PER_DAY) {
            return Err(IntervalError::LongerThanDay(width));
        }

        if u64::from(SECONDS_PER_DAY) % seconds != 0 {
            return Err(IntervalError::Uneven(width));
        }

        Ok(Intervals {
            width_seconds: seconds as u32,
        })
    }

    /// Build an interval layout from a width in minutes
    pub fn from_minutes(minutes: u32) -> Result<Self, IntervalError> {
        Self::new(Duration::from_secs(u64::from(minutes) * 60))
    }

    /// The width of a single interval
    pub fn width(&self) -> Duration {
        Duration::from_secs(u64::from(self.width_seconds))
    }

    /// How many intervals make up a day
    pub fn per_day(&self) -> u32 {
        SECONDS_PER_DAY / self.width_seconds
    }

    /// Map an instant to the interval of its UTC day that contains it
    pub fn to_interval(&self, instant: OffsetDateTime) -> u32 {
        let (hour, minute, second) = instant.to_offset(UtcOffset::UTC).to_hms();

        let seconds = u32::from(hour) * 3600 + u32::from(minute) * 60 + u32::from(second);

        seconds / self.width_seconds
    }

    /// Resolve the bucket an instant falls in
    ///
    /// Date and interval both come from the same instant, so a bucket never straddles midnight.
    pub fn bucket(&self, instant: OffsetDateTime) -> Bucket {
        Bucket {
            date: to_utc_date(instant),
            interval_number: self.to_interval(instant),
        }
    }
}

impl Default for Intervals {
    fn default() -> Self {
        Self::DEFAULT
    }
}
