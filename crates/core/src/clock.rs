// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time sources.
//!
//! Timestamps are always UTC. The calendar date used for "today" is taken in
//! the care home's timezone so a sweep run just after midnight local time
//! sees the right day.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use time::{Date, OffsetDateTime};

/// Source of the current instant and calendar date.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> OffsetDateTime;

    /// The current calendar date.
    fn today(&self) -> Date;
}

/// Wall-clock time, with dates taken in a fixed timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    #[must_use]
    pub const fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn today(&self) -> Date {
        let local: NaiveDate = Utc::now().with_timezone(&self.timezone).date_naive();
        to_calendar_date(local).unwrap_or_else(|| OffsetDateTime::now_utc().date())
    }
}

fn to_calendar_date(date: NaiveDate) -> Option<Date> {
    let ordinal: u16 = u16::try_from(date.ordinal()).ok()?;
    Date::from_ordinal_date(date.year(), ordinal).ok()
}

/// A clock that never moves. Used in tests and replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: OffsetDateTime,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: OffsetDateTime) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn today(&self) -> Date {
        self.now.date()
    }
}
