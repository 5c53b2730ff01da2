// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift slot generation.
//!
//! A shift is divided into fixed-length slots, each needing a log entry.
//! Slots are times of day only; the calendar date comes from the shift log
//! they belong to. Night shifts wrap past midnight using time-of-day
//! arithmetic, so a 20:00 start yields `20:00 .. 23:00, 00:00 .. 07:00`.

use time::macros::time;
use time::{Duration, Time};

use crate::error::DomainError;
use crate::types::ShiftKind;

const SECONDS_PER_DAY: i64 = 86_400;
const MINUTES_PER_DAY: u32 = 1_440;

/// How a shift is divided into slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotPolicy {
    slot_minutes: u16,
    slot_count: u16,
}

impl SlotPolicy {
    /// Hourly slots across a twelve hour shift.
    pub const HOURLY_TWELVE_HOUR: Self = Self {
        slot_minutes: 60,
        slot_count: 12,
    };

    /// Creates a slot policy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSlotPolicy` if either value is zero or the
    /// shift would be longer than a day.
    pub fn new(slot_minutes: u16, slot_count: u16) -> Result<Self, DomainError> {
        let total: u32 = u32::from(slot_minutes) * u32::from(slot_count);
        if slot_minutes == 0 || slot_count == 0 || total > MINUTES_PER_DAY {
            return Err(DomainError::InvalidSlotPolicy {
                slot_minutes,
                slot_count,
            });
        }
        Ok(Self {
            slot_minutes,
            slot_count,
        })
    }

    /// Minutes per slot.
    #[must_use]
    pub const fn slot_minutes(&self) -> u16 {
        self.slot_minutes
    }

    /// Number of slots in a shift.
    #[must_use]
    pub const fn slot_count(&self) -> u16 {
        self.slot_count
    }

    /// Returns the slots of a shift starting at `start`.
    #[must_use]
    pub const fn slots(&self, start: Time) -> ShiftSlots {
        ShiftSlots::new(start, *self)
    }
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self::HOURLY_TWELVE_HOUR
    }
}

/// Ordered, finite iterator over the slots of one shift.
///
/// Iteration is deterministic: `SlotPolicy::slots` always yields the same
/// sequence for the same start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSlots {
    start: Time,
    policy: SlotPolicy,
    index: u16,
}

impl ShiftSlots {
    /// Creates an iterator positioned at the first slot.
    #[must_use]
    pub const fn new(start: Time, policy: SlotPolicy) -> Self {
        Self {
            start,
            policy,
            index: 0,
        }
    }

    fn slot_at(&self, index: u16) -> Time {
        let offset: Duration =
            Duration::minutes(i64::from(self.policy.slot_minutes) * i64::from(index));
        // Time + Duration wraps at midnight.
        self.start + offset
    }
}

impl Iterator for ShiftSlots {
    type Item = Time;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.policy.slot_count {
            return None;
        }
        let slot: Time = self.slot_at(self.index);
        self.index += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining: usize = usize::from(self.policy.slot_count.saturating_sub(self.index));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ShiftSlots {}

/// Generates every slot of a shift starting at `start`.
#[must_use]
pub fn generate_slots(start: Time, policy: SlotPolicy) -> Vec<Time> {
    policy.slots(start).collect()
}

/// Returns the zero-based position of `slot` within the shift, if it is one.
///
/// Positions follow shift order, so for a night shift `00:00` sorts after
/// `23:00`.
#[must_use]
pub fn slot_position(start: Time, slot: Time, policy: SlotPolicy) -> Option<u16> {
    let offset: i64 = (seconds_of_day(slot) - seconds_of_day(start)).rem_euclid(SECONDS_PER_DAY);
    let step: i64 = i64::from(policy.slot_minutes) * 60;

    if offset % step != 0 {
        return None;
    }

    u16::try_from(offset / step)
        .ok()
        .filter(|position| *position < policy.slot_count)
}

/// Start time used when a care home has not configured one.
#[must_use]
pub const fn default_shift_start(kind: ShiftKind) -> Time {
    match kind {
        ShiftKind::Morning => time!(08:00),
        ShiftKind::Night => time!(20:00),
    }
}

fn seconds_of_day(t: Time) -> i64 {
    i64::from(t.hour()) * 3_600 + i64::from(t.minute()) * 60 + i64::from(t.second())
}
