// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::rota_status::{RotaAction, RotaStatus};
use crate::types::ShiftKind;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Shift kind is not one of the known shifts.
    InvalidShiftKind(String),
    /// Shift log status string is not recognised.
    InvalidShiftLogStatus(String),
    /// Rota status string is not recognised.
    InvalidRotaStatus(String),
    /// Notify mode string is not recognised.
    InvalidNotifyMode(String),
    /// Staff role string is not recognised.
    InvalidRole(String),
    /// A name field is empty or invalid.
    InvalidName(String),
    /// A rota action was attempted from a state that does not permit it.
    InvalidTransition {
        /// The status the rota was in.
        from: RotaStatus,
        /// The action that was attempted.
        action: RotaAction,
    },
    /// The slot policy cannot describe a shift.
    InvalidSlotPolicy {
        /// Minutes per slot.
        slot_minutes: u16,
        /// Number of slots in a shift.
        slot_count: u16,
    },
    /// A time of day is not one of the slots of the shift.
    SlotOutsideShift {
        /// The shift being written to.
        shift: ShiftKind,
        /// The shift start time.
        shift_start: time::Time,
        /// The offending slot.
        slot: time::Time,
    },
    /// Log entry content is empty after trimming.
    EmptyLogContent,
    /// A rota period ends before it starts.
    InvalidRotaPeriod {
        /// First day of the period.
        period_start: time::Date,
        /// Last day of the period.
        period_end: time::Date,
    },
    /// The rota's shifts cannot be changed in its current status.
    RotaNotEditable {
        /// The rota identifier.
        rota_id: i64,
        /// The rota's current status.
        status: RotaStatus,
    },
    /// Failed to parse a calendar date.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a time of day.
    TimeParseError {
        /// The invalid time string.
        time_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidShiftKind(value) => write!(f, "Invalid shift kind: {value}"),
            Self::InvalidShiftLogStatus(value) => {
                write!(f, "Invalid shift log status: {value}")
            }
            Self::InvalidRotaStatus(value) => write!(f, "Invalid rota status: {value}"),
            Self::InvalidNotifyMode(value) => write!(f, "Invalid notify mode: {value}"),
            Self::InvalidRole(value) => write!(f, "Invalid role: {value}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidTransition { from, action } => {
                write!(
                    f,
                    "Cannot {} a rota in status '{}'",
                    action.as_str(),
                    from.as_str()
                )
            }
            Self::InvalidSlotPolicy {
                slot_minutes,
                slot_count,
            } => {
                write!(
                    f,
                    "Invalid slot policy: {slot_count} slots of {slot_minutes} minutes must be non-empty and fit within 24 hours"
                )
            }
            Self::SlotOutsideShift {
                shift,
                shift_start,
                slot,
            } => {
                write!(
                    f,
                    "Slot {} is not part of the {} shift starting at {}",
                    crate::format_time_of_day(*slot),
                    shift.as_str(),
                    crate::format_time_of_day(*shift_start)
                )
            }
            Self::EmptyLogContent => write!(f, "Log entry content cannot be empty"),
            Self::InvalidRotaPeriod {
                period_start,
                period_end,
            } => {
                write!(
                    f,
                    "Rota period ends ({}) before it starts ({})",
                    crate::format_date(*period_end),
                    crate::format_date(*period_start)
                )
            }
            Self::RotaNotEditable { rota_id, status } => {
                write!(
                    f,
                    "Shifts of rota {rota_id} cannot be changed while it is '{}'",
                    status.as_str()
                )
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimeParseError { time_string, error } => {
                write!(f, "Failed to parse time '{time_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
