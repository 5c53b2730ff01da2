// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift log aggregate rules.
//!
//! A shift log is the per-shift record for one staff member and one service
//! user. It owns the log entries written for each slot of the shift. Once
//! locked, its entries are frozen until a manager or team lead reopens it.
//!
//! The functions here decide whether an operation may proceed and what it
//! produces; storage applies the result inside one transaction.

use carehome_domain::{
    DomainError, ShiftKind, ShiftLogStatus, SlotPolicy, format_date, format_time_of_day,
    slot_position, validate_log_content,
};
use time::{Date, OffsetDateTime, Time};

use crate::error::CoreError;
use crate::render::{DocumentEntry, ShiftLogDocument};

/// The identity of a shift log. At most one shift log exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShiftLogKey {
    pub staff_id: i64,
    pub carehome_id: i64,
    pub service_user_id: i64,
    pub date: Date,
    pub shift: ShiftKind,
}

impl std::fmt::Display for ShiftLogKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "staff {} / service user {} at care home {} on {} ({})",
            self.staff_id,
            self.service_user_id,
            self.carehome_id,
            format_date(self.date),
            self.shift
        )
    }
}

/// A shift log as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftLog {
    pub shift_log_id: i64,
    pub key: ShiftLogKey,
    /// Staff display name when the log was created.
    pub staff_name: String,
    /// Weekday of `key.date` when the log was created.
    pub day_of_week: String,
    pub status: ShiftLogStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub locked_at: Option<OffsetDateTime>,
}

impl ShiftLog {
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    /// Checks that entries may be written.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LockedAggregate` if the log is locked.
    pub const fn ensure_writable(&self) -> Result<(), CoreError> {
        if self.is_locked() {
            return Err(CoreError::LockedAggregate {
                shift_log_id: self.shift_log_id,
            });
        }
        Ok(())
    }

    /// Checks that the log may be locked.
    ///
    /// Locking moves incomplete to locked exactly once per open period.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LockedAggregate` if the log is already locked.
    pub const fn ensure_lockable(&self) -> Result<(), CoreError> {
        self.ensure_writable()
    }

    /// Checks that the log may be reopened.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotLocked` if the log is not locked.
    pub const fn ensure_reopenable(&self) -> Result<(), CoreError> {
        if !self.is_locked() {
            return Err(CoreError::NotLocked {
                shift_log_id: self.shift_log_id,
            });
        }
        Ok(())
    }
}

/// One slot's entry in a shift log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub log_entry_id: i64,
    /// `None` while the entry is not yet linked to its shift log.
    pub shift_log_id: Option<i64>,
    pub key: ShiftLogKey,
    pub time_slot: Time,
    pub content: String,
    pub is_locked: bool,
    pub updated_at: OffsetDateTime,
}

/// Checks that `slot` belongs to the shift starting at `shift_start`.
///
/// # Errors
///
/// Returns `DomainError::SlotOutsideShift` otherwise.
pub fn validate_slot(
    shift: ShiftKind,
    shift_start: Time,
    slot: Time,
    policy: SlotPolicy,
) -> Result<u16, CoreError> {
    slot_position(shift_start, slot, policy).ok_or(CoreError::DomainViolation(
        DomainError::SlotOutsideShift {
            shift,
            shift_start,
            slot,
        },
    ))
}

/// Validates an entry write and returns the content to store.
///
/// # Arguments
///
/// * `log` - The shift log being written to
/// * `slot` - The slot's time of day
/// * `content` - The text supplied by the writer
/// * `shift_start` - When the log's shift starts at its care home
/// * `policy` - How shifts are divided into slots
///
/// # Errors
///
/// Returns an error if:
/// - The log is locked (`LockedAggregate`)
/// - The slot is not part of the shift
/// - The content is empty after trimming
pub fn prepare_entry_write(
    log: &ShiftLog,
    slot: Time,
    content: &str,
    shift_start: Time,
    policy: SlotPolicy,
) -> Result<String, CoreError> {
    log.ensure_writable()?;
    validate_slot(log.key.shift, shift_start, slot, policy)?;
    let content: &str = validate_log_content(content)?;
    Ok(content.to_string())
}

/// Builds the document for a shift log that is about to be locked.
///
/// Entries are ordered by their position in the shift, so a night shift
/// reads 20:00 through 23:00 and then 00:00 onwards.
///
/// # Errors
///
/// Returns an error if:
/// - The log is already locked (`LockedAggregate`)
/// - The log has no entries (`EmptyAggregate`)
pub fn prepare_lock(
    log: &ShiftLog,
    entries: &[LogEntry],
    staff_initials: &str,
    shift_start: Time,
    policy: SlotPolicy,
) -> Result<ShiftLogDocument, CoreError> {
    log.ensure_lockable()?;

    if entries.is_empty() {
        return Err(CoreError::EmptyAggregate {
            shift_log_id: log.shift_log_id,
        });
    }

    let mut ordered: Vec<&LogEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| {
        (
            slot_position(shift_start, entry.time_slot, policy).unwrap_or(u16::MAX),
            entry.time_slot,
        )
    });

    Ok(ShiftLogDocument {
        shift_log_id: log.shift_log_id,
        carehome_id: log.key.carehome_id,
        service_user_id: log.key.service_user_id,
        staff_name: log.staff_name.clone(),
        staff_initials: staff_initials.to_string(),
        date: format_date(log.key.date),
        day_of_week: log.day_of_week.clone(),
        shift: log.key.shift,
        entries: ordered
            .into_iter()
            .map(|entry| DocumentEntry {
                time_slot: format_time_of_day(entry.time_slot),
                content: entry.content.clone(),
            })
            .collect(),
    })
}

/// Names the stored document for a shift log locked at `now`.
///
/// Produces `log_pdfs/log_{id}_{YYYYmmdd_HHMMSS}.{extension}`.
#[must_use]
pub fn document_file_name(shift_log_id: i64, now: OffsetDateTime, extension: &str) -> String {
    format!(
        "log_pdfs/log_{shift_log_id}_{:04}{:02}{:02}_{:02}{:02}{:02}.{extension}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
