// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Calendar dates travel as `YYYY-MM-DD` strings, times of day as `HH:MM`
//! and timestamps as RFC 3339.

use carehome::{
    LogEntry, MissedShift, RotaCapabilities, RotaHeader, RotaShift, ShiftLog,
    ShiftLogCapabilities,
};
use carehome_audit::{ApprovalAction, RotaApproval, ShiftChange, ShiftChangeAction};
use carehome_domain::{RotaStatus, ShiftKind, ShiftLogStatus, format_date, format_time_of_day};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Shift logs
// ============================================================================

/// API request to open (get or create) the caller's shift log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenShiftLogRequest {
    /// The service user the log is about.
    pub service_user_id: i64,
    /// The calendar date of the shift.
    pub date: String,
    /// `morning` or `night`.
    pub shift: String,
}

/// API request to write one time slot of a shift log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteEntryRequest {
    /// The slot's time of day.
    pub time_slot: String,
    /// The entry text.
    pub content: String,
}

/// A shift log header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLogInfo {
    /// The canonical identifier.
    pub shift_log_id: i64,
    /// The author.
    pub staff_id: i64,
    /// The care home.
    pub carehome_id: i64,
    /// The service user.
    pub service_user_id: i64,
    /// The shift date.
    pub date: String,
    /// The shift.
    pub shift: ShiftKind,
    /// The author's name when the log was opened.
    pub staff_name: String,
    /// Weekday of the shift date.
    pub day_of_week: String,
    /// Whether the log is still open for writing.
    pub status: ShiftLogStatus,
    /// When the log was last locked.
    #[serde(with = "time::serde::rfc3339::option")]
    pub locked_at: Option<OffsetDateTime>,
}

impl From<&ShiftLog> for ShiftLogInfo {
    fn from(log: &ShiftLog) -> Self {
        Self {
            shift_log_id: log.shift_log_id,
            staff_id: log.key.staff_id,
            carehome_id: log.key.carehome_id,
            service_user_id: log.key.service_user_id,
            date: format_date(log.key.date),
            shift: log.key.shift,
            staff_name: log.staff_name.clone(),
            day_of_week: log.day_of_week.clone(),
            status: log.status,
            locked_at: log.locked_at,
        }
    }
}

/// One written time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntryInfo {
    /// The canonical identifier.
    pub log_entry_id: i64,
    /// `HH:MM`.
    pub time_slot: String,
    /// The entry text.
    pub content: String,
    /// Whether the entry is frozen.
    pub is_locked: bool,
    /// When the entry was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&LogEntry> for LogEntryInfo {
    fn from(entry: &LogEntry) -> Self {
        Self {
            log_entry_id: entry.log_entry_id,
            time_slot: format_time_of_day(entry.time_slot),
            content: entry.content.clone(),
            is_locked: entry.is_locked,
            updated_at: entry.updated_at,
        }
    }
}

/// A shift log with its slots, entries and what the caller may do with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLogResponse {
    /// The log header.
    pub shift_log: ShiftLogInfo,
    /// Every slot of the shift in order, written or not.
    pub slots: Vec<String>,
    /// Written entries in shift order.
    pub entries: Vec<LogEntryInfo>,
    /// The caller's capabilities on this log.
    pub capabilities: ShiftLogCapabilities,
}

/// API response for opening a shift log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenShiftLogResponse {
    /// True if this request created the log.
    pub created: bool,
    /// Missed-shift records cleared by this log's existence.
    pub resolved_missed_shifts: usize,
    /// The log.
    #[serde(flatten)]
    pub log: ShiftLogResponse,
}

/// API response for a successful lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockShiftLogResponse {
    /// The locked log.
    pub shift_log: ShiftLogInfo,
    /// The stored document.
    pub document_id: i64,
    /// The document's file name.
    pub file_name: String,
    /// The document's media type.
    pub content_type: String,
}

/// A stored shift log document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftLogDocumentResponse {
    /// The document's file name.
    pub file_name: String,
    /// The document's media type.
    pub content_type: String,
    /// The rendered bytes.
    pub content: Vec<u8>,
}

// ============================================================================
// Missed shifts
// ============================================================================

/// API request to run the missed-shift sweep for one care home and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMissedShiftsRequest {
    /// The care home to sweep.
    pub carehome_id: i64,
    /// The day to sweep. Defaults to today in the server's time zone.
    #[serde(default)]
    pub date: Option<String>,
}

/// API request to clear missed-shift records once a log exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveMissedShiftsRequest {
    /// The care home.
    pub carehome_id: i64,
    /// The service user.
    pub service_user_id: i64,
    /// The day.
    pub date: String,
}

/// A missed-shift record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedShiftInfo {
    /// The canonical identifier.
    pub missed_shift_id: i64,
    /// The service user without a log.
    pub service_user_id: i64,
    /// The day.
    pub date: String,
    /// The shift without a log.
    pub shift: ShiftKind,
    /// Whether managers have been told.
    pub is_notified: bool,
}

impl From<&MissedShift> for MissedShiftInfo {
    fn from(missed: &MissedShift) -> Self {
        Self {
            missed_shift_id: missed.missed_shift_id,
            service_user_id: missed.service_user_id,
            date: format_date(missed.date),
            shift: missed.shift,
            is_notified: missed.is_notified,
        }
    }
}

/// API response for a missed-shift sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMissedShiftsResponse {
    /// The care home swept.
    pub carehome_id: i64,
    /// The day swept.
    pub date: String,
    /// Unresolved records for the day after the sweep.
    pub missed: Vec<MissedShiftInfo>,
    /// Notifications dispatched by this sweep.
    pub notified: usize,
}

/// API response for clearing missed-shift records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveMissedShiftsResponse {
    /// Records cleared.
    pub resolved: usize,
}

// ============================================================================
// Rotas
// ============================================================================

/// API request to start a rota for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRotaRequest {
    /// The care home.
    pub carehome_id: i64,
    /// First day of the period.
    pub period_start: String,
    /// Last day of the period.
    pub period_end: String,
}

/// API request to create or update one shift of a rota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveShiftRequest {
    /// Set to update an existing shift.
    #[serde(default)]
    pub shift_id: Option<i64>,
    /// The shift date.
    pub shift_date: String,
    /// `morning` or `night`.
    pub shift_type: String,
    /// The assigned staff member.
    #[serde(default)]
    pub staff_id: Option<i64>,
    /// The assigned service user.
    #[serde(default)]
    pub service_user_id: Option<i64>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// API request to publish a rota.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRotaRequest {
    /// Who to notify. Defaults to everyone on the rota.
    #[serde(default)]
    pub notify: Option<String>,
}

/// API request to return a rota to its team lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRotaRequest {
    /// What needs changing.
    #[serde(default)]
    pub message: Option<String>,
}

/// A rota header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaInfo {
    pub rota_id: i64,
    pub carehome_id: i64,
    pub period_start: String,
    pub period_end: String,
    pub version: i32,
    pub status: RotaStatus,
    pub created_by: Option<i64>,
    pub published_by: Option<i64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

impl From<&RotaHeader> for RotaInfo {
    fn from(rota: &RotaHeader) -> Self {
        Self {
            rota_id: rota.rota_id,
            carehome_id: rota.carehome_id,
            period_start: format_date(rota.period_start),
            period_end: format_date(rota.period_end),
            version: rota.version,
            status: rota.status,
            created_by: rota.created_by,
            published_by: rota.published_by,
            published_at: rota.published_at,
        }
    }
}

/// One rota shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftInfo {
    pub shift_id: i64,
    pub shift_date: String,
    pub shift_type: ShiftKind,
    pub staff_id: Option<i64>,
    pub service_user_id: Option<i64>,
    pub notes: String,
}

impl From<&RotaShift> for ShiftInfo {
    fn from(shift: &RotaShift) -> Self {
        Self {
            shift_id: shift.shift_id,
            shift_date: format_date(shift.shift_date),
            shift_type: shift.shift_type,
            staff_id: shift.staff_id,
            service_user_id: shift.service_user_id,
            notes: shift.notes.clone(),
        }
    }
}

/// One approval trail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalInfo {
    pub action: ApprovalAction,
    pub by_staff_id: Option<i64>,
    pub by_name: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl From<&RotaApproval> for ApprovalInfo {
    fn from(approval: &RotaApproval) -> Self {
        Self {
            action: approval.action,
            by_staff_id: approval.actor.staff_id,
            by_name: approval.actor.display_name.clone(),
            message: approval.message.clone(),
            recorded_at: approval.recorded_at,
        }
    }
}

/// One shift change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftChangeInfo {
    pub shift_id: i64,
    pub action: ShiftChangeAction,
    pub changed_by: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl From<&ShiftChange> for ShiftChangeInfo {
    fn from(change: &ShiftChange) -> Self {
        Self {
            shift_id: change.shift_id,
            action: change.action,
            changed_by: change.changed_by,
            recorded_at: change.recorded_at,
        }
    }
}

/// A rota with what the caller may do with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaResponse {
    /// The rota header.
    pub rota: RotaInfo,
    /// The caller's capabilities on this rota.
    pub capabilities: RotaCapabilities,
}

/// A rota with its shifts and audit trails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaDetailResponse {
    /// The rota header.
    pub rota: RotaInfo,
    /// Shifts ordered by date and shift.
    pub shifts: Vec<ShiftInfo>,
    /// Approval trail, oldest first.
    pub approvals: Vec<ApprovalInfo>,
    /// Shift change trail, oldest first.
    pub changes: Vec<ShiftChangeInfo>,
    /// The caller's capabilities on this rota.
    pub capabilities: RotaCapabilities,
}

/// API response for a rota status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaTransitionResponse {
    /// The rota after the transition.
    pub rota: RotaInfo,
    /// The status before the transition.
    pub previous_status: RotaStatus,
    /// The appended approval record.
    pub approval: ApprovalInfo,
    /// Notifications dispatched after commit.
    pub notified: usize,
}
