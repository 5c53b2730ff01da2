// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift log, log entry and document queries.

use carehome::{LogEntry, ShiftLog, ShiftLogKey};
use carehome_domain::{ShiftKind, SlotPolicy, slot_position};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::{Date, Time};
use tracing::debug;

use crate::columns::{
    decode, decode_bool, decode_date, decode_optional_timestamp, decode_time, decode_timestamp,
    encode_date, encode_time,
};
use crate::data_models::ShiftLogDocumentData;
use crate::diesel_schema::{log_entries, shift_log_documents, shift_logs};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = shift_logs)]
struct ShiftLogRow {
    shift_log_id: i64,
    staff_id: i64,
    carehome_id: i64,
    service_user_id: i64,
    log_date: String,
    shift: String,
    staff_name: String,
    day_of_week: String,
    status: String,
    created_at: String,
    updated_at: String,
    locked_at: Option<String>,
}

impl TryFrom<ShiftLogRow> for ShiftLog {
    type Error = PersistenceError;

    fn try_from(row: ShiftLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            shift_log_id: row.shift_log_id,
            key: ShiftLogKey {
                staff_id: row.staff_id,
                carehome_id: row.carehome_id,
                service_user_id: row.service_user_id,
                date: decode_date(&row.log_date)?,
                shift: decode(&row.shift)?,
            },
            staff_name: row.staff_name,
            day_of_week: row.day_of_week,
            status: decode(&row.status)?,
            created_at: decode_timestamp(&row.created_at)?,
            updated_at: decode_timestamp(&row.updated_at)?,
            locked_at: decode_optional_timestamp(row.locked_at.as_deref())?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = log_entries)]
struct LogEntryRow {
    log_entry_id: i64,
    staff_id: i64,
    carehome_id: i64,
    service_user_id: i64,
    log_date: String,
    shift: String,
    time_slot: String,
    content: String,
    is_locked: i32,
    shift_log_id: Option<i64>,
    updated_at: String,
}

impl TryFrom<LogEntryRow> for LogEntry {
    type Error = PersistenceError;

    fn try_from(row: LogEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            log_entry_id: row.log_entry_id,
            shift_log_id: row.shift_log_id,
            key: ShiftLogKey {
                staff_id: row.staff_id,
                carehome_id: row.carehome_id,
                service_user_id: row.service_user_id,
                date: decode_date(&row.log_date)?,
                shift: decode(&row.shift)?,
            },
            time_slot: decode_time(&row.time_slot)?,
            content: row.content,
            is_locked: decode_bool(row.is_locked),
            updated_at: decode_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = shift_log_documents)]
struct DocumentRow {
    document_id: i64,
    shift_log_id: i64,
    file_name: String,
    content_type: String,
    content: Vec<u8>,
    created_at: String,
}

/// Retrieves a shift log by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the shift log does not exist.
pub fn get_shift_log(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
) -> Result<Option<ShiftLog>, PersistenceError> {
    debug!("Looking up shift log {}", shift_log_id);

    let result: Result<ShiftLogRow, diesel::result::Error> = shift_logs::table
        .filter(shift_logs::shift_log_id.eq(shift_log_id))
        .select(ShiftLogRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(ShiftLog::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Retrieves a shift log, failing if it does not exist.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the shift log does not exist.
pub fn require_shift_log(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
) -> Result<ShiftLog, PersistenceError> {
    get_shift_log(conn, shift_log_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Shift log {shift_log_id}")))
}

/// Finds the shift log with the given key.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no shift log has that key.
pub fn find_shift_log(
    conn: &mut SqliteConnection,
    key: &ShiftLogKey,
) -> Result<Option<ShiftLog>, PersistenceError> {
    debug!("Finding shift log for {}", key);

    let result: Result<ShiftLogRow, diesel::result::Error> = shift_logs::table
        .filter(shift_logs::staff_id.eq(key.staff_id))
        .filter(shift_logs::carehome_id.eq(key.carehome_id))
        .filter(shift_logs::service_user_id.eq(key.service_user_id))
        .filter(shift_logs::log_date.eq(encode_date(key.date)))
        .filter(shift_logs::shift.eq(key.shift.as_str()))
        .select(ShiftLogRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(ShiftLog::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Returns true if any staff member has a shift log for the service user
/// on the given date and shift.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn shift_log_exists(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    service_user_id: i64,
    date: Date,
    shift: ShiftKind,
) -> Result<bool, PersistenceError> {
    let count: i64 = shift_logs::table
        .filter(shift_logs::carehome_id.eq(carehome_id))
        .filter(shift_logs::service_user_id.eq(service_user_id))
        .filter(shift_logs::log_date.eq(encode_date(date)))
        .filter(shift_logs::shift.eq(shift.as_str()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Finds the entry for one slot of a shift, linked or not.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the slot has no entry yet.
pub fn find_log_entry(
    conn: &mut SqliteConnection,
    key: &ShiftLogKey,
    slot: Time,
) -> Result<Option<LogEntry>, PersistenceError> {
    let result: Result<LogEntryRow, diesel::result::Error> = log_entries::table
        .filter(log_entries::staff_id.eq(key.staff_id))
        .filter(log_entries::carehome_id.eq(key.carehome_id))
        .filter(log_entries::service_user_id.eq(key.service_user_id))
        .filter(log_entries::log_date.eq(encode_date(key.date)))
        .filter(log_entries::shift.eq(key.shift.as_str()))
        .filter(log_entries::time_slot.eq(encode_time(slot)))
        .select(LogEntryRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(LogEntry::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lists the entries linked to a shift log in shift order.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `shift_log_id` - The shift log
/// * `shift_start` - When the log's shift starts
/// * `policy` - How the shift is divided into slots
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_log_entries(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
    shift_start: Time,
    policy: SlotPolicy,
) -> Result<Vec<LogEntry>, PersistenceError> {
    debug!("Listing entries of shift log {}", shift_log_id);

    let rows: Vec<LogEntryRow> = log_entries::table
        .filter(log_entries::shift_log_id.eq(shift_log_id))
        .select(LogEntryRow::as_select())
        .load(conn)?;

    let mut entries: Vec<LogEntry> = rows
        .into_iter()
        .map(LogEntry::try_from)
        .collect::<Result<_, _>>()?;
    entries.sort_by_key(|entry| {
        (
            slot_position(shift_start, entry.time_slot, policy).unwrap_or(u16::MAX),
            entry.time_slot,
        )
    });
    Ok(entries)
}

/// Retrieves the document stored for a shift log.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the shift log has never been locked.
pub fn get_shift_log_document(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
) -> Result<Option<ShiftLogDocumentData>, PersistenceError> {
    debug!("Looking up document of shift log {}", shift_log_id);

    let result: Result<DocumentRow, diesel::result::Error> = shift_log_documents::table
        .filter(shift_log_documents::shift_log_id.eq(shift_log_id))
        .select(DocumentRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(ShiftLogDocumentData {
            document_id: row.document_id,
            shift_log_id: row.shift_log_id,
            file_name: row.file_name,
            content_type: row.content_type,
            content: row.content,
            created_at: decode_timestamp(&row.created_at)?,
        })),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
