// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift log mutations.
//!
//! A shift log is unique per key; the `shift_logs` unique constraint is the
//! only guard against two staff starting the same shift at once, and a
//! violation surfaces as `CoreError::DuplicateAggregate`. Entries are unique
//! per key and slot and are written with an upsert, so concurrent writes to
//! the same slot are last-write-wins.

use carehome::{
    CoreError, DocumentRenderer, LogEntry, ShiftLog, ShiftLogDocument, ShiftLogKey,
    document_file_name, prepare_entry_write, prepare_lock, validate_slot,
};
use carehome_domain::{
    ShiftLogStatus, SlotPolicy, day_of_week, staff_display_name, staff_initials,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error};
use time::{OffsetDateTime, Time};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::columns::{encode_bool, encode_date, encode_time, encode_timestamp};
use crate::data_models::{ServiceUserData, ShiftLogDocumentData, StaffData};
use crate::diesel_schema::{log_entries, shift_log_documents, shift_logs};
use crate::error::PersistenceError;
use crate::mutations::constraint_error;
use crate::queries::directory::{get_service_user, require_carehome, require_staff};
use crate::queries::shift_logs::{
    find_log_entry, find_shift_log, get_shift_log_document, list_log_entries, require_shift_log,
};

/// Initials used when a staff member has no usable name.
pub const SYSTEM_INITIALS: &str = "SYS";

/// Creates the shift log for `key`.
///
/// The staff display name and weekday are taken from the staff row and the
/// date, never from the caller. Orphan entries already written for the key
/// are linked to the new log.
///
/// # Errors
///
/// Returns an error if:
/// - A shift log already exists for the key (`DuplicateAggregate`)
/// - The staff member, care home or service user does not exist
/// - The service user belongs to another care home
pub fn create_shift_log(
    conn: &mut SqliteConnection,
    key: &ShiftLogKey,
    now: OffsetDateTime,
) -> Result<ShiftLog, PersistenceError> {
    let staff: StaffData = require_staff(conn, key.staff_id)?;
    require_carehome(conn, key.carehome_id)?;
    let service_user: Option<ServiceUserData> = get_service_user(conn, key.service_user_id)?;
    if service_user.is_none_or(|su| su.carehome_id != key.carehome_id) {
        return Err(PersistenceError::NotFound(format!(
            "Service user {} at care home {}",
            key.service_user_id, key.carehome_id
        )));
    }

    let staff_name: String =
        staff_display_name(&staff.first_name, &staff.last_name, &staff.login_name);
    let timestamp: String = encode_timestamp(now)?;

    let inserted: Result<usize, Error> = diesel::insert_into(shift_logs::table)
        .values((
            shift_logs::staff_id.eq(key.staff_id),
            shift_logs::carehome_id.eq(key.carehome_id),
            shift_logs::service_user_id.eq(key.service_user_id),
            shift_logs::log_date.eq(encode_date(key.date)),
            shift_logs::shift.eq(key.shift.as_str()),
            shift_logs::staff_name.eq(&staff_name),
            shift_logs::day_of_week.eq(day_of_week(key.date)),
            shift_logs::status.eq(ShiftLogStatus::Incomplete.as_str()),
            shift_logs::created_at.eq(&timestamp),
            shift_logs::updated_at.eq(&timestamp),
        ))
        .execute(conn);

    match inserted {
        Ok(_) => {}
        Err(Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(CoreError::DuplicateAggregate(*key).into());
        }
        Err(e) => return Err(constraint_error(e, "Shift log")),
    }

    let shift_log_id: i64 = conn.get_last_insert_rowid()?;
    let relinked: usize = relink_orphan_entries(conn, shift_log_id, key)?;
    info!(shift_log_id, relinked, "Created shift log for {}", key);

    require_shift_log(conn, shift_log_id)
}

/// Returns the shift log for `key`, creating it if needed.
///
/// The second value is true if this call created the log. If another writer
/// creates the log between the lookup and the insert, the existing log is
/// returned.
///
/// # Errors
///
/// Returns an error if the log cannot be created; see `create_shift_log`.
pub fn get_or_create_shift_log(
    conn: &mut SqliteConnection,
    key: &ShiftLogKey,
    now: OffsetDateTime,
) -> Result<(ShiftLog, bool), PersistenceError> {
    if let Some(existing) = find_shift_log(conn, key)? {
        debug!(shift_log_id = existing.shift_log_id, "Found existing shift log");
        return Ok((existing, false));
    }

    match create_shift_log(conn, key, now) {
        Ok(created) => Ok((created, true)),
        Err(PersistenceError::Rejected(CoreError::DuplicateAggregate(_))) => {
            let existing: ShiftLog = find_shift_log(conn, key)?
                .ok_or_else(|| PersistenceError::NotFound(format!("Shift log for {key}")))?;
            Ok((existing, false))
        }
        Err(e) => Err(e),
    }
}

/// Links entries written for `key` before its shift log existed.
///
/// # Returns
///
/// The number of entries linked.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn relink_orphan_entries(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
    key: &ShiftLogKey,
) -> Result<usize, PersistenceError> {
    let relinked: usize = diesel::update(log_entries::table)
        .filter(log_entries::staff_id.eq(key.staff_id))
        .filter(log_entries::carehome_id.eq(key.carehome_id))
        .filter(log_entries::service_user_id.eq(key.service_user_id))
        .filter(log_entries::log_date.eq(encode_date(key.date)))
        .filter(log_entries::shift.eq(key.shift.as_str()))
        .filter(log_entries::shift_log_id.is_null())
        .set(log_entries::shift_log_id.eq(Some(shift_log_id)))
        .execute(conn)?;

    if relinked > 0 {
        info!(shift_log_id, relinked, "Linked orphan log entries");
    }
    Ok(relinked)
}

/// Returns the entry for one slot, creating an empty one if needed.
///
/// The entry is linked to the key's shift log when one exists and left
/// orphaned otherwise.
///
/// # Errors
///
/// Returns an error if:
/// - The slot is not part of the shift
/// - The entry does not exist and the shift log is locked
pub fn get_or_create_entry(
    conn: &mut SqliteConnection,
    key: &ShiftLogKey,
    slot: Time,
    shift_start: Time,
    policy: SlotPolicy,
    now: OffsetDateTime,
) -> Result<LogEntry, PersistenceError> {
    validate_slot(key.shift, shift_start, slot, policy)?;

    if let Some(existing) = find_log_entry(conn, key, slot)? {
        return Ok(existing);
    }

    let log: Option<ShiftLog> = find_shift_log(conn, key)?;
    if let Some(log) = &log {
        log.ensure_writable()?;
    }

    let timestamp: String = encode_timestamp(now)?;
    diesel::insert_or_ignore_into(log_entries::table)
        .values((
            log_entries::staff_id.eq(key.staff_id),
            log_entries::carehome_id.eq(key.carehome_id),
            log_entries::service_user_id.eq(key.service_user_id),
            log_entries::log_date.eq(encode_date(key.date)),
            log_entries::shift.eq(key.shift.as_str()),
            log_entries::time_slot.eq(encode_time(slot)),
            log_entries::content.eq(""),
            log_entries::is_locked.eq(encode_bool(false)),
            log_entries::shift_log_id.eq(log.as_ref().map(|l| l.shift_log_id)),
            log_entries::created_at.eq(&timestamp),
            log_entries::updated_at.eq(&timestamp),
        ))
        .execute(conn)
        .map_err(|e| constraint_error(e, "Log entry"))?;

    debug!("Created log entry for {} at {}", key, encode_time(slot));

    find_log_entry(conn, key, slot)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Log entry for {key}")))
}

/// Writes the content of one slot of a shift log.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `shift_log_id` - The shift log being written to
/// * `slot` - The slot's time of day
/// * `content` - The entry text; surrounding whitespace is dropped
/// * `shift_start` - When the log's shift starts at its care home
/// * `policy` - How shifts are divided into slots
/// * `now` - Write time
///
/// # Errors
///
/// Returns an error if:
/// - The shift log does not exist
/// - The shift log is locked (`LockedAggregate`)
/// - The slot is not part of the shift or the content is empty
pub fn touch_entry(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
    slot: Time,
    content: &str,
    shift_start: Time,
    policy: SlotPolicy,
    now: OffsetDateTime,
) -> Result<LogEntry, PersistenceError> {
    let log: ShiftLog = require_shift_log(conn, shift_log_id)?;
    let content: String = prepare_entry_write(&log, slot, content, shift_start, policy)?;
    let timestamp: String = encode_timestamp(now)?;
    let key: ShiftLogKey = log.key;

    diesel::insert_into(log_entries::table)
        .values((
            log_entries::staff_id.eq(key.staff_id),
            log_entries::carehome_id.eq(key.carehome_id),
            log_entries::service_user_id.eq(key.service_user_id),
            log_entries::log_date.eq(encode_date(key.date)),
            log_entries::shift.eq(key.shift.as_str()),
            log_entries::time_slot.eq(encode_time(slot)),
            log_entries::content.eq(&content),
            log_entries::is_locked.eq(encode_bool(false)),
            log_entries::shift_log_id.eq(Some(shift_log_id)),
            log_entries::created_at.eq(&timestamp),
            log_entries::updated_at.eq(&timestamp),
        ))
        .on_conflict((
            log_entries::staff_id,
            log_entries::carehome_id,
            log_entries::service_user_id,
            log_entries::log_date,
            log_entries::shift,
            log_entries::time_slot,
        ))
        .do_update()
        .set((
            log_entries::content.eq(&content),
            log_entries::shift_log_id.eq(Some(shift_log_id)),
            log_entries::updated_at.eq(&timestamp),
        ))
        .execute(conn)?;

    diesel::update(shift_logs::table)
        .filter(shift_logs::shift_log_id.eq(shift_log_id))
        .set(shift_logs::updated_at.eq(&timestamp))
        .execute(conn)?;

    info!(shift_log_id, slot = %encode_time(slot), "Wrote log entry");

    find_log_entry(conn, &key, slot)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Log entry for {key}")))
}

/// Derives the initials printed on a shift log's document.
///
/// Falls back to `SYSTEM_INITIALS` when the staff member has no usable name.
///
/// # Errors
///
/// Returns an error if the staff member cannot be loaded.
pub fn staff_initials_for(
    conn: &mut SqliteConnection,
    log: &ShiftLog,
) -> Result<String, PersistenceError> {
    let staff: StaffData = require_staff(conn, log.key.staff_id)?;
    let initials: String = staff_initials(&staff.first_name, &staff.last_name, &staff.login_name);
    if initials.is_empty() {
        Ok(SYSTEM_INITIALS.to_string())
    } else {
        Ok(initials)
    }
}

/// Locks a shift log and stores its document.
///
/// In order: links orphan entries, locks every entry, marks the log locked,
/// renders the document and replaces any earlier document. The caller runs
/// this in one transaction, so a render failure leaves nothing locked.
///
/// # Errors
///
/// Returns an error if:
/// - The shift log does not exist
/// - The shift log is already locked (`LockedAggregate`)
/// - The shift log has no entries (`EmptyAggregate`)
/// - The renderer fails (`Render`)
pub fn lock_shift_log(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
    renderer: &dyn DocumentRenderer,
    shift_start: Time,
    policy: SlotPolicy,
    now: OffsetDateTime,
) -> Result<(ShiftLog, ShiftLogDocumentData), PersistenceError> {
    let log: ShiftLog = require_shift_log(conn, shift_log_id)?;
    log.ensure_lockable()?;

    relink_orphan_entries(conn, shift_log_id, &log.key)?;
    let entries: Vec<LogEntry> = list_log_entries(conn, shift_log_id, shift_start, policy)?;
    let initials: String = staff_initials_for(conn, &log)?;
    let document: ShiftLogDocument = prepare_lock(&log, &entries, &initials, shift_start, policy)?;
    let timestamp: String = encode_timestamp(now)?;

    let locked_entries: usize = diesel::update(log_entries::table)
        .filter(log_entries::shift_log_id.eq(shift_log_id))
        .set((
            log_entries::is_locked.eq(encode_bool(true)),
            log_entries::updated_at.eq(&timestamp),
        ))
        .execute(conn)?;

    diesel::update(shift_logs::table)
        .filter(shift_logs::shift_log_id.eq(shift_log_id))
        .set((
            shift_logs::status.eq(ShiftLogStatus::Locked.as_str()),
            shift_logs::locked_at.eq(Some(timestamp.clone())),
            shift_logs::updated_at.eq(&timestamp),
        ))
        .execute(conn)?;

    let content: Vec<u8> = document.render(renderer).map_err(CoreError::from)?;
    let file_name: String = document_file_name(shift_log_id, now, renderer.file_extension());

    diesel::delete(shift_log_documents::table)
        .filter(shift_log_documents::shift_log_id.eq(shift_log_id))
        .execute(conn)?;

    diesel::insert_into(shift_log_documents::table)
        .values((
            shift_log_documents::shift_log_id.eq(shift_log_id),
            shift_log_documents::file_name.eq(&file_name),
            shift_log_documents::content_type.eq(renderer.content_type()),
            shift_log_documents::content.eq(&content),
            shift_log_documents::created_at.eq(&timestamp),
        ))
        .execute(conn)?;

    info!(
        shift_log_id,
        locked_entries,
        file_name = %file_name,
        "Locked shift log"
    );

    let locked: ShiftLog = require_shift_log(conn, shift_log_id)?;
    let stored: ShiftLogDocumentData = get_shift_log_document(conn, shift_log_id)?
        .ok_or_else(|| {
            PersistenceError::NotFound(format!("Document of shift log {shift_log_id}"))
        })?;
    Ok((locked, stored))
}

/// Reopens a locked shift log so its entries can be written again.
///
/// The stored document is kept until the next lock replaces it.
///
/// # Errors
///
/// Returns an error if the shift log does not exist or is not locked
/// (`NotLocked`).
pub fn reopen_shift_log(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
    now: OffsetDateTime,
) -> Result<ShiftLog, PersistenceError> {
    let log: ShiftLog = require_shift_log(conn, shift_log_id)?;
    log.ensure_reopenable()?;
    let timestamp: String = encode_timestamp(now)?;

    diesel::update(log_entries::table)
        .filter(log_entries::shift_log_id.eq(shift_log_id))
        .set((
            log_entries::is_locked.eq(encode_bool(false)),
            log_entries::updated_at.eq(&timestamp),
        ))
        .execute(conn)?;

    diesel::update(shift_logs::table)
        .filter(shift_logs::shift_log_id.eq(shift_log_id))
        .set((
            shift_logs::status.eq(ShiftLogStatus::Incomplete.as_str()),
            shift_logs::locked_at.eq(None::<String>),
            shift_logs::updated_at.eq(&timestamp),
        ))
        .execute(conn)?;

    info!(shift_log_id, "Reopened shift log");
    require_shift_log(conn, shift_log_id)
}
