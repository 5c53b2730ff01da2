// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Missed shift sweep.

use carehome::{MissedShift, expected_shifts};
use carehome_domain::ShiftKind;
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::{Date, OffsetDateTime};
use tracing::info;

use crate::columns::{encode_bool, encode_date, encode_timestamp};
use crate::data_models::ServiceUserData;
use crate::diesel_schema::missed_shifts;
use crate::error::PersistenceError;
use crate::queries::directory::{list_service_users, require_carehome};
use crate::queries::missed_shifts::list_unresolved_missed_shifts;
use crate::queries::shift_logs::shift_log_exists;

/// Records every morning and night shift of `date` that has no shift log.
///
/// Records that already exist are left alone, so the sweep can run any
/// number of times for the same day.
///
/// # Returns
///
/// The care home's unresolved missed shifts for `date`.
///
/// # Errors
///
/// Returns an error if the care home does not exist or a query fails.
pub fn scan_missed_shifts(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    date: Date,
    now: OffsetDateTime,
) -> Result<Vec<MissedShift>, PersistenceError> {
    require_carehome(conn, carehome_id)?;
    let service_users: Vec<ServiceUserData> = list_service_users(conn, carehome_id)?;
    let ids: Vec<i64> = service_users.iter().map(|su| su.service_user_id).collect();
    let timestamp: String = encode_timestamp(now)?;

    let mut recorded: usize = 0;
    for (service_user_id, shift) in expected_shifts(&ids) {
        if shift_log_exists(conn, carehome_id, service_user_id, date, shift)? {
            continue;
        }
        recorded +=
            record_missed_shift(conn, carehome_id, service_user_id, date, shift, &timestamp)?;
    }

    info!(
        carehome_id,
        date = %encode_date(date),
        service_users = ids.len(),
        recorded,
        "Scanned for missed shifts"
    );

    list_unresolved_missed_shifts(conn, carehome_id, Some(date))
}

fn record_missed_shift(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    service_user_id: i64,
    date: Date,
    shift: ShiftKind,
    timestamp: &str,
) -> Result<usize, PersistenceError> {
    Ok(diesel::insert_or_ignore_into(missed_shifts::table)
        .values((
            missed_shifts::carehome_id.eq(carehome_id),
            missed_shifts::service_user_id.eq(service_user_id),
            missed_shifts::log_date.eq(encode_date(date)),
            missed_shifts::shift.eq(shift.as_str()),
            missed_shifts::is_notified.eq(encode_bool(false)),
            missed_shifts::created_at.eq(timestamp),
        ))
        .execute(conn)?)
}

/// Resolves a service user's unresolved missed shifts for a date.
///
/// # Returns
///
/// The number of records resolved.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn resolve_missed_shifts(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    service_user_id: i64,
    date: Date,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let resolved: usize = diesel::update(missed_shifts::table)
        .filter(missed_shifts::carehome_id.eq(carehome_id))
        .filter(missed_shifts::service_user_id.eq(service_user_id))
        .filter(missed_shifts::log_date.eq(encode_date(date)))
        .filter(missed_shifts::resolved_at.is_null())
        .set(missed_shifts::resolved_at.eq(Some(encode_timestamp(now)?)))
        .execute(conn)?;

    if resolved > 0 {
        info!(
            carehome_id,
            service_user_id,
            date = %encode_date(date),
            resolved,
            "Resolved missed shifts"
        );
    }
    Ok(resolved)
}

/// Flags missed shift records as notified.
///
/// # Returns
///
/// The number of records newly flagged.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn mark_missed_shifts_notified(
    conn: &mut SqliteConnection,
    missed_shift_ids: &[i64],
) -> Result<usize, PersistenceError> {
    if missed_shift_ids.is_empty() {
        return Ok(0);
    }

    let marked: usize = diesel::update(missed_shifts::table)
        .filter(missed_shifts::missed_shift_id.eq_any(missed_shift_ids))
        .filter(missed_shifts::is_notified.eq(encode_bool(false)))
        .set(missed_shifts::is_notified.eq(encode_bool(true)))
        .execute(conn)?;

    info!(marked, "Marked missed shifts notified");
    Ok(marked)
}
