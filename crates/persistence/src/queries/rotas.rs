// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rota, shift and rota audit trail queries.

use carehome::{RotaHeader, RotaShift};
use carehome_audit::{Actor, RotaApproval, ShiftChange, ShiftSnapshot};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::Date;
use tracing::debug;

use crate::columns::{decode, decode_date, decode_optional_timestamp, decode_timestamp, encode_date};
use crate::diesel_schema::{rota_approvals, rotas, shift_change_logs, shifts};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = rotas)]
struct RotaRow {
    rota_id: i64,
    carehome_id: i64,
    period_start: String,
    period_end: String,
    version: i32,
    status: String,
    created_by: Option<i64>,
    updated_by: Option<i64>,
    published_by: Option<i64>,
    published_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RotaRow> for RotaHeader {
    type Error = PersistenceError;

    fn try_from(row: RotaRow) -> Result<Self, Self::Error> {
        Ok(Self {
            rota_id: row.rota_id,
            carehome_id: row.carehome_id,
            period_start: decode_date(&row.period_start)?,
            period_end: decode_date(&row.period_end)?,
            version: row.version,
            status: decode(&row.status)?,
            created_by: row.created_by,
            updated_by: row.updated_by,
            published_by: row.published_by,
            published_at: decode_optional_timestamp(row.published_at.as_deref())?,
            created_at: decode_timestamp(&row.created_at)?,
            updated_at: decode_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = shifts)]
struct ShiftRow {
    shift_id: i64,
    rota_id: i64,
    shift_date: String,
    shift_type: String,
    staff_id: Option<i64>,
    service_user_id: Option<i64>,
    notes: String,
    created_by: Option<i64>,
    updated_by: Option<i64>,
}

impl TryFrom<ShiftRow> for RotaShift {
    type Error = PersistenceError;

    fn try_from(row: ShiftRow) -> Result<Self, Self::Error> {
        Ok(Self {
            shift_id: row.shift_id,
            rota_id: row.rota_id,
            shift_date: decode_date(&row.shift_date)?,
            shift_type: decode(&row.shift_type)?,
            staff_id: row.staff_id,
            service_user_id: row.service_user_id,
            notes: row.notes,
            created_by: row.created_by,
            updated_by: row.updated_by,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = rota_approvals)]
struct ApprovalRow {
    approval_id: i64,
    rota_id: i64,
    action: String,
    by_staff_id: Option<i64>,
    by_name: String,
    message: String,
    created_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = shift_change_logs)]
struct ShiftChangeRow {
    change_id: i64,
    shift_id: i64,
    rota_id: i64,
    action: String,
    changed_by: Option<i64>,
    snapshot_json: String,
    changed_at: String,
}

/// Retrieves a rota by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the rota does not exist.
pub fn get_rota(
    conn: &mut SqliteConnection,
    rota_id: i64,
) -> Result<Option<RotaHeader>, PersistenceError> {
    debug!("Looking up rota {}", rota_id);

    let result: Result<RotaRow, diesel::result::Error> = rotas::table
        .filter(rotas::rota_id.eq(rota_id))
        .select(RotaRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(RotaHeader::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Retrieves a rota, failing if it does not exist.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the rota does not exist.
pub fn require_rota(
    conn: &mut SqliteConnection,
    rota_id: i64,
) -> Result<RotaHeader, PersistenceError> {
    get_rota(conn, rota_id)?.ok_or_else(|| PersistenceError::NotFound(format!("Rota {rota_id}")))
}

/// Returns the highest version of a care home's rota for a period.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no rota exists for the period.
pub fn latest_rota_version(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    period_start: Date,
) -> Result<Option<i32>, PersistenceError> {
    Ok(rotas::table
        .filter(rotas::carehome_id.eq(carehome_id))
        .filter(rotas::period_start.eq(encode_date(period_start)))
        .select(diesel::dsl::max(rotas::version))
        .first::<Option<i32>>(conn)?)
}

/// Retrieves one shift by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the shift does not exist.
pub fn get_shift(
    conn: &mut SqliteConnection,
    shift_id: i64,
) -> Result<Option<RotaShift>, PersistenceError> {
    let result: Result<ShiftRow, diesel::result::Error> = shifts::table
        .filter(shifts::shift_id.eq(shift_id))
        .select(ShiftRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(RotaShift::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lists a rota's shifts by date, then shift kind.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_shifts(
    conn: &mut SqliteConnection,
    rota_id: i64,
) -> Result<Vec<RotaShift>, PersistenceError> {
    debug!("Listing shifts of rota {}", rota_id);

    let rows: Vec<ShiftRow> = shifts::table
        .filter(shifts::rota_id.eq(rota_id))
        .order((
            shifts::shift_date.asc(),
            shifts::shift_type.asc(),
            shifts::shift_id.asc(),
        ))
        .select(ShiftRow::as_select())
        .load(conn)?;

    rows.into_iter().map(RotaShift::try_from).collect()
}

/// Lists a rota's approval trail, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_rota_approvals(
    conn: &mut SqliteConnection,
    rota_id: i64,
) -> Result<Vec<RotaApproval>, PersistenceError> {
    debug!("Listing approvals of rota {}", rota_id);

    let rows: Vec<ApprovalRow> = rota_approvals::table
        .filter(rota_approvals::rota_id.eq(rota_id))
        .order(rota_approvals::approval_id.asc())
        .select(ApprovalRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| -> Result<RotaApproval, PersistenceError> {
            Ok(RotaApproval::with_id(
                row.approval_id,
                row.rota_id,
                decode(&row.action)?,
                Actor {
                    staff_id: row.by_staff_id,
                    display_name: row.by_name,
                },
                row.message,
                decode_timestamp(&row.created_at)?,
            ))
        })
        .collect()
}

/// Lists the change history of every shift of a rota, oldest first.
///
/// Includes changes to shifts that have since been deleted.
///
/// # Errors
///
/// Returns an error if the database query fails or a snapshot cannot be
/// deserialized.
pub fn list_shift_changes(
    conn: &mut SqliteConnection,
    rota_id: i64,
) -> Result<Vec<ShiftChange>, PersistenceError> {
    debug!("Listing shift changes of rota {}", rota_id);

    let rows: Vec<ShiftChangeRow> = shift_change_logs::table
        .filter(shift_change_logs::rota_id.eq(rota_id))
        .order(shift_change_logs::change_id.asc())
        .select(ShiftChangeRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| -> Result<ShiftChange, PersistenceError> {
            let snapshot: ShiftSnapshot = serde_json::from_str(&row.snapshot_json)?;
            Ok(ShiftChange {
                change_id: Some(row.change_id),
                shift_id: row.shift_id,
                rota_id: row.rota_id,
                action: decode(&row.action)?,
                changed_by: row.changed_by,
                snapshot,
                recorded_at: decode_timestamp(&row.changed_at)?,
            })
        })
        .collect()
}
