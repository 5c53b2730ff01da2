// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome::MissedShift;
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::Date;
use tracing::debug;

use crate::columns::{
    decode, decode_bool, decode_date, decode_optional_timestamp, decode_timestamp, encode_date,
};
use crate::diesel_schema::missed_shifts;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = missed_shifts)]
struct MissedShiftRow {
    missed_shift_id: i64,
    carehome_id: i64,
    service_user_id: i64,
    log_date: String,
    shift: String,
    is_notified: i32,
    created_at: String,
    resolved_at: Option<String>,
}

impl TryFrom<MissedShiftRow> for MissedShift {
    type Error = PersistenceError;

    fn try_from(row: MissedShiftRow) -> Result<Self, Self::Error> {
        Ok(Self {
            missed_shift_id: row.missed_shift_id,
            carehome_id: row.carehome_id,
            service_user_id: row.service_user_id,
            date: decode_date(&row.log_date)?,
            shift: decode(&row.shift)?,
            is_notified: decode_bool(row.is_notified),
            created_at: decode_timestamp(&row.created_at)?,
            resolved_at: decode_optional_timestamp(row.resolved_at.as_deref())?,
        })
    }
}

/// Lists a care home's unresolved missed shifts, optionally for one date.
///
/// Records are ordered by date, service user and shift.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_unresolved_missed_shifts(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    date: Option<Date>,
) -> Result<Vec<MissedShift>, PersistenceError> {
    debug!("Listing unresolved missed shifts of care home {}", carehome_id);

    let mut query = missed_shifts::table
        .filter(missed_shifts::carehome_id.eq(carehome_id))
        .filter(missed_shifts::resolved_at.is_null())
        .into_boxed();
    if let Some(date) = date {
        query = query.filter(missed_shifts::log_date.eq(encode_date(date)));
    }

    let rows: Vec<MissedShiftRow> = query
        .order((
            missed_shifts::log_date.asc(),
            missed_shifts::service_user_id.asc(),
            missed_shifts::shift.asc(),
        ))
        .select(MissedShiftRow::as_select())
        .load(conn)?;

    rows.into_iter().map(MissedShift::try_from).collect()
}
