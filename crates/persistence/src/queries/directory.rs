// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Care home, staff and service user lookups.

use carehome_domain::{ShiftKind, default_shift_start};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::Time;
use tracing::debug;

use crate::columns::{decode, decode_bool, decode_time, decode_timestamp};
use crate::data_models::{CarehomeData, ServiceUserData, StaffData};
use crate::diesel_schema::{carehome_managers, carehomes, service_users, staff};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = carehomes)]
struct CarehomeRow {
    carehome_id: i64,
    name: String,
    postcode: String,
    morning_shift_start: Option<String>,
    night_shift_start: Option<String>,
    created_at: String,
}

impl TryFrom<CarehomeRow> for CarehomeData {
    type Error = PersistenceError;

    fn try_from(row: CarehomeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            carehome_id: row.carehome_id,
            name: row.name,
            postcode: row.postcode,
            morning_shift_start: row
                .morning_shift_start
                .as_deref()
                .map(decode_time)
                .transpose()?,
            night_shift_start: row
                .night_shift_start
                .as_deref()
                .map(decode_time)
                .transpose()?,
            created_at: decode_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = staff)]
struct StaffRow {
    staff_id: i64,
    login_name: String,
    first_name: String,
    last_name: String,
    role: String,
    carehome_id: Option<i64>,
    is_superuser: i32,
    is_active: i32,
    created_at: String,
}

impl TryFrom<StaffRow> for StaffData {
    type Error = PersistenceError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(Self {
            staff_id: row.staff_id,
            login_name: row.login_name,
            first_name: row.first_name,
            last_name: row.last_name,
            role: decode(&row.role)?,
            carehome_id: row.carehome_id,
            is_superuser: decode_bool(row.is_superuser),
            is_active: decode_bool(row.is_active),
            created_at: decode_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = service_users)]
struct ServiceUserRow {
    service_user_id: i64,
    carehome_id: i64,
    first_name: String,
    last_name: String,
    created_at: String,
}

impl TryFrom<ServiceUserRow> for ServiceUserData {
    type Error = PersistenceError;

    fn try_from(row: ServiceUserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            service_user_id: row.service_user_id,
            carehome_id: row.carehome_id,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: decode_timestamp(&row.created_at)?,
        })
    }
}

/// Retrieves a care home by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the care home does not exist.
pub fn get_carehome(
    conn: &mut SqliteConnection,
    carehome_id: i64,
) -> Result<Option<CarehomeData>, PersistenceError> {
    debug!("Looking up care home {}", carehome_id);

    let result: Result<CarehomeRow, diesel::result::Error> = carehomes::table
        .filter(carehomes::carehome_id.eq(carehome_id))
        .select(CarehomeRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(CarehomeData::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Retrieves a care home by its unique name.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no care home has that name.
pub fn find_carehome_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<CarehomeData>, PersistenceError> {
    debug!("Looking up care home named {}", name);

    let result: Result<CarehomeRow, diesel::result::Error> = carehomes::table
        .filter(carehomes::name.eq(name))
        .select(CarehomeRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(CarehomeData::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Retrieves a care home, failing if it does not exist.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the care home does not exist.
pub fn require_carehome(
    conn: &mut SqliteConnection,
    carehome_id: i64,
) -> Result<CarehomeData, PersistenceError> {
    get_carehome(conn, carehome_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Care home {carehome_id}")))
}

/// Retrieves a staff member by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the staff member does not exist.
pub fn get_staff(
    conn: &mut SqliteConnection,
    staff_id: i64,
) -> Result<Option<StaffData>, PersistenceError> {
    debug!("Looking up staff {}", staff_id);

    let result: Result<StaffRow, diesel::result::Error> = staff::table
        .filter(staff::staff_id.eq(staff_id))
        .select(StaffRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(StaffData::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Retrieves a staff member by login name.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no staff member uses that login.
pub fn find_staff_by_login(
    conn: &mut SqliteConnection,
    login_name: &str,
) -> Result<Option<StaffData>, PersistenceError> {
    debug!("Looking up staff login {}", login_name);

    let result: Result<StaffRow, diesel::result::Error> = staff::table
        .filter(staff::login_name.eq(login_name))
        .select(StaffRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(StaffData::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Retrieves a staff member, failing if they do not exist.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the staff member does not exist.
pub fn require_staff(
    conn: &mut SqliteConnection,
    staff_id: i64,
) -> Result<StaffData, PersistenceError> {
    get_staff(conn, staff_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Staff {staff_id}")))
}

/// Retrieves a service user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the service user does not exist.
pub fn get_service_user(
    conn: &mut SqliteConnection,
    service_user_id: i64,
) -> Result<Option<ServiceUserData>, PersistenceError> {
    debug!("Looking up service user {}", service_user_id);

    let result: Result<ServiceUserRow, diesel::result::Error> = service_users::table
        .filter(service_users::service_user_id.eq(service_user_id))
        .select(ServiceUserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(ServiceUserData::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lists the service users of a care home, ordered by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_service_users(
    conn: &mut SqliteConnection,
    carehome_id: i64,
) -> Result<Vec<ServiceUserData>, PersistenceError> {
    debug!("Listing service users of care home {}", carehome_id);

    let rows: Vec<ServiceUserRow> = service_users::table
        .filter(service_users::carehome_id.eq(carehome_id))
        .order(service_users::service_user_id.asc())
        .select(ServiceUserRow::as_select())
        .load(conn)?;

    rows.into_iter().map(ServiceUserData::try_from).collect()
}

/// Lists the staff IDs of a care home's managers, ordered by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_carehome_managers(
    conn: &mut SqliteConnection,
    carehome_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    debug!("Listing managers of care home {}", carehome_id);

    Ok(carehome_managers::table
        .filter(carehome_managers::carehome_id.eq(carehome_id))
        .order(carehome_managers::staff_id.asc())
        .select(carehome_managers::staff_id)
        .load::<i64>(conn)?)
}

/// Returns when a shift starts at a care home.
///
/// Uses the care home's configured time, or the default start for the
/// shift kind when none is set.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the care home does not exist.
pub fn shift_start(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    kind: ShiftKind,
) -> Result<Time, PersistenceError> {
    let carehome: CarehomeData = require_carehome(conn, carehome_id)?;
    let configured: Option<Time> = match kind {
        ShiftKind::Morning => carehome.morning_shift_start,
        ShiftKind::Night => carehome.night_shift_start,
    };
    Ok(configured.unwrap_or_else(|| default_shift_start(kind)))
}
