// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Directory mutations.
//!
//! Just enough of the care home directory to anchor shift logs and rotas.

use carehome_domain::DomainError;
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::{OffsetDateTime, Time};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::columns::{encode_bool, encode_time, encode_timestamp};
use crate::data_models::NewStaff;
use crate::diesel_schema::{carehome_managers, carehomes, service_users, staff};
use crate::error::PersistenceError;
use crate::mutations::constraint_error;

fn require_name(field: &str, value: &str) -> Result<String, PersistenceError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(format!("{field} cannot be empty")).into());
    }
    Ok(trimmed.to_string())
}

/// Creates a care home.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `name` - The care home name, unique across the system
/// * `postcode` - The care home postcode
/// * `morning_shift_start` - Morning start, or `None` for the default
/// * `night_shift_start` - Night start, or `None` for the default
/// * `now` - Creation time
///
/// # Errors
///
/// Returns an error if the name is empty or already taken.
pub fn create_carehome(
    conn: &mut SqliteConnection,
    name: &str,
    postcode: &str,
    morning_shift_start: Option<Time>,
    night_shift_start: Option<Time>,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let name: String = require_name("Care home name", name)?;

    diesel::insert_into(carehomes::table)
        .values((
            carehomes::name.eq(&name),
            carehomes::postcode.eq(postcode.trim().to_uppercase()),
            carehomes::morning_shift_start.eq(morning_shift_start.map(encode_time)),
            carehomes::night_shift_start.eq(night_shift_start.map(encode_time)),
            carehomes::created_at.eq(encode_timestamp(now)?),
        ))
        .execute(conn)
        .map_err(|e| constraint_error(e, "Care home"))?;

    let carehome_id: i64 = conn.get_last_insert_rowid()?;
    info!(carehome_id, name = %name, "Created care home");
    Ok(carehome_id)
}

/// Registers a staff member.
///
/// # Errors
///
/// Returns an error if the login name is empty or taken, or the care home
/// does not exist.
pub fn register_staff(
    conn: &mut SqliteConnection,
    new_staff: &NewStaff,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let login_name: String = require_name("Login name", &new_staff.login_name)?;

    diesel::insert_into(staff::table)
        .values((
            staff::login_name.eq(&login_name),
            staff::first_name.eq(new_staff.first_name.trim()),
            staff::last_name.eq(new_staff.last_name.trim()),
            staff::role.eq(new_staff.role.as_str()),
            staff::carehome_id.eq(new_staff.carehome_id),
            staff::is_superuser.eq(encode_bool(new_staff.is_superuser)),
            staff::is_active.eq(encode_bool(true)),
            staff::created_at.eq(encode_timestamp(now)?),
        ))
        .execute(conn)
        .map_err(|e| constraint_error(e, "Staff"))?;

    let staff_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        staff_id,
        login_name = %login_name,
        role = new_staff.role.as_str(),
        "Registered staff member"
    );
    Ok(staff_id)
}

/// Registers a service user at a care home.
///
/// # Errors
///
/// Returns an error if both names are empty or the care home does not exist.
pub fn register_service_user(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    first_name: &str,
    last_name: &str,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    if first_name.trim().is_empty() && last_name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Service user needs a first or last name",
        ))
        .into());
    }

    diesel::insert_into(service_users::table)
        .values((
            service_users::carehome_id.eq(carehome_id),
            service_users::first_name.eq(first_name.trim()),
            service_users::last_name.eq(last_name.trim()),
            service_users::created_at.eq(encode_timestamp(now)?),
        ))
        .execute(conn)
        .map_err(|e| constraint_error(e, "Service user"))?;

    let service_user_id: i64 = conn.get_last_insert_rowid()?;
    info!(service_user_id, carehome_id, "Registered service user");
    Ok(service_user_id)
}

/// Makes a staff member a manager of a care home.
///
/// Assigning an existing manager again changes nothing.
///
/// # Errors
///
/// Returns an error if the care home or staff member does not exist.
pub fn assign_carehome_manager(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    staff_id: i64,
) -> Result<(), PersistenceError> {
    let inserted: usize = diesel::insert_or_ignore_into(carehome_managers::table)
        .values((
            carehome_managers::carehome_id.eq(carehome_id),
            carehome_managers::staff_id.eq(staff_id),
        ))
        .execute(conn)
        .map_err(|e| constraint_error(e, "Care home manager"))?;

    if inserted > 0 {
        info!(carehome_id, staff_id, "Assigned care home manager");
    }
    Ok(())
}
