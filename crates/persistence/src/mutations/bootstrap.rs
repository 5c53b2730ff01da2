// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! First-run seeding of a care home and its manager.

use carehome_domain::Role;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use tracing::info;

use crate::data_models::{BootstrapManager, BootstrapOutcome, NewStaff};
use crate::error::PersistenceError;
use crate::mutations::directory::{assign_carehome_manager, create_carehome, register_staff};
use crate::queries::directory::{find_carehome_by_name, find_staff_by_login};

/// Ensures a care home exists with the named manager assigned to it.
///
/// Existing rows are reused, so running this again against the same
/// database changes nothing.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the login belongs to a staff
/// member who is not a manager, or an error if any write fails.
pub fn bootstrap_manager(
    conn: &mut SqliteConnection,
    request: &BootstrapManager,
    now: OffsetDateTime,
) -> Result<BootstrapOutcome, PersistenceError> {
    let carehome_name: &str = request.carehome_name.trim();
    let carehome_id: i64 = match find_carehome_by_name(conn, carehome_name)? {
        Some(carehome) => carehome.carehome_id,
        None => create_carehome(conn, carehome_name, &request.postcode, None, None, now)?,
    };

    let login_name: &str = request.login_name.trim();
    let (staff_id, created): (i64, bool) = match find_staff_by_login(conn, login_name)? {
        Some(existing) if existing.role == Role::Manager => (existing.staff_id, false),
        Some(existing) => {
            return Err(PersistenceError::Conflict(format!(
                "Login '{login_name}' belongs to a {} and cannot be bootstrapped as manager",
                existing.role.as_str()
            )));
        }
        None => {
            let new_staff: NewStaff = NewStaff {
                login_name: login_name.to_string(),
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                role: Role::Manager,
                carehome_id: None,
                is_superuser: true,
            };
            (register_staff(conn, &new_staff, now)?, true)
        }
    };

    assign_carehome_manager(conn, carehome_id, staff_id)?;

    info!(
        carehome_id,
        staff_id,
        created,
        login_name = %login_name,
        "Bootstrapped care home manager"
    );
    Ok(BootstrapOutcome {
        carehome_id,
        staff_id,
        created,
    })
}
