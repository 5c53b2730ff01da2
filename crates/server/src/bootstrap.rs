// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Startup seeding so a fresh database has someone to sign in as.

use carehome_persistence::{
    BootstrapManager, BootstrapOutcome, Persistence, PersistenceError, ServiceUserData,
};
use time::OffsetDateTime;
use tracing::info;

/// A service user named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUserName {
    pub first_name: String,
    pub last_name: String,
}

/// Parses `"First Last"`; everything after the first space is the last name.
///
/// # Errors
///
/// Returns an error if the value is blank.
pub fn parse_service_user_name(value: &str) -> Result<ServiceUserName, String> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(String::from("Service user name cannot be empty"));
    }
    let (first, last): (&str, &str) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    Ok(ServiceUserName {
        first_name: first.to_string(),
        last_name: last.trim().to_string(),
    })
}

/// Everything seeded before the server starts listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub manager: BootstrapManager,
    pub service_users: Vec<ServiceUserName>,
}

/// Seeds the manager, their care home and any missing service users.
///
/// Safe to run on every start: rows that already exist are reused.
///
/// # Errors
///
/// Returns an error if the manager cannot be seeded or a service user
/// cannot be registered.
pub fn run_bootstrap(
    persistence: &mut Persistence,
    plan: &BootstrapPlan,
    now: OffsetDateTime,
) -> Result<BootstrapOutcome, PersistenceError> {
    let outcome: BootstrapOutcome = persistence.bootstrap_manager(&plan.manager, now)?;

    let existing: Vec<ServiceUserData> = persistence.list_service_users(outcome.carehome_id)?;
    let mut registered: usize = 0;
    for name in &plan.service_users {
        let known: bool = existing.iter().any(|service_user| {
            service_user.first_name == name.first_name && service_user.last_name == name.last_name
        });
        if known {
            continue;
        }
        persistence.register_service_user(
            outcome.carehome_id,
            &name.first_name,
            &name.last_name,
            now,
        )?;
        registered += 1;
    }

    info!(
        carehome_id = outcome.carehome_id,
        staff_id = outcome.staff_id,
        manager_created = outcome.created,
        service_users_registered = registered,
        "Bootstrap complete; sign in with the X-Staff-Id header set to staff_id"
    );
    Ok(outcome)
}
