// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication of the acting staff member.
//!
//! Authentication here is a stub: the caller names a staff id and the
//! directory supplies the role and care home. Authorization is never decided
//! from the role directly; handlers consult the capability set computed from
//! the resulting `ActorContext`.

use carehome::ActorContext;
use carehome_audit::Actor;
use carehome_domain::staff_display_name;
use carehome_persistence::{Persistence, StaffData};
use tracing::debug;

use crate::error::{ApiError, AuthError, translate_persistence_error};

/// An authenticated staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// Identity, role and care home used for capability checks.
    pub context: ActorContext,
    /// Name recorded in audit trails.
    pub display_name: String,
}

impl AuthenticatedActor {
    /// Creates an authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `context` - The actor's identity, role and care home
    /// * `display_name` - The name recorded in audit trails
    #[must_use]
    pub const fn new(context: ActorContext, display_name: String) -> Self {
        Self {
            context,
            display_name,
        }
    }

    /// The staff identifier of this actor.
    #[must_use]
    pub const fn staff_id(&self) -> i64 {
        self.context.staff_id
    }

    /// Converts this authenticated actor into an audit actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.context.staff_id, self.display_name.clone())
    }
}

impl From<&StaffData> for AuthenticatedActor {
    fn from(staff: &StaffData) -> Self {
        Self::new(
            ActorContext {
                staff_id: staff.staff_id,
                role: staff.role,
                carehome_id: staff.carehome_id,
                is_superuser: staff.is_superuser,
            },
            staff_display_name(&staff.first_name, &staff.last_name, &staff.login_name),
        )
    }
}

/// Resolves the acting staff member from a staff id.
///
/// # Arguments
///
/// * `persistence` - The persistence layer holding the staff directory
/// * `staff_id` - The staff id the caller claims
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` if no staff member has this id or
/// the account is inactive.
pub fn authenticate_stub(
    persistence: &mut Persistence,
    staff_id: i64,
) -> Result<AuthenticatedActor, ApiError> {
    let staff: StaffData = persistence
        .get_staff(staff_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| AuthError::AuthenticationFailed {
            reason: format!("Unknown staff id {staff_id}"),
        })?;

    if !staff.is_active {
        return Err(AuthError::AuthenticationFailed {
            reason: format!("Staff account {staff_id} is inactive"),
        }
        .into());
    }

    debug!(staff_id, role = staff.role.as_str(), "Authenticated staff member");
    Ok(AuthenticatedActor::from(&staff))
}
