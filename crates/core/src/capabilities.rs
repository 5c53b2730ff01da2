// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability set.
//!
//! Every role decision lives here. Callers ask whether an actor may do
//! something and never branch on the role themselves.

use carehome_domain::{RotaAction, RotaStatus, Role};

use crate::error::CoreError;
use crate::shift_log::ShiftLog;
use crate::state::RotaHeader;

/// Whether an action is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }

    /// Converts a denied capability into `CoreError::PermissionDenied`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::PermissionDenied` naming `action` when denied.
    pub fn require(self, action: &str) -> Result<(), CoreError> {
        if self.is_allowed() {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                action: action.to_string(),
            })
        }
    }
}

impl serde::Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(matches!(self, Self::Allowed))
    }
}

impl<'de> serde::Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let b = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// The authenticated staff member capabilities are computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
    pub staff_id: i64,
    pub role: Role,
    /// The care home the staff member works at, if any.
    pub carehome_id: Option<i64>,
    pub is_superuser: bool,
}

impl ActorContext {
    const fn oversees_all(&self) -> bool {
        self.is_superuser || matches!(self.role, Role::Manager)
    }

    const fn works_at(&self, carehome_id: i64) -> bool {
        matches!(self.carehome_id, Some(id) if id == carehome_id)
    }

    const fn leads(&self, carehome_id: i64) -> bool {
        matches!(self.role, Role::TeamLead) && self.works_at(carehome_id)
    }
}

/// What an actor may do with one shift log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShiftLogCapabilities {
    pub can_view: Capability,
    pub can_edit: Capability,
    pub can_lock: Capability,
    pub can_reopen: Capability,
}

/// What an actor may do with one rota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RotaCapabilities {
    pub can_view: Capability,
    pub can_edit: Capability,
    pub can_submit: Capability,
    pub can_publish: Capability,
    pub can_reject: Capability,
    pub can_begin_manager_edit: Capability,
    pub can_revise: Capability,
}

/// Managers see every log, team leads and colleagues see their care
/// home's logs, and staff see their own.
#[must_use]
pub const fn can_view_shift_log(actor: &ActorContext, log: &ShiftLog) -> Capability {
    Capability::from_bool(
        actor.oversees_all()
            || actor.staff_id == log.key.staff_id
            || actor.works_at(log.key.carehome_id),
    )
}

/// Only the author writes entries, and never while the log is locked.
#[must_use]
pub const fn can_edit_shift_log(actor: &ActorContext, log: &ShiftLog) -> Capability {
    Capability::from_bool(
        !log.is_locked() && (actor.staff_id == log.key.staff_id || actor.is_superuser),
    )
}

/// The author or a manager may lock an open log.
#[must_use]
pub const fn can_lock_shift_log(actor: &ActorContext, log: &ShiftLog) -> Capability {
    Capability::from_bool(
        !log.is_locked() && (actor.staff_id == log.key.staff_id || actor.oversees_all()),
    )
}

/// A manager or the care home's team lead may reopen a locked log.
#[must_use]
pub const fn can_reopen_shift_log(actor: &ActorContext, log: &ShiftLog) -> Capability {
    Capability::from_bool(
        log.is_locked() && (actor.oversees_all() || actor.leads(log.key.carehome_id)),
    )
}

#[must_use]
pub const fn compute_shift_log_capabilities(
    actor: &ActorContext,
    log: &ShiftLog,
) -> ShiftLogCapabilities {
    ShiftLogCapabilities {
        can_view: can_view_shift_log(actor, log),
        can_edit: can_edit_shift_log(actor, log),
        can_lock: can_lock_shift_log(actor, log),
        can_reopen: can_reopen_shift_log(actor, log),
    }
}

/// Opening a shift log: anyone working at the care home, or a manager.
#[must_use]
pub const fn can_open_shift_log(actor: &ActorContext, carehome_id: i64) -> Capability {
    Capability::from_bool(actor.oversees_all() || actor.works_at(carehome_id))
}

/// Creating a rota: managers, or the team lead of the care home.
#[must_use]
pub const fn can_create_rota(actor: &ActorContext, carehome_id: i64) -> Capability {
    Capability::from_bool(actor.oversees_all() || actor.leads(carehome_id))
}

#[must_use]
pub const fn can_view_rota(actor: &ActorContext, rota: &RotaHeader) -> Capability {
    Capability::from_bool(actor.oversees_all() || actor.works_at(rota.carehome_id))
}

/// Shift edits follow the rota's owner: the team lead while drafting or
/// returned, managers at any editable status.
#[must_use]
pub const fn can_edit_rota(actor: &ActorContext, rota: &RotaHeader) -> Capability {
    if !rota.status.allows_shift_edits() {
        return Capability::Denied;
    }
    let lead_may_edit: bool = matches!(rota.status, RotaStatus::Draft | RotaStatus::Returned)
        && actor.leads(rota.carehome_id);
    Capability::from_bool(actor.oversees_all() || lead_may_edit)
}

fn status_permits(rota: &RotaHeader, action: RotaAction) -> bool {
    RotaStatus::sources_for(action).contains(&rota.status)
}

#[must_use]
pub fn can_submit_rota(actor: &ActorContext, rota: &RotaHeader) -> Capability {
    Capability::from_bool(
        status_permits(rota, RotaAction::Submit)
            && (actor.oversees_all() || actor.leads(rota.carehome_id)),
    )
}

#[must_use]
pub fn can_publish_rota(actor: &ActorContext, rota: &RotaHeader) -> Capability {
    Capability::from_bool(status_permits(rota, RotaAction::Publish) && actor.oversees_all())
}

#[must_use]
pub fn can_reject_rota(actor: &ActorContext, rota: &RotaHeader) -> Capability {
    Capability::from_bool(status_permits(rota, RotaAction::Reject) && actor.oversees_all())
}

#[must_use]
pub fn can_begin_manager_edit(actor: &ActorContext, rota: &RotaHeader) -> Capability {
    Capability::from_bool(
        status_permits(rota, RotaAction::BeginManagerEdit) && actor.oversees_all(),
    )
}

/// Only managers start a new version of a published rota.
#[must_use]
pub const fn can_revise_rota(actor: &ActorContext, rota: &RotaHeader) -> Capability {
    Capability::from_bool(matches!(rota.status, RotaStatus::Published) && actor.oversees_all())
}

/// Managers, or the team lead of the care home, may run the sweep.
#[must_use]
pub const fn can_scan_missed_shifts(actor: &ActorContext, carehome_id: i64) -> Capability {
    Capability::from_bool(actor.oversees_all() || actor.leads(carehome_id))
}

#[must_use]
pub fn compute_rota_capabilities(
    actor: &ActorContext,
    rota: &RotaHeader,
) -> RotaCapabilities {
    RotaCapabilities {
        can_view: can_view_rota(actor, rota),
        can_edit: can_edit_rota(actor, rota),
        can_submit: can_submit_rota(actor, rota),
        can_publish: can_publish_rota(actor, rota),
        can_reject: can_reject_rota(actor, rota),
        can_begin_manager_edit: can_begin_manager_edit(actor, rota),
        can_revise: can_revise_rota(actor, rota),
    }
}
