// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Audit record types.
//!
//! Records in this crate are append-only: once stored they are never
//! updated. Every rota transition produces exactly one `RotaApproval` and
//! every shift mutation produces exactly one `ShiftChange`.

#[cfg(test)]
mod tests;

use carehome_domain::RotaAction;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// The staff member (or system process) responsible for a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The staff identifier, `None` for system-initiated changes.
    pub staff_id: Option<i64>,
    /// Name used in approval messages.
    pub display_name: String,
}

impl Actor {
    /// Creates an actor for a staff member.
    ///
    /// # Arguments
    ///
    /// * `staff_id` - The staff identifier
    /// * `display_name` - The name shown in audit messages
    #[must_use]
    pub const fn new(staff_id: i64, display_name: String) -> Self {
        Self {
            staff_id: Some(staff_id),
            display_name,
        }
    }

    /// The actor used for scheduled sweeps and other unattended work.
    #[must_use]
    pub fn system() -> Self {
        Self {
            staff_id: None,
            display_name: String::from("system"),
        }
    }
}

/// An audit action string that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAuditAction(pub String);

impl std::fmt::Display for UnknownAuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown audit action: {}", self.0)
    }
}

impl std::error::Error for UnknownAuditAction {}

/// What happened to a rota in one approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Submitted,
    Published,
    Rejected,
    ManagerDraft,
}

impl ApprovalAction {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Published => "published",
            Self::Rejected => "rejected",
            Self::ManagerDraft => "manager_draft",
        }
    }
}

impl From<RotaAction> for ApprovalAction {
    fn from(action: RotaAction) -> Self {
        match action {
            RotaAction::Submit => Self::Submitted,
            RotaAction::Publish => Self::Published,
            RotaAction::Reject => Self::Rejected,
            RotaAction::BeginManagerEdit => Self::ManagerDraft,
        }
    }
}

impl FromStr for ApprovalAction {
    type Err = UnknownAuditAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "published" => Ok(Self::Published),
            "rejected" => Ok(Self::Rejected),
            "manager_draft" => Ok(Self::ManagerDraft),
            _ => Err(UnknownAuditAction(s.to_string())),
        }
    }
}

/// One entry in a rota's approval trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotaApproval {
    /// Storage identifier, `None` until persisted.
    pub approval_id: Option<i64>,
    /// The rota this step belongs to.
    pub rota_id: i64,
    /// The approval step.
    pub action: ApprovalAction,
    /// Who took the step.
    pub actor: Actor,
    /// Human-readable message (the rejection reason for rejections).
    pub message: String,
    /// When the step was taken.
    pub recorded_at: OffsetDateTime,
}

impl RotaApproval {
    /// Creates an unsaved approval record.
    ///
    /// # Arguments
    ///
    /// * `rota_id` - The rota identifier
    /// * `action` - The approval step
    /// * `actor` - Who took the step
    /// * `message` - The message stored with the step
    /// * `recorded_at` - When the step was taken
    #[must_use]
    pub const fn new(
        rota_id: i64,
        action: ApprovalAction,
        actor: Actor,
        message: String,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            approval_id: None,
            rota_id,
            action,
            actor,
            message,
            recorded_at,
        }
    }

    /// Creates an approval record loaded from storage.
    #[must_use]
    pub const fn with_id(
        approval_id: i64,
        rota_id: i64,
        action: ApprovalAction,
        actor: Actor,
        message: String,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            approval_id: Some(approval_id),
            rota_id,
            action,
            actor,
            message,
            recorded_at,
        }
    }
}

/// What happened to a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftChangeAction {
    Created,
    Updated,
    Deleted,
}

impl ShiftChangeAction {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for ShiftChangeAction {
    type Err = UnknownAuditAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            _ => Err(UnknownAuditAction(s.to_string())),
        }
    }
}

/// The assignment state of a shift at the moment it changed.
///
/// Stored as JSON; replaying a shift's snapshots in order reproduces its
/// assignment history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShiftSnapshot {
    pub staff_id: Option<i64>,
    pub service_user_id: Option<i64>,
    pub notes: String,
}

/// One entry in a shift's change history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftChange {
    /// Storage identifier, `None` until persisted.
    pub change_id: Option<i64>,
    /// The shift that changed. Kept after the shift itself is deleted.
    pub shift_id: i64,
    /// The rota owning the shift.
    pub rota_id: i64,
    pub action: ShiftChangeAction,
    /// The staff member the change is attributed to.
    pub changed_by: Option<i64>,
    pub snapshot: ShiftSnapshot,
    pub recorded_at: OffsetDateTime,
}

impl ShiftChange {
    /// Creates an unsaved change record.
    #[must_use]
    pub const fn new(
        shift_id: i64,
        rota_id: i64,
        action: ShiftChangeAction,
        changed_by: Option<i64>,
        snapshot: ShiftSnapshot,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            change_id: None,
            shift_id,
            rota_id,
            action,
            changed_by,
            snapshot,
            recorded_at,
        }
    }

    /// Picks the staff member a shift change is attributed to.
    ///
    /// Prefers `updated_by`, falling back to `created_by`.
    #[must_use]
    pub const fn attribute(updated_by: Option<i64>, created_by: Option<i64>) -> Option<i64> {
        match updated_by {
            Some(id) => Some(id),
            None => created_by,
        }
    }
}
