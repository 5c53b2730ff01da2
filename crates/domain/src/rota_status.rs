// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rota status tracking and transition logic.
//!
//! This module defines the approval states a rota moves through and the
//! actions that move it. Transitions are actor-initiated only; a rota never
//! advances on its own. Published rotas are never mutated in place: a new
//! version is created instead.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Approval states of a rota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotaStatus {
    /// Created by a team lead and still being edited.
    #[default]
    Draft,
    /// Submitted to managers, waiting for a decision.
    PendingApproval,
    /// Sent back to the team lead for changes.
    Returned,
    /// Taken over by a manager for edits before publishing.
    ManagerDraft,
    /// Final. Further changes require a new version.
    Published,
}

impl RotaStatus {
    /// Every status, for exhaustive checks.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::PendingApproval,
        Self::Returned,
        Self::ManagerDraft,
        Self::Published,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Returned => "returned",
            Self::ManagerDraft => "manager_draft",
            Self::Published => "published",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRotaStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending_approval" => Ok(Self::PendingApproval),
            "returned" => Ok(Self::Returned),
            "manager_draft" => Ok(Self::ManagerDraft),
            "published" => Ok(Self::Published),
            _ => Err(DomainError::InvalidRotaStatus(s.to_string())),
        }
    }

    /// Returns the statuses from which `action` may be taken.
    #[must_use]
    pub const fn sources_for(action: RotaAction) -> &'static [Self] {
        match action {
            RotaAction::Submit => &[Self::Draft, Self::Returned],
            RotaAction::Publish => &[Self::PendingApproval, Self::ManagerDraft],
            RotaAction::Reject | RotaAction::BeginManagerEdit => &[Self::PendingApproval],
        }
    }

    /// Applies an action to this status, returning the resulting status.
    ///
    /// Valid transitions are:
    /// - `Draft` | `Returned` --submit--> `PendingApproval`
    /// - `PendingApproval` | `ManagerDraft` --publish--> `Published`
    /// - `PendingApproval` --reject--> `Returned`
    /// - `PendingApproval` --begin manager edit--> `ManagerDraft`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` for every other pair.
    pub fn apply(self, action: RotaAction) -> Result<Self, DomainError> {
        let target: Option<Self> = match (self, action) {
            (Self::Draft | Self::Returned, RotaAction::Submit) => Some(Self::PendingApproval),
            (Self::PendingApproval | Self::ManagerDraft, RotaAction::Publish) => {
                Some(Self::Published)
            }
            (Self::PendingApproval, RotaAction::Reject) => Some(Self::Returned),
            (Self::PendingApproval, RotaAction::BeginManagerEdit) => Some(Self::ManagerDraft),
            _ => None,
        };

        target.ok_or(DomainError::InvalidTransition { from: self, action })
    }

    /// Returns true if shifts may be created, updated or deleted in this status.
    #[must_use]
    pub const fn allows_shift_edits(&self) -> bool {
        matches!(self, Self::Draft | Self::Returned | Self::ManagerDraft)
    }
}

impl FromStr for RotaStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for RotaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Actions that move a rota between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotaAction {
    /// Team lead submits the rota for approval.
    Submit,
    /// Manager publishes the rota.
    Publish,
    /// Manager returns the rota to the team lead.
    Reject,
    /// Manager takes the rota over for edits before publishing.
    BeginManagerEdit,
}

impl RotaAction {
    /// Every action, for exhaustive checks.
    pub const ALL: [Self; 4] = [
        Self::Submit,
        Self::Publish,
        Self::Reject,
        Self::BeginManagerEdit,
    ];

    /// Returns a short verb for messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Publish => "publish",
            Self::Reject => "reject",
            Self::BeginManagerEdit => "begin manager edit of",
        }
    }
}

/// Who is told when a rota is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotifyMode {
    /// Staff and service users on the rota.
    #[default]
    Everyone,
    /// Staff assigned to the rota's shifts.
    Staff,
    /// Service users assigned to the rota's shifts.
    ServiceUsers,
    /// Nobody.
    None,
}

impl NotifyMode {
    /// Returns the string representation of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Everyone => "everyone",
            Self::Staff => "staff",
            Self::ServiceUsers => "service_users",
            Self::None => "none",
        }
    }

    /// Returns true if staff are notified in this mode.
    #[must_use]
    pub const fn includes_staff(&self) -> bool {
        matches!(self, Self::Everyone | Self::Staff)
    }

    /// Returns true if service users are notified in this mode.
    #[must_use]
    pub const fn includes_service_users(&self) -> bool {
        matches!(self, Self::Everyone | Self::ServiceUsers)
    }
}

impl FromStr for NotifyMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "everyone" => Ok(Self::Everyone),
            "staff" => Ok(Self::Staff),
            "service_users" => Ok(Self::ServiceUsers),
            "none" => Ok(Self::None),
            _ => Err(DomainError::InvalidNotifyMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for status in RotaStatus::ALL {
            match RotaStatus::parse_str(status.as_str()) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {}: {e}", status.as_str()),
            }
        }
    }

    #[test]
    fn test_invalid_status_string() {
        let result = RotaStatus::parse_str("approved");
        assert!(matches!(result, Err(DomainError::InvalidRotaStatus(_))));
    }

    #[test]
    fn test_submit_from_draft_and_returned() {
        assert_eq!(
            RotaStatus::Draft.apply(RotaAction::Submit),
            Ok(RotaStatus::PendingApproval)
        );
        assert_eq!(
            RotaStatus::Returned.apply(RotaAction::Submit),
            Ok(RotaStatus::PendingApproval)
        );
    }

    #[test]
    fn test_publish_from_pending_and_manager_draft() {
        assert_eq!(
            RotaStatus::PendingApproval.apply(RotaAction::Publish),
            Ok(RotaStatus::Published)
        );
        assert_eq!(
            RotaStatus::ManagerDraft.apply(RotaAction::Publish),
            Ok(RotaStatus::Published)
        );
    }

    #[test]
    fn test_reject_only_from_pending() {
        assert_eq!(
            RotaStatus::PendingApproval.apply(RotaAction::Reject),
            Ok(RotaStatus::Returned)
        );
        assert!(RotaStatus::ManagerDraft.apply(RotaAction::Reject).is_err());
        assert!(RotaStatus::Draft.apply(RotaAction::Reject).is_err());
    }

    #[test]
    fn test_transition_table_is_exhaustive() {
        for status in RotaStatus::ALL {
            for action in RotaAction::ALL {
                let allowed: bool = RotaStatus::sources_for(action).contains(&status);
                let result = status.apply(action);
                if allowed {
                    assert!(result.is_ok(), "{status} should allow {action:?}");
                } else {
                    assert_eq!(
                        result,
                        Err(DomainError::InvalidTransition {
                            from: status,
                            action
                        })
                    );
                }
            }
        }
    }

    #[test]
    fn test_nothing_leaves_published() {
        for action in RotaAction::ALL {
            assert!(RotaStatus::Published.apply(action).is_err());
        }
    }

    #[test]
    fn test_shift_edit_statuses() {
        assert!(RotaStatus::Draft.allows_shift_edits());
        assert!(RotaStatus::Returned.allows_shift_edits());
        assert!(RotaStatus::ManagerDraft.allows_shift_edits());
        assert!(!RotaStatus::PendingApproval.allows_shift_edits());
        assert!(!RotaStatus::Published.allows_shift_edits());
    }

    #[test]
    fn test_notify_mode_membership() {
        assert!(NotifyMode::Everyone.includes_staff());
        assert!(NotifyMode::Everyone.includes_service_users());
        assert!(NotifyMode::Staff.includes_staff());
        assert!(!NotifyMode::Staff.includes_service_users());
        assert!(!NotifyMode::ServiceUsers.includes_staff());
        assert!(!NotifyMode::None.includes_staff());
        assert!(!NotifyMode::None.includes_service_users());
    }
}
