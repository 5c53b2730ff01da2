// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome_audit::RotaApproval;
use carehome_domain::{RotaStatus, ShiftKind};
use time::{Date, OffsetDateTime};

use crate::notify::{Notification, ShiftAssignment};

/// A rota as stored, without its shifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotaHeader {
    pub rota_id: i64,
    pub carehome_id: i64,
    pub period_start: Date,
    pub period_end: Date,
    /// Increases by one for each new rota of the same care home and period.
    pub version: i32,
    pub status: RotaStatus,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub published_by: Option<i64>,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One shift of a rota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotaShift {
    pub shift_id: i64,
    pub rota_id: i64,
    pub shift_date: Date,
    pub shift_type: ShiftKind,
    pub staff_id: Option<i64>,
    pub service_user_id: Option<i64>,
    pub notes: String,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

impl RotaShift {
    #[must_use]
    pub const fn assignment(&self) -> ShiftAssignment {
        ShiftAssignment {
            staff_id: self.staff_id,
            service_user_id: self.service_user_id,
        }
    }
}

/// What a rota transition needs to know beyond the rota itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RotaContext {
    /// Name used in notification text.
    pub carehome_name: String,
    /// Managers of the rota's care home.
    pub manager_ids: Vec<i64>,
    /// Assignments of every shift on the rota.
    pub assignments: Vec<ShiftAssignment>,
}

/// The result of a rota transition.
///
/// The caller stores `rota` and `approval` atomically and dispatches
/// `notifications` only after the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotaTransition {
    /// The rota after the transition.
    pub rota: RotaHeader,
    /// The status the transition started from.
    pub previous_status: RotaStatus,
    /// The approval trail entry for this transition.
    pub approval: RotaApproval,
    pub notifications: Vec<Notification>,
}
