// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome_domain::{Role, ShiftKind};
use time::{Date, OffsetDateTime, Time};

/// A care home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarehomeData {
    pub carehome_id: i64,
    pub name: String,
    pub postcode: String,
    /// Configured morning start, if any.
    pub morning_shift_start: Option<Time>,
    /// Configured night start, if any.
    pub night_shift_start: Option<Time>,
    pub created_at: OffsetDateTime,
}

/// A staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffData {
    pub staff_id: i64,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub carehome_id: Option<i64>,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

/// Input for registering a staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaff {
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub carehome_id: Option<i64>,
    pub is_superuser: bool,
}

/// Input for seeding the first care home and its manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapManager {
    pub carehome_name: String,
    pub postcode: String,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
}

/// What a bootstrap run found or created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOutcome {
    pub carehome_id: i64,
    pub staff_id: i64,
    /// False when the manager already existed.
    pub created: bool,
}

/// A resident whose care is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUserData {
    pub service_user_id: i64,
    pub carehome_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: OffsetDateTime,
}

/// The document produced when a shift log was last locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftLogDocumentData {
    pub document_id: i64,
    pub shift_log_id: i64,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
    pub created_at: OffsetDateTime,
}

/// Input for creating or updating a rota shift.
///
/// A `shift_id` of `None` creates a new shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftInput {
    pub shift_id: Option<i64>,
    pub shift_date: Date,
    pub shift_type: ShiftKind,
    pub staff_id: Option<i64>,
    pub service_user_id: Option<i64>,
    pub notes: String,
}
