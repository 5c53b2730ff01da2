// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Missed shift detection.
//!
//! A daily sweep expects one shift log per service user for every logged
//! shift kind. Whatever is absent is recorded as missed until a log turns
//! up and the record is resolved.

use carehome_domain::{ShiftKind, format_date};
use serde_json::json;
use time::{Date, OffsetDateTime};

use crate::notify::{Notification, NotificationKind, Recipient};

/// A shift with no log, as recorded by the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedShift {
    pub missed_shift_id: i64,
    pub carehome_id: i64,
    pub service_user_id: i64,
    pub date: Date,
    pub shift: ShiftKind,
    /// Set once managers have been told.
    pub is_notified: bool,
    pub created_at: OffsetDateTime,
    pub resolved_at: Option<OffsetDateTime>,
}

/// Every (service user, shift) pair the sweep expects a log for.
#[must_use]
pub fn expected_shifts(service_user_ids: &[i64]) -> Vec<(i64, ShiftKind)> {
    service_user_ids
        .iter()
        .flat_map(|id| ShiftKind::ALL.iter().map(move |shift| (*id, *shift)))
        .collect()
}

/// Tells each manager about each missed shift not yet notified.
#[must_use]
pub fn missed_shift_notifications(
    carehome_name: &str,
    missed: &[MissedShift],
    manager_ids: &[i64],
) -> Vec<Notification> {
    missed
        .iter()
        .filter(|record| !record.is_notified && record.resolved_at.is_none())
        .flat_map(|record| {
            manager_ids.iter().map(move |manager_id| Notification {
                recipient: Recipient::Staff(*manager_id),
                kind: NotificationKind::MissedShift,
                title: String::from("Missed Shift"),
                message: format!(
                    "No {} shift log for service user {} at {} on {}",
                    record.shift,
                    record.service_user_id,
                    carehome_name,
                    format_date(record.date)
                ),
                payload: json!({
                    "missed_shift_id": record.missed_shift_id,
                    "carehome_id": record.carehome_id,
                    "service_user_id": record.service_user_id,
                    "date": format_date(record.date),
                    "shift": record.shift.as_str(),
                }),
            })
        })
        .collect()
}
