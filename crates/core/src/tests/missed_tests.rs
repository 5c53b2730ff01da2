// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome_domain::ShiftKind;
use time::macros::date;

use super::helpers::NOW;
use crate::{MissedShift, NotificationKind, Recipient, expected_shifts, missed_shift_notifications};

fn missed(id: i64, shift: ShiftKind, is_notified: bool) -> MissedShift {
    MissedShift {
        missed_shift_id: id,
        carehome_id: 1,
        service_user_id: 100,
        date: date!(2026 - 03 - 02),
        shift,
        is_notified,
        created_at: NOW,
        resolved_at: None,
    }
}

#[test]
fn test_sweep_expects_morning_and_night_only() {
    assert_eq!(
        expected_shifts(&[100, 101]),
        vec![
            (100, ShiftKind::Morning),
            (100, ShiftKind::Night),
            (101, ShiftKind::Morning),
            (101, ShiftKind::Night),
        ]
    );
    assert!(expected_shifts(&[]).is_empty());
}

#[test]
fn test_notifications_skip_already_notified() {
    let records = vec![
        missed(1, ShiftKind::Morning, false),
        missed(2, ShiftKind::Night, true),
    ];
    let notifications = missed_shift_notifications("Oak House", &records, &[30, 31]);

    assert_eq!(notifications.len(), 2);
    assert!(
        notifications
            .iter()
            .all(|n| n.kind == NotificationKind::MissedShift && n.payload["missed_shift_id"] == 1)
    );
    assert_eq!(notifications[0].recipient, Recipient::Staff(30));
    assert_eq!(
        notifications[0].message,
        "No morning shift log for service user 100 at Oak House on 2026-03-02"
    );
}

#[test]
fn test_resolved_records_are_not_notified() {
    let mut record = missed(1, ShiftKind::Morning, false);
    record.resolved_at = Some(NOW);
    assert!(missed_shift_notifications("Oak House", &[record], &[30]).is_empty());
}
