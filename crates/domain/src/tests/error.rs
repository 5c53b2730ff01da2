// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::time;

use crate::{DomainError, RotaAction, RotaStatus, ShiftKind};

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidShiftKind(String::from("afternoon"));
    assert_eq!(format!("{err}"), "Invalid shift kind: afternoon");

    let err: DomainError = DomainError::InvalidTransition {
        from: RotaStatus::Published,
        action: RotaAction::Reject,
    };
    assert_eq!(format!("{err}"), "Cannot reject a rota in status 'published'");

    let err: DomainError = DomainError::SlotOutsideShift {
        shift: ShiftKind::Morning,
        shift_start: time!(08:00),
        slot: time!(21:00),
    };
    assert_eq!(
        format!("{err}"),
        "Slot 21:00 is not part of the morning shift starting at 08:00"
    );

    let err: DomainError = DomainError::EmptyLogContent;
    assert_eq!(format!("{err}"), "Log entry content cannot be empty");

    let err: DomainError = DomainError::RotaNotEditable {
        rota_id: 7,
        status: RotaStatus::PendingApproval,
    };
    assert_eq!(
        format!("{err}"),
        "Shifts of rota 7 cannot be changed while it is 'pending_approval'"
    );

    let err: DomainError = DomainError::InvalidSlotPolicy {
        slot_minutes: 60,
        slot_count: 30,
    };
    assert_eq!(
        format!("{err}"),
        "Invalid slot policy: 30 slots of 60 minutes must be non-empty and fit within 24 hours"
    );
}
