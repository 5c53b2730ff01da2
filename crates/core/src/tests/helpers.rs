// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome_audit::Actor;
use carehome_domain::{Role, RotaStatus, ShiftKind, ShiftLogStatus};
use time::macros::{date, datetime, time};
use time::{OffsetDateTime, Time};

use crate::{
    ActorContext, LogEntry, RotaContext, RotaHeader, ShiftAssignment, ShiftLog, ShiftLogKey,
};

pub const NOW: OffsetDateTime = datetime!(2026-03-02 21:15:07 UTC);

pub fn create_test_key(shift: ShiftKind) -> ShiftLogKey {
    ShiftLogKey {
        staff_id: 10,
        carehome_id: 1,
        service_user_id: 100,
        date: date!(2026 - 03 - 02),
        shift,
    }
}

pub fn create_test_log(shift: ShiftKind, status: ShiftLogStatus) -> ShiftLog {
    ShiftLog {
        shift_log_id: 5,
        key: create_test_key(shift),
        staff_name: String::from("Jane Doe"),
        day_of_week: String::from("Monday"),
        status,
        created_at: NOW,
        updated_at: NOW,
        locked_at: None,
    }
}

pub fn create_test_entry(log: &ShiftLog, id: i64, slot: Time, content: &str) -> LogEntry {
    LogEntry {
        log_entry_id: id,
        shift_log_id: Some(log.shift_log_id),
        key: log.key,
        time_slot: slot,
        content: content.to_string(),
        is_locked: false,
        updated_at: NOW,
    }
}

pub fn create_test_rota(status: RotaStatus) -> RotaHeader {
    RotaHeader {
        rota_id: 3,
        carehome_id: 1,
        period_start: date!(2026 - 03 - 02),
        period_end: date!(2026 - 03 - 08),
        version: 1,
        status,
        created_by: Some(20),
        updated_by: None,
        published_by: None,
        published_at: None,
        created_at: NOW,
        updated_at: NOW,
    }
}

pub fn create_test_context() -> RotaContext {
    RotaContext {
        carehome_name: String::from("Oak House"),
        manager_ids: vec![30, 31],
        assignments: vec![
            ShiftAssignment {
                staff_id: Some(10),
                service_user_id: Some(100),
            },
            ShiftAssignment {
                staff_id: Some(11),
                service_user_id: None,
            },
            ShiftAssignment {
                staff_id: None,
                service_user_id: Some(101),
            },
            ShiftAssignment {
                staff_id: Some(10),
                service_user_id: Some(101),
            },
        ],
    }
}

pub fn create_team_lead() -> Actor {
    Actor::new(20, String::from("Lee Lead"))
}

pub fn create_manager() -> Actor {
    Actor::new(30, String::from("Mo Patel"))
}

pub fn context_for(staff_id: i64, role: Role, carehome_id: Option<i64>) -> ActorContext {
    ActorContext {
        staff_id,
        role,
        carehome_id,
        is_superuser: false,
    }
}

pub const MORNING_START: Time = time!(08:00);
pub const NIGHT_START: Time = time!(20:00);
