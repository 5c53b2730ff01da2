// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome::{CoreError, LogEntry, RenderError, ShiftLog, ShiftLogKey};
use carehome_domain::{DomainError, Role, ShiftKind, ShiftLogStatus};
use time::macros::{datetime, time};

use super::{BrokenRenderer, Fixture, JsonRenderer, NOW, new_staff, setup};
use crate::{PersistenceError, SYSTEM_INITIALS, ShiftLogDocumentData};

fn started(fx: &mut Fixture, shift: ShiftKind) -> ShiftLog {
    let key: ShiftLogKey = fx.key(shift);
    fx.persistence.get_or_create_shift_log(&key, NOW).unwrap().0
}

#[test]
fn test_get_or_create_is_idempotent() {
    let mut fx: Fixture = setup();
    let key: ShiftLogKey = fx.key(ShiftKind::Morning);

    let (first, created_first) = fx.persistence.get_or_create_shift_log(&key, NOW).unwrap();
    let (second, created_second) = fx.persistence.get_or_create_shift_log(&key, NOW).unwrap();

    assert!(created_first);
    assert!(!created_second);
    assert_eq!(first.shift_log_id, second.shift_log_id);
}

#[test]
fn test_create_records_staff_name_and_weekday() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);

    assert_eq!(log.staff_name, "Jane Doe");
    assert_eq!(log.day_of_week, "Monday");
    assert_eq!(log.status, ShiftLogStatus::Incomplete);
    assert_eq!(log.created_at, NOW);
    assert!(log.locked_at.is_none());
}

#[test]
fn test_strict_create_reports_duplicate() {
    let mut fx: Fixture = setup();
    let key: ShiftLogKey = fx.key(ShiftKind::Night);
    fx.persistence.create_shift_log(&key, NOW).unwrap();

    let result = fx.persistence.create_shift_log(&key, NOW);

    assert_eq!(
        result,
        Err(PersistenceError::Rejected(CoreError::DuplicateAggregate(key)))
    );
}

#[test]
fn test_same_staff_different_shift_is_a_different_log() {
    let mut fx: Fixture = setup();
    let morning: ShiftLog = started(&mut fx, ShiftKind::Morning);
    let night: ShiftLog = started(&mut fx, ShiftKind::Night);

    assert_ne!(morning.shift_log_id, night.shift_log_id);
}

#[test]
fn test_create_rejects_service_user_of_another_carehome() {
    let mut fx: Fixture = setup();
    let other_home: i64 = fx
        .persistence
        .create_carehome("Oak Lodge", "ZZ9 9ZZ", None, None, NOW)
        .unwrap();
    let stranger: i64 = fx
        .persistence
        .register_service_user(other_home, "Zaphod", "Beeblebrox", NOW)
        .unwrap();

    let mut key: ShiftLogKey = fx.key(ShiftKind::Morning);
    key.service_user_id = stranger;

    let result = fx.persistence.get_or_create_shift_log(&key, NOW);
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
    assert!(fx.persistence.find_shift_log(&key).unwrap().is_none());
}

#[test]
fn test_touch_then_lock_produces_one_locked_entry_and_document() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);

    fx.persistence
        .touch_entry(log.shift_log_id, time!(08:00), "obs normal", NOW)
        .unwrap();
    let (locked, document) = fx
        .persistence
        .lock_shift_log(log.shift_log_id, &JsonRenderer, NOW)
        .unwrap();

    assert_eq!(locked.status, ShiftLogStatus::Locked);
    assert_eq!(locked.locked_at, Some(NOW));

    let entries: Vec<LogEntry> = fx.persistence.list_log_entries(log.shift_log_id).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_locked);
    assert_eq!(entries[0].content, "obs normal");

    assert_eq!(
        document.file_name,
        format!("log_pdfs/log_{}_20260302_211507.json", log.shift_log_id)
    );
    assert_eq!(document.content_type, "application/json");

    let data: serde_json::Value = serde_json::from_slice(&document.content).unwrap();
    assert_eq!(data["staff_initials"], "JD");
    assert_eq!(data["staff_name"], "Jane Doe");
    assert_eq!(data["entries"][0]["time_slot"], "08:00");
    assert_eq!(data["entries"][0]["content"], "obs normal");
}

#[test]
fn test_lock_without_entries_fails_and_leaves_log_open() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);

    let result = fx
        .persistence
        .lock_shift_log(log.shift_log_id, &JsonRenderer, NOW);

    assert_eq!(
        result,
        Err(PersistenceError::Rejected(CoreError::EmptyAggregate {
            shift_log_id: log.shift_log_id
        }))
    );
    let reloaded: ShiftLog = fx
        .persistence
        .get_shift_log(log.shift_log_id)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, ShiftLogStatus::Incomplete);
    assert!(
        fx.persistence
            .get_shift_log_document(log.shift_log_id)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_lock_twice_is_rejected() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);
    fx.persistence
        .touch_entry(log.shift_log_id, time!(09:00), "breakfast", NOW)
        .unwrap();
    fx.persistence
        .lock_shift_log(log.shift_log_id, &JsonRenderer, NOW)
        .unwrap();

    let result = fx
        .persistence
        .lock_shift_log(log.shift_log_id, &JsonRenderer, NOW);

    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::LockedAggregate { .. }))
    ));
}

#[test]
fn test_render_failure_rolls_back_the_whole_lock() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);
    fx.persistence
        .touch_entry(log.shift_log_id, time!(08:00), "obs normal", NOW)
        .unwrap();

    let result = fx
        .persistence
        .lock_shift_log(log.shift_log_id, &BrokenRenderer, NOW);

    assert_eq!(
        result,
        Err(PersistenceError::Rejected(CoreError::Render(
            RenderError::Failed(String::from("printer on fire"))
        )))
    );
    let reloaded: ShiftLog = fx
        .persistence
        .get_shift_log(log.shift_log_id)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, ShiftLogStatus::Incomplete);
    let entries: Vec<LogEntry> = fx.persistence.list_log_entries(log.shift_log_id).unwrap();
    assert!(entries.iter().all(|entry| !entry.is_locked));
    assert!(
        fx.persistence
            .get_shift_log_document(log.shift_log_id)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_write_to_locked_log_is_rejected() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);
    fx.persistence
        .touch_entry(log.shift_log_id, time!(08:00), "obs normal", NOW)
        .unwrap();
    fx.persistence
        .lock_shift_log(log.shift_log_id, &JsonRenderer, NOW)
        .unwrap();

    let result = fx
        .persistence
        .touch_entry(log.shift_log_id, time!(08:00), "edited", NOW);

    assert_eq!(
        result,
        Err(PersistenceError::Rejected(CoreError::LockedAggregate {
            shift_log_id: log.shift_log_id
        }))
    );
    let entries: Vec<LogEntry> = fx.persistence.list_log_entries(log.shift_log_id).unwrap();
    assert_eq!(entries[0].content, "obs normal");

    let key: ShiftLogKey = fx.key(ShiftKind::Morning);
    let result = fx.persistence.get_or_create_entry(&key, time!(10:00), NOW);
    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::LockedAggregate { .. }))
    ));
}

#[test]
fn test_same_slot_is_last_write_wins() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);

    fx.persistence
        .touch_entry(log.shift_log_id, time!(11:00), "first", NOW)
        .unwrap();
    let later = datetime!(2026-03-02 21:30:00 UTC);
    let entry: LogEntry = fx
        .persistence
        .touch_entry(log.shift_log_id, time!(11:00), "  second  ", later)
        .unwrap();

    assert_eq!(entry.content, "second");
    assert_eq!(entry.updated_at, later);
    assert_eq!(
        fx.persistence
            .list_log_entries(log.shift_log_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_touch_rejects_slot_outside_shift_and_empty_content() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);

    let outside = fx
        .persistence
        .touch_entry(log.shift_log_id, time!(21:00), "late", NOW);
    assert!(matches!(
        outside,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::SlotOutsideShift { .. }
        )))
    ));

    let off_grid = fx
        .persistence
        .touch_entry(log.shift_log_id, time!(08:30), "half past", NOW);
    assert!(off_grid.is_err());

    let empty = fx
        .persistence
        .touch_entry(log.shift_log_id, time!(08:00), "   ", NOW);
    assert_eq!(
        empty,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::EmptyLogContent
        )))
    );
}

#[test]
fn test_touch_unknown_log_is_not_found() {
    let mut fx: Fixture = setup();
    let result = fx.persistence.touch_entry(999, time!(08:00), "obs", NOW);
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_reopen_keeps_document_until_next_lock() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);
    fx.persistence
        .touch_entry(log.shift_log_id, time!(08:00), "obs normal", NOW)
        .unwrap();
    let (_, first) = fx
        .persistence
        .lock_shift_log(log.shift_log_id, &JsonRenderer, NOW)
        .unwrap();

    let reopened: ShiftLog = fx
        .persistence
        .reopen_shift_log(log.shift_log_id, NOW)
        .unwrap();
    assert_eq!(reopened.status, ShiftLogStatus::Incomplete);
    assert!(reopened.locked_at.is_none());
    let kept: ShiftLogDocumentData = fx
        .persistence
        .get_shift_log_document(log.shift_log_id)
        .unwrap()
        .unwrap();
    assert_eq!(kept, first);

    fx.persistence
        .touch_entry(log.shift_log_id, time!(08:00), "obs normal, settled", NOW)
        .unwrap();
    let relock_time = datetime!(2026-03-02 22:00:00 UTC);
    let (_, second) = fx
        .persistence
        .lock_shift_log(log.shift_log_id, &JsonRenderer, relock_time)
        .unwrap();

    assert_ne!(second.file_name, first.file_name);
    assert_eq!(
        second.file_name,
        format!("log_pdfs/log_{}_20260302_220000.json", log.shift_log_id)
    );
    let stored: ShiftLogDocumentData = fx
        .persistence
        .get_shift_log_document(log.shift_log_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored, second);
}

#[test]
fn test_reopen_of_open_log_is_rejected() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);

    let result = fx.persistence.reopen_shift_log(log.shift_log_id, NOW);

    assert_eq!(
        result,
        Err(PersistenceError::Rejected(CoreError::NotLocked {
            shift_log_id: log.shift_log_id
        }))
    );
}

#[test]
fn test_orphan_entries_are_linked_when_the_log_is_created() {
    let mut fx: Fixture = setup();
    let key: ShiftLogKey = fx.key(ShiftKind::Morning);

    let orphan: LogEntry = fx
        .persistence
        .get_or_create_entry(&key, time!(08:00), NOW)
        .unwrap();
    assert!(orphan.shift_log_id.is_none());
    assert_eq!(orphan.content, "");

    let again: LogEntry = fx
        .persistence
        .get_or_create_entry(&key, time!(08:00), NOW)
        .unwrap();
    assert_eq!(again.log_entry_id, orphan.log_entry_id);

    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);
    let entries: Vec<LogEntry> = fx.persistence.list_log_entries(log.shift_log_id).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_entry_id, orphan.log_entry_id);
    assert_eq!(entries[0].shift_log_id, Some(log.shift_log_id));
    assert_eq!(
        fx.persistence
            .relink_orphan_entries(log.shift_log_id)
            .unwrap(),
        0
    );
}

#[test]
fn test_night_entries_follow_shift_order() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Night);

    for (slot, text) in [
        (time!(02:00), "asleep"),
        (time!(20:00), "settled"),
        (time!(23:00), "checked"),
    ] {
        fx.persistence
            .touch_entry(log.shift_log_id, slot, text, NOW)
            .unwrap();
    }

    let slots: Vec<time::Time> = fx
        .persistence
        .list_log_entries(log.shift_log_id)
        .unwrap()
        .into_iter()
        .map(|entry| entry.time_slot)
        .collect();
    assert_eq!(slots, vec![time!(20:00), time!(23:00), time!(02:00)]);

    let (_, document) = fx
        .persistence
        .lock_shift_log(log.shift_log_id, &JsonRenderer, NOW)
        .unwrap();
    let data: serde_json::Value = serde_json::from_slice(&document.content).unwrap();
    let rendered: Vec<&str> = data["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["time_slot"].as_str().unwrap())
        .collect();
    assert_eq!(rendered, vec!["20:00", "23:00", "02:00"]);
}

#[test]
fn test_carehome_shift_start_is_used_for_slots() {
    let mut fx: Fixture = setup();
    let early_home: i64 = fx
        .persistence
        .create_carehome("Early Rise", "EE1 1EE", Some(time!(07:00)), None, NOW)
        .unwrap();

    let slots: Vec<time::Time> = fx
        .persistence
        .shift_slots(early_home, ShiftKind::Morning)
        .unwrap();
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[0], time!(07:00));
    assert_eq!(slots[11], time!(18:00));

    let default_night: Vec<time::Time> = fx
        .persistence
        .shift_slots(early_home, ShiftKind::Night)
        .unwrap();
    assert_eq!(default_night[0], time!(20:00));
    assert_eq!(default_night[4], time!(00:00));
}

#[test]
fn test_staff_initials_fall_back_to_login_name() {
    let mut fx: Fixture = setup();
    let log: ShiftLog = started(&mut fx, ShiftKind::Morning);
    assert_eq!(fx.persistence.staff_initials(log.shift_log_id).unwrap(), "JD");

    let nameless: i64 = fx
        .persistence
        .register_staff(
            &new_staff("quill", "", "", Role::Staff, fx.carehome_id),
            NOW,
        )
        .unwrap();
    let mut key: ShiftLogKey = fx.key(ShiftKind::Morning);
    key.staff_id = nameless;
    let (nameless_log, _) = fx.persistence.get_or_create_shift_log(&key, NOW).unwrap();

    assert_eq!(nameless_log.staff_name, "quill");
    assert_eq!(
        fx.persistence
            .staff_initials(nameless_log.shift_log_id)
            .unwrap(),
        "Q"
    );
    assert_eq!(SYSTEM_INITIALS, "SYS");
}
