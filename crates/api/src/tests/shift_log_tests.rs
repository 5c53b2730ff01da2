// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome::Capability;
use carehome_domain::{ShiftKind, ShiftLogStatus};

use super::helpers::{World, create_world};
use crate::{
    ApiError, AuthenticatedActor, LockShiftLogResponse, OpenShiftLogRequest,
    OpenShiftLogResponse, ShiftLogDocumentResponse, ShiftLogResponse, WriteEntryRequest,
    get_shift_log, get_shift_log_document, lock_shift_log, open_shift_log, reopen_shift_log,
    write_entry,
};

fn entry(time_slot: &str, content: &str) -> WriteEntryRequest {
    WriteEntryRequest {
        time_slot: time_slot.to_string(),
        content: content.to_string(),
    }
}

fn open_morning(world: &mut World, actor: &AuthenticatedActor) -> OpenShiftLogResponse {
    let request: OpenShiftLogRequest = world.open_request("morning");
    open_shift_log(&mut world.persistence, actor, &request, &world.clock).unwrap()
}

fn assert_rule(result: Result<impl std::fmt::Debug, ApiError>, expected: &str) {
    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, expected),
        other => panic!("expected rule violation '{expected}', got {other:?}"),
    }
}

#[test]
fn test_open_creates_once_and_lists_slots() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);

    let first: OpenShiftLogResponse = open_morning(&mut world, &staff);
    assert!(first.created);
    assert_eq!(first.log.shift_log.shift, ShiftKind::Morning);
    assert_eq!(first.log.shift_log.staff_name, "Jane Doe");
    assert_eq!(first.log.shift_log.day_of_week, "Monday");
    assert_eq!(first.log.slots.len(), 12);
    assert_eq!(first.log.slots[0], "08:00");
    assert_eq!(first.log.slots[11], "19:00");
    assert!(first.log.entries.is_empty());
    assert_eq!(first.log.capabilities.can_edit, Capability::Allowed);
    assert_eq!(first.log.capabilities.can_lock, Capability::Allowed);
    assert_eq!(first.log.capabilities.can_reopen, Capability::Denied);

    let second: OpenShiftLogResponse = open_morning(&mut world, &staff);
    assert!(!second.created);
    assert_eq!(
        second.log.shift_log.shift_log_id,
        first.log.shift_log.shift_log_id
    );
}

#[test]
fn test_open_rejects_bad_input() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);

    let mut request: OpenShiftLogRequest = world.open_request("afternoon");
    let result = open_shift_log(&mut world.persistence, &staff, &request, &world.clock);
    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "shift"));

    request.shift = String::from("night");
    request.date = String::from("02/03/2026");
    let result = open_shift_log(&mut world.persistence, &staff, &request, &world.clock);
    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "date"));

    request.date = String::from("2026-03-02");
    request.service_user_id = 999;
    let result = open_shift_log(&mut world.persistence, &staff, &request, &world.clock);
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_staff_of_another_carehome_cannot_open_or_view() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    let outsider: AuthenticatedActor = world.actor(world.outsider_id);

    let request: OpenShiftLogRequest = world.open_request("night");
    let result = open_shift_log(&mut world.persistence, &outsider, &request, &world.clock);
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));

    let id: i64 = open_morning(&mut world, &staff).log.shift_log.shift_log_id;
    let result = get_shift_log(&mut world.persistence, &outsider, id);
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_colleague_views_but_cannot_write() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    let colleague: AuthenticatedActor = world.actor(world.colleague_id);
    let id: i64 = open_morning(&mut world, &staff).log.shift_log.shift_log_id;

    let view: ShiftLogResponse = get_shift_log(&mut world.persistence, &colleague, id).unwrap();
    assert_eq!(view.capabilities.can_view, Capability::Allowed);
    assert_eq!(view.capabilities.can_edit, Capability::Denied);

    let result = write_entry(
        &mut world.persistence,
        &colleague,
        id,
        &entry("09:00", "Breakfast"),
        &world.clock,
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_write_lock_and_fetch_document() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    let id: i64 = open_morning(&mut world, &staff).log.shift_log.shift_log_id;

    for (slot, content) in [("09:00", "Breakfast"), ("08:00", "Woke well"), ("09:00", "Toast")] {
        write_entry(&mut world.persistence, &staff, id, &entry(slot, content), &world.clock)
            .unwrap();
    }

    let before = get_shift_log_document(&mut world.persistence, &staff, id);
    assert!(matches!(before, Err(ApiError::ResourceNotFound { .. })));

    let locked: LockShiftLogResponse = lock_shift_log(
        &mut world.persistence,
        &staff,
        id,
        &world.renderer,
        &world.clock,
    )
    .unwrap();
    assert_eq!(locked.shift_log.status, ShiftLogStatus::Locked);
    assert_eq!(locked.file_name, format!("log_pdfs/log_{id}_20260302_211507.txt"));
    assert_eq!(locked.content_type, "text/plain");

    let document: ShiftLogDocumentResponse =
        get_shift_log_document(&mut world.persistence, &staff, id).unwrap();
    let text: String = String::from_utf8(document.content).unwrap();
    assert!(text.contains("Toast"));
    assert!(text.contains("Woke well"));
    assert!(!text.contains("Breakfast"));

    let view: ShiftLogResponse = get_shift_log(&mut world.persistence, &staff, id).unwrap();
    assert_eq!(view.entries.len(), 2);
    assert_eq!(view.entries[0].time_slot, "08:00");
    assert!(view.entries.iter().all(|e| e.is_locked));
}

#[test]
fn test_locked_log_rejects_writes_and_second_lock() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    let id: i64 = open_morning(&mut world, &staff).log.shift_log.shift_log_id;
    write_entry(&mut world.persistence, &staff, id, &entry("10:00", "Walk"), &world.clock)
        .unwrap();
    lock_shift_log(&mut world.persistence, &staff, id, &world.renderer, &world.clock).unwrap();

    assert_rule(
        write_entry(&mut world.persistence, &staff, id, &entry("11:00", "Late"), &world.clock),
        "shift_log_locked",
    );
    assert_rule(
        lock_shift_log(&mut world.persistence, &staff, id, &world.renderer, &world.clock),
        "shift_log_locked",
    );
}

#[test]
fn test_lock_without_entries_is_rejected() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    let id: i64 = open_morning(&mut world, &staff).log.shift_log.shift_log_id;

    assert_rule(
        lock_shift_log(&mut world.persistence, &staff, id, &world.renderer, &world.clock),
        "shift_log_empty",
    );
    let view: ShiftLogResponse = get_shift_log(&mut world.persistence, &staff, id).unwrap();
    assert_eq!(view.shift_log.status, ShiftLogStatus::Incomplete);
}

#[test]
fn test_entry_validation_errors_name_the_field() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    let id: i64 = open_morning(&mut world, &staff).log.shift_log.shift_log_id;

    for (slot, content, field) in [
        ("09:30", "x", "time_slot"),
        ("22:00", "x", "time_slot"),
        ("nine", "x", "time_slot"),
        ("09:00", "  ", "content"),
    ] {
        let result = write_entry(
            &mut world.persistence,
            &staff,
            id,
            &entry(slot, content),
            &world.clock,
        );
        match result {
            Err(ApiError::InvalidInput { field: actual, .. }) => assert_eq!(actual, field),
            other => panic!("expected invalid {field} for '{slot}', got {other:?}"),
        }
    }
}

#[test]
fn test_reopen_requires_lead_or_manager() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    let lead: AuthenticatedActor = world.actor(world.lead_id);
    let id: i64 = open_morning(&mut world, &staff).log.shift_log.shift_log_id;

    assert_rule(
        reopen_shift_log(&mut world.persistence, &lead, id, &world.clock),
        "shift_log_not_locked",
    );

    write_entry(&mut world.persistence, &staff, id, &entry("12:00", "Lunch"), &world.clock)
        .unwrap();
    lock_shift_log(&mut world.persistence, &staff, id, &world.renderer, &world.clock).unwrap();

    let by_author = reopen_shift_log(&mut world.persistence, &staff, id, &world.clock);
    assert!(matches!(by_author, Err(ApiError::Unauthorized { .. })));

    let reopened: ShiftLogResponse =
        reopen_shift_log(&mut world.persistence, &lead, id, &world.clock).unwrap();
    assert_eq!(reopened.shift_log.status, ShiftLogStatus::Incomplete);
    assert_eq!(reopened.capabilities.can_reopen, Capability::Denied);

    write_entry(&mut world.persistence, &staff, id, &entry("12:00", "Lunch, seconds"), &world.clock)
        .unwrap();
}
