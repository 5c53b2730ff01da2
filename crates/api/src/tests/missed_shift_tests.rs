// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome::{Notification, NotificationKind, Recipient};

use super::helpers::{World, create_world};
use crate::{
    ApiError, AuthenticatedActor, OpenShiftLogRequest, OpenShiftLogResponse,
    ResolveMissedShiftsRequest, ResolveMissedShiftsResponse, ScanMissedShiftsRequest,
    ScanMissedShiftsResponse, open_shift_log, resolve_missed_shifts, scan_missed_shifts,
};

fn scan_request(world: &World) -> ScanMissedShiftsRequest {
    ScanMissedShiftsRequest {
        carehome_id: world.carehome_id,
        date: Some(String::from("2026-03-02")),
    }
}

fn scan(world: &mut World, actor: &AuthenticatedActor) -> ScanMissedShiftsResponse {
    let request: ScanMissedShiftsRequest = scan_request(world);
    scan_missed_shifts(
        &mut world.persistence,
        actor,
        &request,
        &world.clock,
        &world.sink,
    )
    .unwrap()
}

#[test]
fn test_staff_cannot_run_the_sweep() {
    let mut world: World = create_world();
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    let request: ScanMissedShiftsRequest = scan_request(&world);

    let result = scan_missed_shifts(
        &mut world.persistence,
        &staff,
        &request,
        &world.clock,
        &world.sink,
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert!(world.sink.sent().is_empty());
}

#[test]
fn test_sweep_notifies_managers_once() {
    let mut world: World = create_world();
    let manager: AuthenticatedActor = world.actor(world.manager_id);

    let first: ScanMissedShiftsResponse = scan(&mut world, &manager);
    assert_eq!(first.date, "2026-03-02");
    assert_eq!(first.missed.len(), 4);
    assert_eq!(first.notified, 4);
    assert!(first.missed.iter().all(|record| record.is_notified));

    let sent: Vec<Notification> = world.sink.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|n| n.recipient == Recipient::Staff(world.manager_id)));
    assert!(sent.iter().all(|n| n.kind == NotificationKind::MissedShift));
    assert!(sent[0].message.contains("Willow House"));

    let second: ScanMissedShiftsResponse = scan(&mut world, &manager);
    assert_eq!(second.missed.len(), 4);
    assert_eq!(second.notified, 0);
    assert_eq!(world.sink.sent().len(), 4);
}

#[test]
fn test_team_lead_of_another_carehome_is_refused() {
    let mut world: World = create_world();
    let lead: AuthenticatedActor = world.actor(world.lead_id);
    let outsider: AuthenticatedActor = world.actor(world.outsider_id);
    let request: ScanMissedShiftsRequest = scan_request(&world);

    let result = scan_missed_shifts(
        &mut world.persistence,
        &outsider,
        &request,
        &world.clock,
        &world.sink,
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));

    let allowed: ScanMissedShiftsResponse = scan(&mut world, &lead);
    assert_eq!(allowed.missed.len(), 4);
}

#[test]
fn test_default_sweep_date_is_today() {
    let mut world: World = create_world();
    let manager: AuthenticatedActor = world.actor(world.manager_id);
    let request: ScanMissedShiftsRequest = ScanMissedShiftsRequest {
        carehome_id: world.carehome_id,
        date: None,
    };

    let response: ScanMissedShiftsResponse = scan_missed_shifts(
        &mut world.persistence,
        &manager,
        &request,
        &world.clock,
        &world.sink,
    )
    .unwrap();
    assert_eq!(response.date, "2026-03-02");
}

#[test]
fn test_opening_a_log_resolves_the_day() {
    let mut world: World = create_world();
    let manager: AuthenticatedActor = world.actor(world.manager_id);
    let staff: AuthenticatedActor = world.actor(world.staff_id);
    scan(&mut world, &manager);

    let request: OpenShiftLogRequest = world.open_request("night");
    let opened: OpenShiftLogResponse =
        open_shift_log(&mut world.persistence, &staff, &request, &world.clock).unwrap();
    assert!(opened.created);
    assert_eq!(opened.resolved_missed_shifts, 2);

    let after: ScanMissedShiftsResponse = scan(&mut world, &manager);
    assert_eq!(after.missed.len(), 2);
    assert!(
        after
            .missed
            .iter()
            .all(|record| record.service_user_id == world.other_service_user_id)
    );
}

#[test]
fn test_manual_resolve() {
    let mut world: World = create_world();
    let manager: AuthenticatedActor = world.actor(world.manager_id);
    scan(&mut world, &manager);

    let request: ResolveMissedShiftsRequest = ResolveMissedShiftsRequest {
        carehome_id: world.carehome_id,
        service_user_id: world.other_service_user_id,
        date: String::from("2026-03-02"),
    };
    let resolved: ResolveMissedShiftsResponse =
        resolve_missed_shifts(&mut world.persistence, &manager, &request, &world.clock).unwrap();
    assert_eq!(resolved.resolved, 2);

    let again: ResolveMissedShiftsResponse =
        resolve_missed_shifts(&mut world.persistence, &manager, &request, &world.clock).unwrap();
    assert_eq!(again.resolved, 0);
}
