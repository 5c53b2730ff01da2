// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome_audit::Actor;
use carehome_domain::Role;

use super::helpers::{World, create_world};
use crate::{ApiError, AuthenticatedActor, authenticate_stub};

#[test]
fn test_authenticate_resolves_role_and_carehome() {
    let mut world: World = create_world();

    let actor: AuthenticatedActor =
        authenticate_stub(&mut world.persistence, world.lead_id).unwrap();
    assert_eq!(actor.staff_id(), world.lead_id);
    assert_eq!(actor.context.role, Role::TeamLead);
    assert_eq!(actor.context.carehome_id, Some(world.carehome_id));
    assert!(!actor.context.is_superuser);
    assert_eq!(actor.display_name, "Lee Lead");
}

#[test]
fn test_manager_has_no_home_carehome() {
    let mut world: World = create_world();

    let actor: AuthenticatedActor =
        authenticate_stub(&mut world.persistence, world.manager_id).unwrap();
    assert_eq!(actor.context.role, Role::Manager);
    assert_eq!(actor.context.carehome_id, None);
}

#[test]
fn test_unknown_staff_fails_authentication() {
    let mut world: World = create_world();

    let result = authenticate_stub(&mut world.persistence, 4242);
    match result {
        Err(ApiError::AuthenticationFailed { reason }) => assert!(reason.contains("4242")),
        other => panic!("expected authentication failure, got {other:?}"),
    }
}

#[test]
fn test_audit_actor_carries_display_name() {
    let mut world: World = create_world();
    let actor: AuthenticatedActor = world.actor(world.staff_id);

    let audit: Actor = actor.to_audit_actor();
    assert_eq!(audit, Actor::new(world.staff_id, String::from("Jane Doe")));
}
