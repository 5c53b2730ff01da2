// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome::CoreError;
use carehome_domain::{DomainError, Role, ShiftKind};
use time::macros::time;

use super::{Fixture, NOW, new_staff, setup};
use crate::{
    BootstrapManager, BootstrapOutcome, CarehomeData, Persistence, PersistenceError, StaffData,
};

#[test]
fn test_carehome_round_trip_normalises_postcode() {
    let mut fx: Fixture = setup();
    let carehome: CarehomeData = fx.persistence.get_carehome(fx.carehome_id).unwrap().unwrap();

    assert_eq!(carehome.name, "Willow House");
    assert_eq!(carehome.postcode, "AB1 2CD");
    assert!(carehome.morning_shift_start.is_none());
    assert!(carehome.night_shift_start.is_none());
    assert_eq!(
        fx.persistence
            .shift_start(fx.carehome_id, ShiftKind::Morning)
            .unwrap(),
        time!(08:00)
    );
}

#[test]
fn test_duplicate_carehome_name_conflicts() {
    let mut fx: Fixture = setup();
    let result = fx
        .persistence
        .create_carehome("Willow House", "XX1 1XX", None, None, NOW);
    assert!(matches!(result, Err(PersistenceError::Conflict(_))));
}

#[test]
fn test_blank_names_are_rejected() {
    let mut fx: Fixture = setup();

    let carehome = fx.persistence.create_carehome("  ", "XX1 1XX", None, None, NOW);
    assert!(matches!(
        carehome,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::InvalidName(_)
        )))
    ));

    let service_user = fx
        .persistence
        .register_service_user(fx.carehome_id, " ", "", NOW);
    assert!(matches!(
        service_user,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::InvalidName(_)
        )))
    ));
}

#[test]
fn test_staff_round_trip() {
    let mut fx: Fixture = setup();
    let lead: StaffData = fx.persistence.get_staff(fx.team_lead_id).unwrap().unwrap();

    assert_eq!(lead.login_name, "llead");
    assert_eq!(lead.role, Role::TeamLead);
    assert_eq!(lead.carehome_id, Some(fx.carehome_id));
    assert!(lead.is_active);
    assert!(!lead.is_superuser);
    assert!(fx.persistence.get_staff(999).unwrap().is_none());
}

#[test]
fn test_duplicate_login_conflicts() {
    let mut fx: Fixture = setup();
    let result = fx.persistence.register_staff(
        &new_staff("jdoe", "Janet", "Doe", Role::Staff, fx.carehome_id),
        NOW,
    );
    assert!(matches!(result, Err(PersistenceError::Conflict(_))));
}

#[test]
fn test_service_user_for_missing_carehome_is_not_found() {
    let mut fx: Fixture = setup();
    let result = fx.persistence.register_service_user(999, "No", "Home", NOW);
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_manager_assignment_is_idempotent() {
    let mut fx: Fixture = setup();
    fx.persistence
        .assign_carehome_manager(fx.carehome_id, fx.manager_id)
        .unwrap();

    assert_eq!(
        fx.persistence
            .list_carehome_managers(fx.carehome_id)
            .unwrap(),
        vec![fx.manager_id]
    );
}

#[test]
fn test_service_users_listed_in_id_order() {
    let mut fx: Fixture = setup();
    let ids: Vec<i64> = fx
        .persistence
        .list_service_users(fx.carehome_id)
        .unwrap()
        .into_iter()
        .map(|su| su.service_user_id)
        .collect();
    assert_eq!(ids, vec![fx.service_user_id, fx.other_service_user_id]);
}

fn bootstrap_request(carehome_name: &str, login_name: &str) -> BootstrapManager {
    BootstrapManager {
        carehome_name: carehome_name.to_string(),
        postcode: String::from("cd3 4ef"),
        login_name: login_name.to_string(),
        first_name: String::from("Ada"),
        last_name: String::from("Admin"),
    }
}

#[test]
fn test_bootstrap_creates_carehome_and_assigned_manager() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let outcome: BootstrapOutcome = persistence
        .bootstrap_manager(&bootstrap_request("Rowan Court", "admin"), NOW)
        .unwrap();

    assert!(outcome.created);
    let manager: StaffData = persistence.get_staff(outcome.staff_id).unwrap().unwrap();
    assert_eq!(manager.role, Role::Manager);
    assert!(manager.is_superuser);
    assert!(manager.is_active);
    assert_eq!(
        persistence.list_carehome_managers(outcome.carehome_id).unwrap(),
        vec![outcome.staff_id]
    );
    let carehome: CarehomeData = persistence
        .get_carehome(outcome.carehome_id)
        .unwrap()
        .unwrap();
    assert_eq!(carehome.name, "Rowan Court");
    assert_eq!(carehome.postcode, "CD3 4EF");
}

#[test]
fn test_bootstrap_twice_reuses_existing_rows() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let first: BootstrapOutcome = persistence
        .bootstrap_manager(&bootstrap_request("Rowan Court", "admin"), NOW)
        .unwrap();
    let second: BootstrapOutcome = persistence
        .bootstrap_manager(&bootstrap_request("Rowan Court", "admin"), NOW)
        .unwrap();

    assert!(!second.created);
    assert_eq!(second.staff_id, first.staff_id);
    assert_eq!(second.carehome_id, first.carehome_id);
    assert_eq!(
        persistence.list_carehome_managers(first.carehome_id).unwrap(),
        vec![first.staff_id]
    );
}

#[test]
fn test_bootstrap_assigns_existing_carehome() {
    let mut fx: Fixture = setup();

    let outcome: BootstrapOutcome = fx
        .persistence
        .bootstrap_manager(&bootstrap_request("Willow House", "admin"), NOW)
        .unwrap();

    assert_eq!(outcome.carehome_id, fx.carehome_id);
    assert_eq!(
        fx.persistence
            .list_carehome_managers(fx.carehome_id)
            .unwrap(),
        vec![fx.manager_id, outcome.staff_id]
    );
}

#[test]
fn test_bootstrap_refuses_non_manager_login() {
    let mut fx: Fixture = setup();

    let result = fx
        .persistence
        .bootstrap_manager(&bootstrap_request("Willow House", "jdoe"), NOW);

    assert!(matches!(result, Err(PersistenceError::Conflict(_))));
    let jane: StaffData = fx.persistence.find_staff_by_login("jdoe").unwrap().unwrap();
    assert_eq!(jane.staff_id, fx.staff_id);
    assert_eq!(jane.role, Role::Staff);
    assert_eq!(
        fx.persistence
            .list_carehome_managers(fx.carehome_id)
            .unwrap(),
        vec![fx.manager_id]
    );
}
