// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome::{CoreError, RenderError, ShiftLogKey};
use carehome_domain::{DomainError, RotaAction, RotaStatus, ShiftKind};
use carehome_persistence::PersistenceError;
use time::macros::date;

use crate::{ApiError, translate_core_error, translate_domain_error, translate_persistence_error};

fn rule_of(err: &ApiError) -> &str {
    match err {
        ApiError::DomainRuleViolation { rule, .. } => rule,
        other => panic!("expected a rule violation, got {other:?}"),
    }
}

#[test]
fn test_duplicate_aggregate_is_a_conflict() {
    let key: ShiftLogKey = ShiftLogKey {
        staff_id: 1,
        carehome_id: 2,
        service_user_id: 3,
        date: date!(2026 - 03 - 02),
        shift: ShiftKind::Night,
    };
    let err: ApiError = translate_core_error(CoreError::DuplicateAggregate(key));
    assert!(matches!(err, ApiError::Conflict { .. }));
}

#[test]
fn test_aggregate_state_errors_name_their_rule() {
    let locked: ApiError = translate_core_error(CoreError::LockedAggregate { shift_log_id: 7 });
    assert_eq!(rule_of(&locked), "shift_log_locked");

    let empty: ApiError = translate_core_error(CoreError::EmptyAggregate { shift_log_id: 7 });
    assert_eq!(rule_of(&empty), "shift_log_empty");

    let unpublished: ApiError = translate_core_error(CoreError::NotPublished { rota_id: 3 });
    assert_eq!(rule_of(&unpublished), "rota_not_published");

    let transition: ApiError = translate_domain_error(DomainError::InvalidTransition {
        from: RotaStatus::Published,
        action: RotaAction::Submit,
    });
    assert_eq!(rule_of(&transition), "rota_transition");
}

#[test]
fn test_render_failure_is_internal() {
    let err: ApiError =
        translate_core_error(CoreError::Render(RenderError::Failed(String::from("no fonts"))));
    match err {
        ApiError::Internal { message } => assert!(message.contains("no fonts")),
        other => panic!("expected internal error, got {other:?}"),
    }
}

#[test]
fn test_permission_denied_is_unauthorized() {
    let err: ApiError = translate_core_error(CoreError::PermissionDenied {
        action: String::from("publish rota 4"),
    });
    assert_eq!(
        err,
        ApiError::Unauthorized {
            action: String::from("publish rota 4"),
        }
    );
}

#[test]
fn test_storage_failures_hide_their_detail() {
    let err: ApiError = translate_persistence_error(PersistenceError::DatabaseError(
        String::from("disk I/O error at /var/lib/carehome.db"),
    ));
    assert_eq!(
        err,
        ApiError::Internal {
            message: String::from("Storage operation failed"),
        }
    );
}

#[test]
fn test_not_found_and_rejections_pass_through() {
    let missing: ApiError =
        translate_persistence_error(PersistenceError::NotFound(String::from("Rota 9")));
    assert!(matches!(missing, ApiError::ResourceNotFound { message, .. } if message == "Rota 9"));

    let rejected: ApiError = translate_persistence_error(PersistenceError::Rejected(
        CoreError::DomainViolation(DomainError::EmptyLogContent),
    ));
    assert!(matches!(rejected, ApiError::InvalidInput { field, .. } if field == "content"));
}

#[test]
fn test_display_names_the_field() {
    let err: ApiError = translate_domain_error(DomainError::InvalidShiftKind(String::from("noon")));
    assert_eq!(
        err.to_string(),
        "Invalid input for field 'shift': Unknown shift 'noon'. Must be 'morning' or 'night'"
    );
}
