// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome_audit::{Actor, ApprovalAction, RotaApproval};
use carehome_domain::{DomainError, RotaAction, RotaStatus, format_date};
use serde_json::json;
use time::OffsetDateTime;

use crate::command::RotaCommand;
use crate::error::CoreError;
use crate::notify::{Notification, NotificationKind, Recipient, fan_out, publish_recipients};
use crate::state::{RotaContext, RotaHeader, RotaTransition};

/// Applies a lifecycle command to a rota, producing the new rota, its
/// approval record and the notifications to send.
///
/// Transitions:
/// - `draft` | `returned` --submit--> `pending_approval`, managers notified
/// - `pending_approval` | `manager_draft` --publish--> `published`, people on
///   the rota notified per the notify mode
/// - `pending_approval` --reject--> `returned`, creator notified
/// - `pending_approval` --begin manager edit--> `manager_draft`, creator
///   notified
///
/// This function performs no I/O.
///
/// # Arguments
///
/// * `rota` - The rota as currently stored
/// * `context` - Care home name, managers and shift assignments
/// * `command` - The command to apply
/// * `actor` - Who is applying it
/// * `now` - The transition time
///
/// # Errors
///
/// Returns `CoreError::InvalidTransition` if the rota's status does not
/// permit the command.
pub fn apply_rota_command(
    rota: &RotaHeader,
    context: &RotaContext,
    command: RotaCommand,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<RotaTransition, CoreError> {
    let action: RotaAction = command.action();
    let next_status: RotaStatus = rota.status.apply(action).map_err(|e| match e {
        DomainError::InvalidTransition { from, action } => CoreError::InvalidTransition {
            rota_id: rota.rota_id,
            from,
            action,
        },
        other => CoreError::DomainViolation(other),
    })?;

    let mut next: RotaHeader = rota.clone();
    next.status = next_status;
    next.updated_by = actor.staff_id.or(rota.updated_by);
    next.updated_at = now;

    let payload: serde_json::Value = json!({
        "rota_id": rota.rota_id,
        "carehome_id": rota.carehome_id,
        "period_start": format_date(rota.period_start),
        "version": rota.version,
    });
    let creator: Option<Recipient> = rota.created_by.map(Recipient::Staff);

    let (message, notifications): (String, Vec<Notification>) = match command {
        RotaCommand::Submit => (
            format!("Submitted for approval by {}", actor.display_name),
            fan_out(
                context.manager_ids.iter().copied().map(Recipient::Staff),
                NotificationKind::RotaSubmitted,
                "Rota Submitted",
                &format!(
                    "Rota for {} starting {} is awaiting approval",
                    context.carehome_name,
                    format_date(rota.period_start)
                ),
                &payload,
            ),
        ),
        RotaCommand::Publish { notify } => {
            next.published_by = actor.staff_id;
            next.published_at = Some(now);
            (
                format!(
                    "Published by {} (notify={})",
                    actor.display_name,
                    notify.as_str()
                ),
                fan_out(
                    publish_recipients(&context.assignments, notify),
                    NotificationKind::RotaPublished,
                    "Rota Published",
                    &format!(
                        "Rota for {} published for {}",
                        context.carehome_name,
                        format_date(rota.period_start)
                    ),
                    &payload,
                ),
            )
        }
        RotaCommand::Reject { message } => {
            let reason: Option<String> = message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty());
            let notice: String = reason
                .clone()
                .unwrap_or_else(|| String::from("Please revise the rota"));
            (
                reason.unwrap_or_else(|| format!("Rejected by {}", actor.display_name)),
                fan_out(
                    creator,
                    NotificationKind::RotaRejected,
                    "Rota Rejected",
                    &notice,
                    &payload,
                ),
            )
        }
        RotaCommand::BeginManagerEdit => (
            format!("Manager editing started by {}", actor.display_name),
            fan_out(
                creator,
                NotificationKind::RotaManagerDraft,
                "Rota Under Manager Review",
                &format!(
                    "{} is editing the rota for {} before publishing",
                    actor.display_name, context.carehome_name
                ),
                &payload,
            ),
        ),
    };

    let approval: RotaApproval = RotaApproval::new(
        rota.rota_id,
        ApprovalAction::from(action),
        actor.clone(),
        message,
        now,
    );

    Ok(RotaTransition {
        rota: next,
        previous_status: rota.status,
        approval,
        notifications,
    })
}

/// Checks that shifts of `rota` may be created, updated or deleted.
///
/// # Errors
///
/// Returns `DomainError::RotaNotEditable` while the rota is awaiting
/// approval or published.
pub fn ensure_shift_editable(rota: &RotaHeader) -> Result<(), CoreError> {
    if rota.status.allows_shift_edits() {
        Ok(())
    } else {
        Err(CoreError::DomainViolation(DomainError::RotaNotEditable {
            rota_id: rota.rota_id,
            status: rota.status,
        }))
    }
}

/// Checks that a new version may be drafted from `rota`.
///
/// Published rotas are never edited in place; a revision copies them into a
/// new draft version.
///
/// # Errors
///
/// Returns `CoreError::NotPublished` if the rota is not published.
pub const fn ensure_revisable(rota: &RotaHeader) -> Result<(), CoreError> {
    match rota.status {
        RotaStatus::Published => Ok(()),
        _ => Err(CoreError::NotPublished {
            rota_id: rota.rota_id,
        }),
    }
}
