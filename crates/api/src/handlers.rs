// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Each handler receives an already authenticated actor, checks the
//! capability for the action, runs the persistence operation and translates
//! errors. Notifications go out only after the persistence transaction has
//! committed.
//!
//! When an action is refused, a wrong aggregate state is reported ahead of a
//! missing capability so that callers see `LockedAggregate` or
//! `InvalidTransition` rather than a generic refusal.

use carehome::{
    Capability, Clock, CoreError, DocumentRenderer, LogEntry, MissedShift, Notification,
    NotificationSink, RotaCommand, RotaHeader, RotaShift, RotaTransition, ShiftLog, ShiftLogKey,
    can_begin_manager_edit, can_create_rota, can_edit_rota, can_edit_shift_log,
    can_lock_shift_log, can_open_shift_log, can_publish_rota, can_reject_rota,
    can_reopen_shift_log, can_revise_rota, can_scan_missed_shifts, can_submit_rota,
    can_view_rota, can_view_shift_log, compute_rota_capabilities, compute_shift_log_capabilities,
    dispatch, missed_shift_notifications,
};
use carehome_domain::{
    DomainError, NotifyMode, RotaAction, RotaStatus, ShiftKind, format_date, format_time_of_day,
    parse_date, parse_time_of_day,
};
use carehome_persistence::{
    CarehomeData, Persistence, ServiceUserData, ShiftInput, ShiftLogDocumentData,
};
use time::{Date, OffsetDateTime, Time};
use tracing::info;

use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{
    ApprovalInfo, CreateRotaRequest, LockShiftLogResponse, LogEntryInfo, MissedShiftInfo,
    OpenShiftLogRequest, OpenShiftLogResponse, PublishRotaRequest, RejectRotaRequest,
    ResolveMissedShiftsRequest, ResolveMissedShiftsResponse, RotaDetailResponse, RotaInfo,
    RotaResponse, RotaTransitionResponse, SaveShiftRequest, ScanMissedShiftsRequest,
    ScanMissedShiftsResponse, ShiftChangeInfo, ShiftInfo, ShiftLogDocumentResponse, ShiftLogInfo,
    ShiftLogResponse, WriteEntryRequest,
};

// ============================================================================
// Input parsing
// ============================================================================

fn parse_date_field(value: &str, field: &str) -> Result<Date, ApiError> {
    parse_date(value).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: e.to_string(),
    })
}

fn parse_shift_field(value: &str, field: &str) -> Result<ShiftKind, ApiError> {
    value.parse::<ShiftKind>().map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Lookups
// ============================================================================

fn require_shift_log(
    persistence: &mut Persistence,
    shift_log_id: i64,
) -> Result<ShiftLog, ApiError> {
    persistence
        .get_shift_log(shift_log_id)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Shift log"),
            message: format!("Shift log {shift_log_id} does not exist"),
        })
}

fn require_rota(persistence: &mut Persistence, rota_id: i64) -> Result<RotaHeader, ApiError> {
    persistence
        .get_rota(rota_id)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Rota"),
            message: format!("Rota {rota_id} does not exist"),
        })
}

fn require_viewable_shift_log(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    shift_log_id: i64,
) -> Result<ShiftLog, ApiError> {
    let log: ShiftLog = require_shift_log(persistence, shift_log_id)?;
    can_view_shift_log(&actor.context, &log).require("view this shift log")?;
    Ok(log)
}

fn require_viewable_rota(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
) -> Result<RotaHeader, ApiError> {
    let rota: RotaHeader = require_rota(persistence, rota_id)?;
    can_view_rota(&actor.context, &rota).require("view this rota")?;
    Ok(rota)
}

fn shift_log_response(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    log: &ShiftLog,
) -> Result<ShiftLogResponse, ApiError> {
    let slots: Vec<Time> = persistence.shift_slots(log.key.carehome_id, log.key.shift)?;
    let entries: Vec<LogEntry> = persistence.list_log_entries(log.shift_log_id)?;

    Ok(ShiftLogResponse {
        shift_log: ShiftLogInfo::from(log),
        slots: slots.into_iter().map(format_time_of_day).collect(),
        entries: entries.iter().map(LogEntryInfo::from).collect(),
        capabilities: compute_shift_log_capabilities(&actor.context, log),
    })
}

// ============================================================================
// Shift logs
// ============================================================================

/// Opens the caller's shift log for a service user, date and shift.
///
/// The log is created on first open. Opening a log also clears any
/// missed-shift records for the service user and date.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `actor` - The authenticated actor, who becomes the log's author
/// * `request` - The service user, date and shift
/// * `clock` - Source of the current time
///
/// # Errors
///
/// Returns an error if:
/// - The date or shift cannot be parsed
/// - The service user does not exist
/// - The actor does not work at the service user's care home
pub fn open_shift_log(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &OpenShiftLogRequest,
    clock: &dyn Clock,
) -> Result<OpenShiftLogResponse, ApiError> {
    let date: Date = parse_date_field(&request.date, "date")?;
    let shift: ShiftKind = parse_shift_field(&request.shift, "shift")?;

    let service_user: ServiceUserData = persistence
        .get_service_user(request.service_user_id)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Service user"),
            message: format!("Service user {} does not exist", request.service_user_id),
        })?;
    can_open_shift_log(&actor.context, service_user.carehome_id)
        .require("open a shift log for this service user")?;

    let key: ShiftLogKey = ShiftLogKey {
        staff_id: actor.staff_id(),
        carehome_id: service_user.carehome_id,
        service_user_id: service_user.service_user_id,
        date,
        shift,
    };
    let now: OffsetDateTime = clock.now();

    let (log, created): (ShiftLog, bool) = persistence.get_or_create_shift_log(&key, now)?;
    let resolved: usize = persistence.resolve_missed_shifts(
        key.carehome_id,
        key.service_user_id,
        key.date,
        now,
    )?;

    info!(
        shift_log_id = log.shift_log_id,
        staff_id = key.staff_id,
        created,
        resolved_missed_shifts = resolved,
        "Opened shift log"
    );

    Ok(OpenShiftLogResponse {
        created,
        resolved_missed_shifts: resolved,
        log: shift_log_response(persistence, actor, &log)?,
    })
}

/// Returns a shift log with its slots, entries and the caller's capabilities.
///
/// # Errors
///
/// Returns an error if the log does not exist or the actor may not view it.
pub fn get_shift_log(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    shift_log_id: i64,
) -> Result<ShiftLogResponse, ApiError> {
    let log: ShiftLog = require_viewable_shift_log(persistence, actor, shift_log_id)?;
    shift_log_response(persistence, actor, &log)
}

/// Writes one time slot of a shift log. Last write wins.
///
/// # Errors
///
/// Returns an error if:
/// - The log does not exist or the actor may not view it
/// - The log is locked
/// - The actor is not the log's author
/// - The slot is not part of the shift or the content is empty
pub fn write_entry(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    shift_log_id: i64,
    request: &WriteEntryRequest,
    clock: &dyn Clock,
) -> Result<LogEntryInfo, ApiError> {
    let slot: Time = parse_time_of_day(&request.time_slot).map_err(translate_domain_error)?;
    let log: ShiftLog = require_viewable_shift_log(persistence, actor, shift_log_id)?;

    if log.is_locked() {
        return Err(CoreError::LockedAggregate { shift_log_id }.into());
    }
    can_edit_shift_log(&actor.context, &log).require("write to this shift log")?;

    let entry: LogEntry =
        persistence.touch_entry(shift_log_id, slot, &request.content, clock.now())?;
    Ok(LogEntryInfo::from(&entry))
}

/// Locks a shift log and stores its rendered document.
///
/// # Errors
///
/// Returns an error if:
/// - The log does not exist or the actor may not view it
/// - The log is already locked or has no entries
/// - The actor is neither the author nor a manager
/// - Rendering fails, in which case nothing is locked
pub fn lock_shift_log(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    shift_log_id: i64,
    renderer: &dyn DocumentRenderer,
    clock: &dyn Clock,
) -> Result<LockShiftLogResponse, ApiError> {
    let log: ShiftLog = require_viewable_shift_log(persistence, actor, shift_log_id)?;

    if log.is_locked() {
        return Err(CoreError::LockedAggregate { shift_log_id }.into());
    }
    can_lock_shift_log(&actor.context, &log).require("lock this shift log")?;

    let (locked, document): (ShiftLog, ShiftLogDocumentData) =
        persistence.lock_shift_log(shift_log_id, renderer, clock.now())?;

    info!(
        shift_log_id,
        staff_id = actor.staff_id(),
        file_name = %document.file_name,
        "Locked shift log"
    );

    Ok(LockShiftLogResponse {
        shift_log: ShiftLogInfo::from(&locked),
        document_id: document.document_id,
        file_name: document.file_name,
        content_type: document.content_type,
    })
}

/// Reopens a locked shift log for further writing.
///
/// # Errors
///
/// Returns an error if:
/// - The log does not exist or the actor may not view it
/// - The log is not locked
/// - The actor is neither a manager nor the care home's team lead
pub fn reopen_shift_log(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    shift_log_id: i64,
    clock: &dyn Clock,
) -> Result<ShiftLogResponse, ApiError> {
    let log: ShiftLog = require_viewable_shift_log(persistence, actor, shift_log_id)?;

    if !log.is_locked() {
        return Err(CoreError::NotLocked { shift_log_id }.into());
    }
    can_reopen_shift_log(&actor.context, &log).require("reopen this shift log")?;

    let reopened: ShiftLog = persistence.reopen_shift_log(shift_log_id, clock.now())?;
    info!(shift_log_id, staff_id = actor.staff_id(), "Reopened shift log");
    shift_log_response(persistence, actor, &reopened)
}

/// Returns the document produced by the most recent lock.
///
/// # Errors
///
/// Returns an error if the log does not exist, the actor may not view it, or
/// it has never been locked.
pub fn get_shift_log_document(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    shift_log_id: i64,
) -> Result<ShiftLogDocumentResponse, ApiError> {
    require_viewable_shift_log(persistence, actor, shift_log_id)?;

    let document: ShiftLogDocumentData = persistence
        .get_shift_log_document(shift_log_id)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Document"),
            message: format!("Shift log {shift_log_id} has not been locked"),
        })?;

    Ok(ShiftLogDocumentResponse {
        file_name: document.file_name,
        content_type: document.content_type,
        content: document.content,
    })
}

// ============================================================================
// Missed shifts
// ============================================================================

/// Runs the missed-shift sweep for a care home and day, then tells the care
/// home's managers about records they have not yet heard about.
///
/// Records are flagged as notified only when at least one notification was
/// dispatched for them.
///
/// # Errors
///
/// Returns an error if the date cannot be parsed, the care home does not
/// exist, or the actor may not run the sweep for it.
pub fn scan_missed_shifts(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ScanMissedShiftsRequest,
    clock: &dyn Clock,
    sink: &dyn NotificationSink,
) -> Result<ScanMissedShiftsResponse, ApiError> {
    let date: Date = match &request.date {
        Some(value) => parse_date_field(value, "date")?,
        None => clock.today(),
    };
    can_scan_missed_shifts(&actor.context, request.carehome_id)
        .require("scan for missed shifts")?;

    let missed: Vec<MissedShift> =
        persistence.scan_missed_shifts(request.carehome_id, date, clock.now())?;

    let carehome: CarehomeData = persistence
        .get_carehome(request.carehome_id)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Care home"),
            message: format!("Care home {} does not exist", request.carehome_id),
        })?;
    let managers: Vec<i64> = persistence.list_carehome_managers(request.carehome_id)?;

    let notifications: Vec<Notification> =
        missed_shift_notifications(&carehome.name, &missed, &managers);
    let notified: usize = dispatch(sink, &notifications);

    if notified > 0 {
        let fresh: Vec<i64> = missed
            .iter()
            .filter(|record| !record.is_notified)
            .map(|record| record.missed_shift_id)
            .collect();
        persistence.mark_missed_shifts_notified(&fresh)?;
    }

    let after: Vec<MissedShift> =
        persistence.list_unresolved_missed_shifts(request.carehome_id, Some(date))?;

    info!(
        carehome_id = request.carehome_id,
        date = %format_date(date),
        missed = after.len(),
        notified,
        "Missed-shift sweep complete"
    );

    Ok(ScanMissedShiftsResponse {
        carehome_id: request.carehome_id,
        date: format_date(date),
        missed: after.iter().map(MissedShiftInfo::from).collect(),
        notified,
    })
}

/// Clears missed-shift records for a service user and day.
///
/// # Errors
///
/// Returns an error if the date cannot be parsed or the actor may not manage
/// missed shifts for the care home.
pub fn resolve_missed_shifts(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ResolveMissedShiftsRequest,
    clock: &dyn Clock,
) -> Result<ResolveMissedShiftsResponse, ApiError> {
    let date: Date = parse_date_field(&request.date, "date")?;
    can_scan_missed_shifts(&actor.context, request.carehome_id)
        .require("resolve missed shifts")?;

    let resolved: usize = persistence.resolve_missed_shifts(
        request.carehome_id,
        request.service_user_id,
        date,
        clock.now(),
    )?;
    Ok(ResolveMissedShiftsResponse { resolved })
}

// ============================================================================
// Rotas
// ============================================================================

/// Starts a new draft rota for a care home and period.
///
/// # Errors
///
/// Returns an error if the dates cannot be parsed or are reversed, the care
/// home does not exist, or the actor may not create rotas for it.
pub fn create_rota(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateRotaRequest,
    clock: &dyn Clock,
) -> Result<RotaResponse, ApiError> {
    let period_start: Date = parse_date_field(&request.period_start, "period_start")?;
    let period_end: Date = parse_date_field(&request.period_end, "period_end")?;
    can_create_rota(&actor.context, request.carehome_id).require("create a rota")?;

    let rota: RotaHeader = persistence.create_rota(
        request.carehome_id,
        period_start,
        period_end,
        Some(actor.staff_id()),
        clock.now(),
    )?;

    Ok(RotaResponse {
        rota: RotaInfo::from(&rota),
        capabilities: compute_rota_capabilities(&actor.context, &rota),
    })
}

fn require_shift_edit(actor: &AuthenticatedActor, rota: &RotaHeader) -> Result<(), ApiError> {
    if !rota.status.allows_shift_edits() {
        return Err(translate_domain_error(DomainError::RotaNotEditable {
            rota_id: rota.rota_id,
            status: rota.status,
        }));
    }
    can_edit_rota(&actor.context, rota).require("edit this rota")?;
    Ok(())
}

/// Creates or updates one shift of a rota.
///
/// # Errors
///
/// Returns an error if:
/// - The rota does not exist or the actor may not view it
/// - The rota's status does not allow shift edits
/// - The actor may not edit the rota
/// - The shift collides with an existing one
pub fn save_shift(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
    request: &SaveShiftRequest,
    clock: &dyn Clock,
) -> Result<ShiftInfo, ApiError> {
    let input: ShiftInput = ShiftInput {
        shift_id: request.shift_id,
        shift_date: parse_date_field(&request.shift_date, "shift_date")?,
        shift_type: parse_shift_field(&request.shift_type, "shift_type")?,
        staff_id: request.staff_id,
        service_user_id: request.service_user_id,
        notes: request.notes.clone(),
    };

    let rota: RotaHeader = require_viewable_rota(persistence, actor, rota_id)?;
    require_shift_edit(actor, &rota)?;

    let shift: RotaShift =
        persistence.save_shift(rota_id, &input, Some(actor.staff_id()), clock.now())?;
    Ok(ShiftInfo::from(&shift))
}

/// Deletes one shift of a rota, recording the deletion in the change log.
///
/// # Errors
///
/// Returns an error under the same conditions as `save_shift`, or if the
/// shift does not belong to the rota.
pub fn delete_shift(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
    shift_id: i64,
    clock: &dyn Clock,
) -> Result<(), ApiError> {
    let rota: RotaHeader = require_viewable_rota(persistence, actor, rota_id)?;
    require_shift_edit(actor, &rota)?;

    persistence.delete_shift(rota_id, shift_id, Some(actor.staff_id()), clock.now())?;
    Ok(())
}

fn rota_action_capability(
    actor: &AuthenticatedActor,
    rota: &RotaHeader,
    action: RotaAction,
) -> Capability {
    match action {
        RotaAction::Submit => can_submit_rota(&actor.context, rota),
        RotaAction::Publish => can_publish_rota(&actor.context, rota),
        RotaAction::Reject => can_reject_rota(&actor.context, rota),
        RotaAction::BeginManagerEdit => can_begin_manager_edit(&actor.context, rota),
    }
}

/// Applies a lifecycle command to a rota and dispatches the resulting
/// notifications once the transition has committed.
///
/// # Errors
///
/// Returns an error if:
/// - The rota does not exist or the actor may not view it
/// - The rota's status does not permit the action
/// - The actor's capabilities do not include the action
pub fn transition_rota(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
    command: RotaCommand,
    clock: &dyn Clock,
    sink: &dyn NotificationSink,
) -> Result<RotaTransitionResponse, ApiError> {
    let rota: RotaHeader = require_viewable_rota(persistence, actor, rota_id)?;
    let action: RotaAction = command.action();

    if !RotaStatus::sources_for(action).contains(&rota.status) {
        return Err(CoreError::InvalidTransition {
            rota_id,
            from: rota.status,
            action,
        }
        .into());
    }
    rota_action_capability(actor, &rota, action)
        .require(&format!("{} rota {rota_id}", action.as_str()))?;

    let transition: RotaTransition =
        persistence.apply_rota_command(rota_id, command, &actor.to_audit_actor(), clock.now())?;
    let notified: usize = dispatch(sink, &transition.notifications);

    info!(
        rota_id,
        from = transition.previous_status.as_str(),
        to = transition.rota.status.as_str(),
        notified,
        "Rota transition committed"
    );

    Ok(RotaTransitionResponse {
        rota: RotaInfo::from(&transition.rota),
        previous_status: transition.previous_status,
        approval: ApprovalInfo::from(&transition.approval),
        notified,
    })
}

/// Submits a draft or returned rota for approval.
///
/// # Errors
///
/// See `transition_rota`.
pub fn submit_rota(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
    clock: &dyn Clock,
    sink: &dyn NotificationSink,
) -> Result<RotaTransitionResponse, ApiError> {
    transition_rota(persistence, actor, rota_id, RotaCommand::Submit, clock, sink)
}

/// Publishes a rota, notifying the requested audience.
///
/// # Errors
///
/// Returns an error if the notify mode is unknown, otherwise see
/// `transition_rota`.
pub fn publish_rota(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
    request: &PublishRotaRequest,
    clock: &dyn Clock,
    sink: &dyn NotificationSink,
) -> Result<RotaTransitionResponse, ApiError> {
    let notify: NotifyMode = request
        .notify
        .as_deref()
        .map(str::parse::<NotifyMode>)
        .transpose()
        .map_err(translate_domain_error)?
        .unwrap_or_default();

    transition_rota(
        persistence,
        actor,
        rota_id,
        RotaCommand::Publish { notify },
        clock,
        sink,
    )
}

/// Returns a pending rota to its team lead.
///
/// # Errors
///
/// See `transition_rota`.
pub fn reject_rota(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
    request: &RejectRotaRequest,
    clock: &dyn Clock,
    sink: &dyn NotificationSink,
) -> Result<RotaTransitionResponse, ApiError> {
    let command: RotaCommand = RotaCommand::Reject {
        message: request.message.clone(),
    };
    transition_rota(persistence, actor, rota_id, command, clock, sink)
}

/// Takes a pending rota over for manager edits.
///
/// # Errors
///
/// See `transition_rota`.
pub fn begin_manager_edit(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
    clock: &dyn Clock,
    sink: &dyn NotificationSink,
) -> Result<RotaTransitionResponse, ApiError> {
    transition_rota(
        persistence,
        actor,
        rota_id,
        RotaCommand::BeginManagerEdit,
        clock,
        sink,
    )
}

/// Starts a new draft version of a published rota, copying its shifts.
///
/// # Errors
///
/// Returns an error if the rota does not exist, is not published, or the
/// actor may not revise it.
pub fn revise_rota(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
    clock: &dyn Clock,
) -> Result<RotaResponse, ApiError> {
    let rota: RotaHeader = require_viewable_rota(persistence, actor, rota_id)?;

    if rota.status != RotaStatus::Published {
        return Err(CoreError::NotPublished { rota_id }.into());
    }
    can_revise_rota(&actor.context, &rota).require("revise this rota")?;

    let revision: RotaHeader =
        persistence.revise_rota(rota_id, Some(actor.staff_id()), clock.now())?;

    Ok(RotaResponse {
        rota: RotaInfo::from(&revision),
        capabilities: compute_rota_capabilities(&actor.context, &revision),
    })
}

/// Returns a rota with its shifts, audit trails and the caller's capabilities.
///
/// # Errors
///
/// Returns an error if the rota does not exist or the actor may not view it.
pub fn get_rota(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    rota_id: i64,
) -> Result<RotaDetailResponse, ApiError> {
    let rota: RotaHeader = require_viewable_rota(persistence, actor, rota_id)?;

    let shifts: Vec<ShiftInfo> = persistence
        .list_shifts(rota_id)?
        .iter()
        .map(ShiftInfo::from)
        .collect();
    let approvals: Vec<ApprovalInfo> = persistence
        .list_rota_approvals(rota_id)?
        .iter()
        .map(ApprovalInfo::from)
        .collect();
    let changes: Vec<ShiftChangeInfo> = persistence
        .list_shift_changes(rota_id)?
        .iter()
        .map(ShiftChangeInfo::from)
        .collect();

    Ok(RotaDetailResponse {
        rota: RotaInfo::from(&rota),
        shifts,
        approvals,
        changes,
        capabilities: compute_rota_capabilities(&actor.context, &rota),
    })
}
