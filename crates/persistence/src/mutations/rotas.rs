// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rota mutations.
//!
//! Status changes use a compare-and-set on the stored status so two
//! transitions from the same state can never both commit. Every shift write
//! appends a change log row and every transition appends an approval row in
//! the same transaction.

use carehome::{
    CoreError, RotaCommand, RotaContext, RotaHeader, RotaShift, RotaTransition, ShiftAssignment,
    ensure_revisable, ensure_shift_editable,
};
use carehome_audit::{Actor, RotaApproval, ShiftChange, ShiftChangeAction, ShiftSnapshot};
use carehome_domain::{DomainError, RotaAction, RotaStatus};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::{Date, OffsetDateTime};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::columns::{encode_date, encode_timestamp};
use crate::data_models::{CarehomeData, ShiftInput};
use crate::diesel_schema::{rota_approvals, rotas, shift_change_logs, shifts};
use crate::error::PersistenceError;
use crate::mutations::constraint_error;
use crate::queries::directory::{list_carehome_managers, require_carehome};
use crate::queries::rotas::{get_shift, latest_rota_version, list_shifts, require_rota};

/// Creates a draft rota for a care home and period.
///
/// The version is one more than the highest existing version for the same
/// care home and period start.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `carehome_id` - The care home
/// * `period_start` - First day of the rota
/// * `period_end` - Last day of the rota
/// * `created_by` - The staff member creating it
/// * `now` - Creation time
///
/// # Errors
///
/// Returns an error if the period ends before it starts or the care home
/// does not exist.
pub fn create_rota(
    conn: &mut SqliteConnection,
    carehome_id: i64,
    period_start: Date,
    period_end: Date,
    created_by: Option<i64>,
    now: OffsetDateTime,
) -> Result<RotaHeader, PersistenceError> {
    if period_end < period_start {
        return Err(DomainError::InvalidRotaPeriod {
            period_start,
            period_end,
        }
        .into());
    }
    require_carehome(conn, carehome_id)?;

    let version: i32 = latest_rota_version(conn, carehome_id, period_start)?.unwrap_or(0) + 1;
    let timestamp: String = encode_timestamp(now)?;

    diesel::insert_into(rotas::table)
        .values((
            rotas::carehome_id.eq(carehome_id),
            rotas::period_start.eq(encode_date(period_start)),
            rotas::period_end.eq(encode_date(period_end)),
            rotas::version.eq(version),
            rotas::status.eq(RotaStatus::Draft.as_str()),
            rotas::created_by.eq(created_by),
            rotas::updated_by.eq(created_by),
            rotas::created_at.eq(&timestamp),
            rotas::updated_at.eq(&timestamp),
        ))
        .execute(conn)
        .map_err(|e| constraint_error(e, "Rota"))?;

    let rota_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        rota_id,
        carehome_id,
        period_start = %encode_date(period_start),
        version,
        "Created rota"
    );

    require_rota(conn, rota_id)
}

/// Drafts a new version of a published rota.
///
/// The published rota is left untouched. Its shifts are copied into the new
/// draft, each with a `created` change log entry.
///
/// # Errors
///
/// Returns an error if the rota does not exist or is not published
/// (`NotPublished`).
pub fn revise_rota(
    conn: &mut SqliteConnection,
    rota_id: i64,
    revised_by: Option<i64>,
    now: OffsetDateTime,
) -> Result<RotaHeader, PersistenceError> {
    let published: RotaHeader = require_rota(conn, rota_id)?;
    ensure_revisable(&published)?;

    let revision: RotaHeader = create_rota(
        conn,
        published.carehome_id,
        published.period_start,
        published.period_end,
        revised_by,
        now,
    )?;

    let copied: Vec<RotaShift> = list_shifts(conn, rota_id)?;
    for shift in &copied {
        let input: ShiftInput = ShiftInput {
            shift_id: None,
            shift_date: shift.shift_date,
            shift_type: shift.shift_type,
            staff_id: shift.staff_id,
            service_user_id: shift.service_user_id,
            notes: shift.notes.clone(),
        };
        insert_shift(conn, revision.rota_id, &input, revised_by, now)?;
    }

    info!(
        rota_id,
        revision_id = revision.rota_id,
        version = revision.version,
        shifts = copied.len(),
        "Revised published rota"
    );
    Ok(revision)
}

/// Creates or updates a shift of a rota.
///
/// A change log entry is appended with the shift's new assignment,
/// attributed to `updated_by` or, failing that, `created_by`.
///
/// # Errors
///
/// Returns an error if:
/// - The rota does not exist or its shifts cannot be changed in its status
/// - The shift to update does not belong to the rota
/// - Another shift already covers the same date, kind and service user
pub fn save_shift(
    conn: &mut SqliteConnection,
    rota_id: i64,
    input: &ShiftInput,
    actor_id: Option<i64>,
    now: OffsetDateTime,
) -> Result<RotaShift, PersistenceError> {
    let rota: RotaHeader = require_rota(conn, rota_id)?;
    ensure_shift_editable(&rota)?;

    match input.shift_id {
        None => insert_shift(conn, rota_id, input, actor_id, now),
        Some(shift_id) => update_shift(conn, rota_id, shift_id, input, actor_id, now),
    }
}

fn insert_shift(
    conn: &mut SqliteConnection,
    rota_id: i64,
    input: &ShiftInput,
    actor_id: Option<i64>,
    now: OffsetDateTime,
) -> Result<RotaShift, PersistenceError> {
    let timestamp: String = encode_timestamp(now)?;
    let notes: &str = input.notes.trim();

    diesel::insert_into(shifts::table)
        .values((
            shifts::rota_id.eq(rota_id),
            shifts::shift_date.eq(encode_date(input.shift_date)),
            shifts::shift_type.eq(input.shift_type.as_str()),
            shifts::staff_id.eq(input.staff_id),
            shifts::service_user_id.eq(input.service_user_id),
            shifts::notes.eq(notes),
            shifts::created_by.eq(actor_id),
            shifts::created_at.eq(&timestamp),
            shifts::updated_at.eq(&timestamp),
        ))
        .execute(conn)
        .map_err(|e| constraint_error(e, "Shift"))?;

    let shift_id: i64 = conn.get_last_insert_rowid()?;
    let shift: RotaShift = require_shift(conn, rota_id, shift_id)?;
    record_shift_change(conn, &shift, ShiftChangeAction::Created, now)?;

    info!(shift_id, rota_id, "Created shift");
    Ok(shift)
}

fn update_shift(
    conn: &mut SqliteConnection,
    rota_id: i64,
    shift_id: i64,
    input: &ShiftInput,
    actor_id: Option<i64>,
    now: OffsetDateTime,
) -> Result<RotaShift, PersistenceError> {
    let existing: RotaShift = require_shift(conn, rota_id, shift_id)?;
    let timestamp: String = encode_timestamp(now)?;

    diesel::update(shifts::table)
        .filter(shifts::shift_id.eq(shift_id))
        .set((
            shifts::shift_date.eq(encode_date(input.shift_date)),
            shifts::shift_type.eq(input.shift_type.as_str()),
            shifts::staff_id.eq(input.staff_id),
            shifts::service_user_id.eq(input.service_user_id),
            shifts::notes.eq(input.notes.trim()),
            shifts::updated_by.eq(actor_id.or(existing.updated_by)),
            shifts::updated_at.eq(&timestamp),
        ))
        .execute(conn)
        .map_err(|e| constraint_error(e, "Shift"))?;

    let shift: RotaShift = require_shift(conn, rota_id, shift_id)?;
    record_shift_change(conn, &shift, ShiftChangeAction::Updated, now)?;

    info!(shift_id, rota_id, "Updated shift");
    Ok(shift)
}

/// Deletes a shift of a rota, recording its last assignment.
///
/// # Errors
///
/// Returns an error if the rota or shift does not exist, or the rota's
/// shifts cannot be changed in its status.
pub fn delete_shift(
    conn: &mut SqliteConnection,
    rota_id: i64,
    shift_id: i64,
    actor_id: Option<i64>,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let rota: RotaHeader = require_rota(conn, rota_id)?;
    ensure_shift_editable(&rota)?;

    let mut shift: RotaShift = require_shift(conn, rota_id, shift_id)?;
    shift.updated_by = actor_id.or(shift.updated_by);
    record_shift_change(conn, &shift, ShiftChangeAction::Deleted, now)?;

    diesel::delete(shifts::table)
        .filter(shifts::shift_id.eq(shift_id))
        .execute(conn)?;

    info!(shift_id, rota_id, "Deleted shift");
    Ok(())
}

fn require_shift(
    conn: &mut SqliteConnection,
    rota_id: i64,
    shift_id: i64,
) -> Result<RotaShift, PersistenceError> {
    get_shift(conn, shift_id)?
        .filter(|shift| shift.rota_id == rota_id)
        .ok_or_else(|| PersistenceError::NotFound(format!("Shift {shift_id} of rota {rota_id}")))
}

fn record_shift_change(
    conn: &mut SqliteConnection,
    shift: &RotaShift,
    action: ShiftChangeAction,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let change: ShiftChange = ShiftChange::new(
        shift.shift_id,
        shift.rota_id,
        action,
        ShiftChange::attribute(shift.updated_by, shift.created_by),
        ShiftSnapshot {
            staff_id: shift.staff_id,
            service_user_id: shift.service_user_id,
            notes: shift.notes.clone(),
        },
        now,
    );
    let snapshot_json: String = serde_json::to_string(&change.snapshot)?;

    diesel::insert_into(shift_change_logs::table)
        .values((
            shift_change_logs::shift_id.eq(change.shift_id),
            shift_change_logs::rota_id.eq(change.rota_id),
            shift_change_logs::action.eq(change.action.as_str()),
            shift_change_logs::changed_by.eq(change.changed_by),
            shift_change_logs::snapshot_json.eq(&snapshot_json),
            shift_change_logs::changed_at.eq(encode_timestamp(change.recorded_at)?),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Applies a lifecycle command to a rota and appends its approval record.
///
/// The status update only matches a row still in the status the command
/// was validated against. If another transition committed first, the
/// command is re-validated against the stored status and rejected.
///
/// Notifications are returned, not sent; the caller dispatches them after
/// the transaction commits.
///
/// # Errors
///
/// Returns an error if the rota does not exist or its status does not
/// permit the command (`InvalidTransition`).
pub fn apply_rota_command(
    conn: &mut SqliteConnection,
    rota_id: i64,
    command: RotaCommand,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<RotaTransition, PersistenceError> {
    let rota: RotaHeader = require_rota(conn, rota_id)?;
    let context: RotaContext = load_rota_context(conn, &rota)?;
    let action: RotaAction = command.action();
    let mut transition: RotaTransition =
        carehome::apply_rota_command(&rota, &context, command, actor, now)?;

    let next: &RotaHeader = &transition.rota;
    let updated: usize = diesel::update(rotas::table)
        .filter(rotas::rota_id.eq(rota_id))
        .filter(rotas::status.eq(transition.previous_status.as_str()))
        .set((
            rotas::status.eq(next.status.as_str()),
            rotas::updated_by.eq(next.updated_by),
            rotas::published_by.eq(next.published_by),
            rotas::published_at.eq(next.published_at.map(encode_timestamp).transpose()?),
            rotas::updated_at.eq(encode_timestamp(next.updated_at)?),
        ))
        .execute(conn)?;

    if updated == 0 {
        let current: RotaHeader = require_rota(conn, rota_id)?;
        return Err(CoreError::InvalidTransition {
            rota_id,
            from: current.status,
            action,
        }
        .into());
    }

    let approval_id: i64 = insert_approval(conn, &transition.approval)?;
    transition.approval.approval_id = Some(approval_id);

    info!(
        rota_id,
        from = transition.previous_status.as_str(),
        to = transition.rota.status.as_str(),
        approval_id,
        notifications = transition.notifications.len(),
        "Applied rota transition"
    );
    Ok(transition)
}

fn load_rota_context(
    conn: &mut SqliteConnection,
    rota: &RotaHeader,
) -> Result<RotaContext, PersistenceError> {
    let carehome: CarehomeData = require_carehome(conn, rota.carehome_id)?;
    let manager_ids: Vec<i64> = list_carehome_managers(conn, rota.carehome_id)?;
    let assignments: Vec<ShiftAssignment> = list_shifts(conn, rota.rota_id)?
        .iter()
        .map(RotaShift::assignment)
        .collect();

    Ok(RotaContext {
        carehome_name: carehome.name,
        manager_ids,
        assignments,
    })
}

fn insert_approval(
    conn: &mut SqliteConnection,
    approval: &RotaApproval,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(rota_approvals::table)
        .values((
            rota_approvals::rota_id.eq(approval.rota_id),
            rota_approvals::action.eq(approval.action.as_str()),
            rota_approvals::by_staff_id.eq(approval.actor.staff_id),
            rota_approvals::by_name.eq(&approval.actor.display_name),
            rota_approvals::message.eq(&approval.message),
            rota_approvals::created_at.eq(encode_timestamp(approval.recorded_at)?),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}
