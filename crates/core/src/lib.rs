// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Shift log and rota lifecycle engine.
//!
//! Everything in this crate is pure: it decides what a transition does and
//! what it produces, and leaves storage and delivery to the caller.

mod apply;
mod capabilities;
mod clock;
mod command;
mod error;
mod missed;
mod notify;
mod render;
mod shift_log;
mod state;

#[cfg(test)]
mod tests;

pub use apply::{apply_rota_command, ensure_revisable, ensure_shift_editable};
pub use capabilities::{
    ActorContext, Capability, RotaCapabilities, ShiftLogCapabilities, can_begin_manager_edit,
    can_create_rota, can_edit_rota, can_edit_shift_log, can_lock_shift_log, can_open_shift_log,
    can_publish_rota, can_reject_rota, can_reopen_shift_log, can_revise_rota,
    can_scan_missed_shifts, can_submit_rota, can_view_rota, can_view_shift_log,
    compute_rota_capabilities, compute_shift_log_capabilities,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use command::RotaCommand;
pub use error::CoreError;
pub use missed::{MissedShift, expected_shifts, missed_shift_notifications};
pub use notify::{
    MemorySink, Notification, NotificationKind, NotificationSink, Recipient, ShiftAssignment,
    dispatch, fan_out, publish_recipients,
};
pub use render::{DocumentEntry, DocumentRenderer, RenderError, ShiftLogDocument, TemplateKind};
pub use shift_log::{
    LogEntry, ShiftLog, ShiftLogKey, document_file_name, prepare_entry_write, prepare_lock,
    validate_slot,
};
pub use state::{RotaContext, RotaHeader, RotaShift, RotaTransition};
