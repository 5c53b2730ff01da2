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
#![allow(clippy::multiple_crate_versions)]

//! Caller boundary for care home shift logs and rotas.
//!
//! The API layer sits between transports (the HTTP server) and the
//! persistence façade:
//!
//! - `auth` resolves the acting staff member (a stub: the caller names a
//!   staff id)
//! - `handlers` check the actor's capabilities, run one persistence
//!   operation and dispatch notifications after it commits
//! - `error` translates domain, core and persistence errors into `ApiError`
//! - `request_response` holds the serializable request and response shapes

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, authenticate_stub};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    begin_manager_edit, create_rota, delete_shift, get_rota, get_shift_log,
    get_shift_log_document, lock_shift_log, open_shift_log, publish_rota, reject_rota,
    reopen_shift_log, resolve_missed_shifts, revise_rota, save_shift, scan_missed_shifts,
    submit_rota, transition_rota, write_entry,
};
pub use request_response::{
    ApprovalInfo, CreateRotaRequest, LockShiftLogResponse, LogEntryInfo, MissedShiftInfo,
    OpenShiftLogRequest, OpenShiftLogResponse, PublishRotaRequest, RejectRotaRequest,
    ResolveMissedShiftsRequest, ResolveMissedShiftsResponse, RotaDetailResponse, RotaInfo,
    RotaResponse, RotaTransitionResponse, SaveShiftRequest, ScanMissedShiftsRequest,
    ScanMissedShiftsResponse, ShiftChangeInfo, ShiftInfo, ShiftLogDocumentResponse, ShiftLogInfo,
    ShiftLogResponse, WriteEntryRequest,
};
