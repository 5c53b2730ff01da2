// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carehome_domain::{DomainError, RotaAction, RotaStatus};
use thiserror::Error;

use crate::render::RenderError;
use crate::shift_log::ShiftLogKey;

/// Errors raised by the shift log and rota engine.
///
/// Every error is propagated to the caller uninterpreted; the engine never
/// retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A second shift log was created for a key that already has one.
    #[error("A shift log already exists for {0}")]
    DuplicateAggregate(ShiftLogKey),

    /// A write was attempted against a locked shift log.
    #[error("Shift log {shift_log_id} is locked")]
    LockedAggregate { shift_log_id: i64 },

    /// A lock was attempted on a shift log with no entries.
    #[error("Shift log {shift_log_id} has no entries to lock")]
    EmptyAggregate { shift_log_id: i64 },

    /// A reopen was attempted on a shift log that is not locked.
    #[error("Shift log {shift_log_id} is not locked")]
    NotLocked { shift_log_id: i64 },

    /// A rota action was attempted from a status that does not permit it.
    #[error("Rota {rota_id}: cannot {} a rota in status '{from}'", .action.as_str())]
    InvalidTransition {
        rota_id: i64,
        from: RotaStatus,
        action: RotaAction,
    },

    /// Only published rotas can be revised into a new version.
    #[error("Rota {rota_id} is not published")]
    NotPublished { rota_id: i64 },

    /// The document renderer failed.
    #[error("Document rendering failed: {0}")]
    Render(#[from] RenderError),

    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),

    /// The actor lacks the capability for the action.
    #[error("Not permitted to {action}")]
    PermissionDenied { action: String },
}
