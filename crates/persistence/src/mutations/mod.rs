// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Every function here expects to run inside the transaction opened by the
//! `Persistence` adapter and never opens one of its own.
//!
//! - `bootstrap`: first-run seeding of a care home and its manager
//! - `directory`: care homes, staff, service users and managers
//! - `shift_logs`: shift logs, entry writes, lock and reopen
//! - `missed_shifts`: the missed shift sweep and its resolution
//! - `rotas`: rota versions, shift edits and lifecycle transitions

pub mod bootstrap;
pub mod directory;
pub mod missed_shifts;
pub mod rotas;
pub mod shift_logs;

use diesel::result::{DatabaseErrorKind, Error};

use crate::error::PersistenceError;

/// Maps constraint violations on an insert or update to caller errors.
///
/// Unique violations become `Conflict` and foreign key violations become
/// `NotFound`, both naming `what` was being written.
pub(crate) fn constraint_error(err: Error, what: &str) -> PersistenceError {
    match err {
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PersistenceError::Conflict(format!("{what}: {}", info.message()))
        }
        Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            PersistenceError::NotFound(format!("{what} references a missing record"))
        }
        other => other.into(),
    }
}
