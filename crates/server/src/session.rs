// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor extraction for the server.
//!
//! Callers identify themselves with an `X-Staff-Id` header. The staff
//! directory supplies role and care home; the header carries no privileges
//! of its own.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use carehome_api::{AuthenticatedActor, authenticate_stub};
use tracing::{debug, warn};

use crate::AppState;

/// Header naming the acting staff member.
pub const STAFF_ID_HEADER: &str = "X-Staff-Id";

/// Extractor for the acting staff member.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     StaffSession(actor): StaffSession,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if:
/// - The `X-Staff-Id` header is missing
/// - The header is not an integer
/// - No active staff member has that id
pub struct StaffSession(pub AuthenticatedActor);

impl FromRequestParts<AppState> for StaffSession {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw: &str = parts
            .headers
            .get(STAFF_ID_HEADER)
            .ok_or_else(|| {
                debug!("Missing X-Staff-Id header");
                SessionError::MissingStaffHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid X-Staff-Id header encoding");
                SessionError::InvalidStaffHeader
            })?;

        let staff_id: i64 = raw.trim().parse().map_err(|_| {
            warn!(value = raw, "X-Staff-Id header is not a staff id");
            SessionError::InvalidStaffHeader
        })?;

        let mut persistence = state.persistence.lock().await;
        let actor: AuthenticatedActor =
            authenticate_stub(&mut persistence, staff_id).map_err(|e| {
                warn!(staff_id, error = %e, "Staff authentication failed");
                SessionError::UnknownStaff(e.to_string())
            })?;
        drop(persistence);

        debug!(
            staff_id,
            role = actor.context.role.as_str(),
            "Staff session resolved"
        );

        Ok(Self(actor))
    }
}

/// Session extraction errors.
///
/// These errors are returned when the actor cannot be resolved and are
/// automatically converted to HTTP responses.
#[derive(Debug)]
pub enum SessionError {
    /// The `X-Staff-Id` header is missing.
    MissingStaffHeader,
    /// The `X-Staff-Id` header is not a valid staff id.
    InvalidStaffHeader,
    /// No active staff member matches the header.
    UnknownStaff(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingStaffHeader => (StatusCode::UNAUTHORIZED, "Missing X-Staff-Id header"),
            Self::InvalidStaffHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid X-Staff-Id header. Expected an integer staff id",
            ),
            Self::UnknownStaff(reason) => {
                return (StatusCode::UNAUTHORIZED, reason).into_response();
            }
        };

        (status, message).into_response()
    }
}
