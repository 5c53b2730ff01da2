// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use carehome::CoreError;
use carehome_domain::{DomainError, format_date};
use carehome_persistence::PersistenceError;
use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No active staff member matches the supplied identity.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor's capability set does not include the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request collides with existing data.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { action } => {
                write!(f, "Unauthorized: not permitted to {action}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidShiftKind(value) => ApiError::InvalidInput {
            field: String::from("shift"),
            message: format!("Unknown shift '{value}'. Must be 'morning' or 'night'"),
        },
        DomainError::InvalidNotifyMode(value) => ApiError::InvalidInput {
            field: String::from("notify"),
            message: format!(
                "Unknown notify mode '{value}'. Expected everyone, staff, service_users or none"
            ),
        },
        DomainError::InvalidName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::EmptyLogContent => ApiError::InvalidInput {
            field: String::from("content"),
            message: String::from("Log entry content cannot be empty"),
        },
        err @ DomainError::SlotOutsideShift { .. } => ApiError::InvalidInput {
            field: String::from("time_slot"),
            message: err.to_string(),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
        DomainError::TimeParseError { time_string, error } => ApiError::InvalidInput {
            field: String::from("time_slot"),
            message: format!("Failed to parse time '{time_string}': {error}"),
        },
        DomainError::InvalidRotaPeriod {
            period_start,
            period_end,
        } => ApiError::InvalidInput {
            field: String::from("period_end"),
            message: format!(
                "Period end {} is before period start {}",
                format_date(period_end),
                format_date(period_start)
            ),
        },
        err @ DomainError::InvalidTransition { .. } => ApiError::DomainRuleViolation {
            rule: String::from("rota_transition"),
            message: err.to_string(),
        },
        err @ DomainError::RotaNotEditable { .. } => ApiError::DomainRuleViolation {
            rule: String::from("rota_not_editable"),
            message: err.to_string(),
        },
        // Stored values or server configuration, never caller input.
        err @ (DomainError::InvalidShiftLogStatus(_)
        | DomainError::InvalidRotaStatus(_)
        | DomainError::InvalidRole(_)
        | DomainError::InvalidSlotPolicy { .. }) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        err @ CoreError::DuplicateAggregate(_) => ApiError::Conflict {
            message: err.to_string(),
        },
        err @ CoreError::LockedAggregate { .. } => ApiError::DomainRuleViolation {
            rule: String::from("shift_log_locked"),
            message: err.to_string(),
        },
        err @ CoreError::EmptyAggregate { .. } => ApiError::DomainRuleViolation {
            rule: String::from("shift_log_empty"),
            message: err.to_string(),
        },
        err @ CoreError::NotLocked { .. } => ApiError::DomainRuleViolation {
            rule: String::from("shift_log_not_locked"),
            message: err.to_string(),
        },
        err @ CoreError::InvalidTransition { .. } => ApiError::DomainRuleViolation {
            rule: String::from("rota_transition"),
            message: err.to_string(),
        },
        err @ CoreError::NotPublished { .. } => ApiError::DomainRuleViolation {
            rule: String::from("rota_not_published"),
            message: err.to_string(),
        },
        CoreError::Render(render_err) => ApiError::Internal {
            message: format!("Document rendering failed: {render_err}"),
        },
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::PermissionDenied { action } => ApiError::Unauthorized { action },
    }
}

/// Translates a persistence error into an API error.
///
/// Storage failures are reported as internal errors without their detail.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Rejected(core_err) => translate_core_error(core_err),
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message,
        },
        PersistenceError::Conflict(message) => ApiError::Conflict { message },
        other => {
            tracing::error!(error = %other, "Persistence failure");
            ApiError::Internal {
                message: String::from("Storage operation failed"),
            }
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}
