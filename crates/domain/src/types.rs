// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The shifts a care home runs.
///
/// Some historical enumerations also carried an afternoon shift; it is not
/// logged and is never evaluated for missed shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftKind {
    /// Day shift, starting 08:00 unless the care home configures otherwise.
    Morning,
    /// Night shift, starting 20:00 unless the care home configures otherwise.
    Night,
}

impl ShiftKind {
    /// All shifts that are logged and checked for misses, in day order.
    pub const ALL: [Self; 2] = [Self::Morning, Self::Night];

    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Night => "night",
        }
    }
}

impl FromStr for ShiftKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "night" => Ok(Self::Night),
            _ => Err(DomainError::InvalidShiftKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a per-shift log aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShiftLogStatus {
    /// Entries may still be written.
    #[default]
    Incomplete,
    /// Entries are frozen and a document has been produced.
    Locked,
}

impl ShiftLogStatus {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Locked => "locked",
        }
    }

    /// Returns true if the aggregate is locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked)
    }
}

impl FromStr for ShiftLogStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incomplete" => Ok(Self::Incomplete),
            "locked" => Ok(Self::Locked),
            _ => Err(DomainError::InvalidShiftLogStatus(s.to_string())),
        }
    }
}

/// Staff roles.
///
/// Roles feed the capability set; callers never branch on them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Oversees every care home, approves and publishes rotas.
    Manager,
    /// Leads one care home, drafts rotas and supervises logs there.
    TeamLead,
    /// Writes shift logs for the service users they are mapped to.
    Staff,
}

impl Role {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::TeamLead => "team_lead",
            Self::Staff => "staff",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Self::Manager),
            "team_lead" => Ok(Self::TeamLead),
            "staff" => Ok(Self::Staff),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

/// Builds the display name stored as a snapshot on shift logs.
///
/// Falls back to the login name when both name parts are blank.
#[must_use]
pub fn staff_display_name(first_name: &str, last_name: &str, login_name: &str) -> String {
    let full: String = format!("{} {}", first_name.trim(), last_name.trim());
    let full: &str = full.trim();
    if full.is_empty() {
        login_name.to_string()
    } else {
        full.to_string()
    }
}

/// Derives one or two uppercase initials from a staff member's name.
///
/// Uses the first letters of the first and last names when both exist,
/// whichever exists otherwise, and the first character of the login name
/// as the final fallback.
#[must_use]
pub fn staff_initials(first_name: &str, last_name: &str, login_name: &str) -> String {
    let first: Option<char> = first_name.trim().chars().next();
    let last: Option<char> = last_name.trim().chars().next();

    let letters: [Option<char>; 2] = match (first, last) {
        (Some(f), Some(l)) => [Some(f), Some(l)],
        (Some(c), None) | (None, Some(c)) => [Some(c), None],
        (None, None) => [login_name.trim().chars().next(), None],
    };

    // Some letters uppercase to several chars ('ß' to "SS"); keep the first.
    letters
        .into_iter()
        .flatten()
        .filter_map(|c| c.to_uppercase().next())
        .collect()
}

/// Validates log entry content, returning the trimmed text.
///
/// # Errors
///
/// Returns `DomainError::EmptyLogContent` if nothing remains after trimming.
pub fn validate_log_content(content: &str) -> Result<&str, DomainError> {
    let trimmed: &str = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyLogContent);
    }
    Ok(trimmed)
}
