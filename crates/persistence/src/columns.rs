// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Column encodings.
//!
//! Dates are stored as `YYYY-MM-DD`, times of day as `HH:MM`, instants as
//! RFC 3339 and booleans as integers.

use std::fmt::Display;
use std::str::FromStr;

use carehome_domain::{format_date, format_time_of_day, parse_date, parse_time_of_day};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, Time};

use crate::error::PersistenceError;

pub fn encode_date(date: Date) -> String {
    format_date(date)
}

pub fn decode_date(value: &str) -> Result<Date, PersistenceError> {
    parse_date(value).map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn encode_time(time: Time) -> String {
    format_time_of_day(time)
}

pub fn decode_time(value: &str) -> Result<Time, PersistenceError> {
    parse_time_of_day(value).map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn encode_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn decode_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(format!("'{value}': {e}")))
}

pub fn decode_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(decode_timestamp).transpose()
}

/// Parses a stored enum value such as a status or shift kind.
pub fn decode<T>(value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse::<T>()
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub const fn encode_bool(value: bool) -> i32 {
    if value { 1 } else { 0 }
}

pub const fn decode_bool(value: i32) -> bool {
    value != 0
}
