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

mod calendar;
mod error;
mod rota_status;
mod slots;
mod types;

#[cfg(test)]
mod tests;

pub use calendar::{day_of_week, format_date, format_time_of_day, parse_date, parse_time_of_day};
pub use error::DomainError;
pub use rota_status::{NotifyMode, RotaAction, RotaStatus};
pub use slots::{ShiftSlots, SlotPolicy, default_shift_start, generate_slots, slot_position};
pub use types::{
    Role, ShiftKind, ShiftLogStatus, staff_display_name, staff_initials, validate_log_content,
};
