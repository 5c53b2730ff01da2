// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `directory`: care homes, staff and service users
//! - `shift_logs`: shift logs, their entries and documents
//! - `missed_shifts`: missed shift records
//! - `rotas`: rotas, shifts and their audit trails

pub mod directory;
pub mod missed_shifts;
pub mod rotas;
pub mod shift_logs;
