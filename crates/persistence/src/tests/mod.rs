// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod directory_tests;
mod shift_log_tests;

use carehome::{DocumentRenderer, RenderError, ShiftLogKey, TemplateKind};
use carehome_domain::{Role, ShiftKind};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

use crate::{NewStaff, Persistence};

pub const NOW: OffsetDateTime = datetime!(2026-03-02 21:15:07 UTC);
pub const LOG_DATE: Date = date!(2026 - 03 - 02);

/// Renders documents as the JSON they were given.
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn render(
        &self,
        _template: TemplateKind,
        data: &serde_json::Value,
    ) -> Result<Vec<u8>, RenderError> {
        serde_json::to_vec(data).map_err(|e| RenderError::InvalidData(e.to_string()))
    }
}

/// Always fails.
pub struct BrokenRenderer;

impl DocumentRenderer for BrokenRenderer {
    fn render(
        &self,
        _template: TemplateKind,
        _data: &serde_json::Value,
    ) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Failed(String::from("printer on fire")))
    }
}

/// A care home with one staff member of each role and two service users.
pub struct Fixture {
    pub persistence: Persistence,
    pub carehome_id: i64,
    pub staff_id: i64,
    pub team_lead_id: i64,
    pub manager_id: i64,
    pub service_user_id: i64,
    pub other_service_user_id: i64,
}

impl Fixture {
    pub fn key(&self, shift: ShiftKind) -> ShiftLogKey {
        ShiftLogKey {
            staff_id: self.staff_id,
            carehome_id: self.carehome_id,
            service_user_id: self.service_user_id,
            date: LOG_DATE,
            shift,
        }
    }
}

pub fn new_staff(
    login_name: &str,
    first: &str,
    last: &str,
    role: Role,
    carehome_id: i64,
) -> NewStaff {
    NewStaff {
        login_name: login_name.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
        carehome_id: Some(carehome_id),
        is_superuser: false,
    }
}

pub fn seed(mut persistence: Persistence) -> Fixture {
    let carehome_id: i64 = persistence
        .create_carehome("Willow House", "ab1 2cd", None, None, NOW)
        .unwrap();
    let staff_id: i64 = persistence
        .register_staff(&new_staff("jdoe", "Jane", "Doe", Role::Staff, carehome_id), NOW)
        .unwrap();
    let team_lead_id: i64 = persistence
        .register_staff(&new_staff("llead", "Lee", "Lead", Role::TeamLead, carehome_id), NOW)
        .unwrap();
    let manager_id: i64 = persistence
        .register_staff(&new_staff("mpatel", "Mo", "Patel", Role::Manager, carehome_id), NOW)
        .unwrap();
    persistence
        .assign_carehome_manager(carehome_id, manager_id)
        .unwrap();
    let service_user_id: i64 = persistence
        .register_service_user(carehome_id, "Arthur", "Dent", NOW)
        .unwrap();
    let other_service_user_id: i64 = persistence
        .register_service_user(carehome_id, "Ford", "Prefect", NOW)
        .unwrap();

    Fixture {
        persistence,
        carehome_id,
        staff_id,
        team_lead_id,
        manager_id,
        service_user_id,
        other_service_user_id,
    }
}

pub fn setup() -> Fixture {
    seed(Persistence::new_in_memory().unwrap())
}
