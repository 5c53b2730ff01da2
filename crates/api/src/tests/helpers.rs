// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use carehome::{DocumentRenderer, FixedClock, MemorySink, RenderError, TemplateKind};
use carehome_domain::Role;
use carehome_persistence::{NewStaff, Persistence};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{AuthenticatedActor, OpenShiftLogRequest, authenticate_stub};

pub const NOW: OffsetDateTime = datetime!(2026-03-02 21:15:07 UTC);

/// Renders the document data as JSON text.
pub struct TextRenderer;

impl DocumentRenderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(
        &self,
        _template: TemplateKind,
        data: &serde_json::Value,
    ) -> Result<Vec<u8>, RenderError> {
        Ok(data.to_string().into_bytes())
    }
}

/// Two care homes, staff of every role and two service users at the first.
pub struct World {
    pub persistence: Persistence,
    pub clock: FixedClock,
    pub sink: MemorySink,
    pub renderer: TextRenderer,
    pub carehome_id: i64,
    pub other_carehome_id: i64,
    pub service_user_id: i64,
    pub other_service_user_id: i64,
    pub staff_id: i64,
    pub colleague_id: i64,
    pub lead_id: i64,
    pub manager_id: i64,
    pub outsider_id: i64,
}

fn new_staff(
    login: &str,
    first: &str,
    last: &str,
    role: Role,
    carehome_id: Option<i64>,
) -> NewStaff {
    NewStaff {
        login_name: login.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
        carehome_id,
        is_superuser: false,
    }
}

pub fn create_world() -> World {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let carehome_id: i64 = persistence
        .create_carehome("Willow House", "AB1 2CD", None, None, NOW)
        .unwrap();
    let other_carehome_id: i64 = persistence
        .create_carehome("Birch Lodge", "ZZ9 9ZZ", None, None, NOW)
        .unwrap();

    let staff_id: i64 = persistence
        .register_staff(&new_staff("jdoe", "Jane", "Doe", Role::Staff, Some(carehome_id)), NOW)
        .unwrap();
    let colleague_id: i64 = persistence
        .register_staff(&new_staff("asmith", "Al", "Smith", Role::Staff, Some(carehome_id)), NOW)
        .unwrap();
    let lead_id: i64 = persistence
        .register_staff(
            &new_staff("llead", "Lee", "Lead", Role::TeamLead, Some(carehome_id)),
            NOW,
        )
        .unwrap();
    let manager_id: i64 = persistence
        .register_staff(&new_staff("mpatel", "Mo", "Patel", Role::Manager, None), NOW)
        .unwrap();
    let outsider_id: i64 = persistence
        .register_staff(
            &new_staff("obrien", "Orla", "Brien", Role::TeamLead, Some(other_carehome_id)),
            NOW,
        )
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

    World {
        persistence,
        clock: FixedClock::new(NOW),
        sink: MemorySink::new(),
        renderer: TextRenderer,
        carehome_id,
        other_carehome_id,
        service_user_id,
        other_service_user_id,
        staff_id,
        colleague_id,
        lead_id,
        manager_id,
        outsider_id,
    }
}

impl World {
    pub fn actor(&mut self, staff_id: i64) -> AuthenticatedActor {
        authenticate_stub(&mut self.persistence, staff_id).unwrap()
    }

    pub fn open_request(&self, shift: &str) -> OpenShiftLogRequest {
        OpenShiftLogRequest {
            service_user_id: self.service_user_id,
            date: String::from("2026-03-02"),
            shift: shift.to_string(),
        }
    }
}
