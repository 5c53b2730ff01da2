// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test fixtures: a seeded in-memory server and a request helper.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use carehome::{FixedClock, MemorySink};
use carehome_domain::Role;
use carehome_persistence::{NewStaff, Persistence};
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::{AppState, build_router, render::TextRenderer, session::STAFF_ID_HEADER};

pub const NOW: OffsetDateTime = datetime!(2026-03-02 21:15:07 UTC);

pub struct TestServer {
    pub app: Router,
    pub sink: Arc<MemorySink>,
    pub carehome_id: i64,
    pub service_user_id: i64,
    pub staff_id: i64,
    pub lead_id: i64,
    pub manager_id: i64,
    pub outsider_id: i64,
}

fn staff(login: &str, first: &str, role: Role, carehome_id: Option<i64>) -> NewStaff {
    NewStaff {
        login_name: login.to_string(),
        first_name: first.to_string(),
        last_name: String::from("Tester"),
        role,
        carehome_id,
        is_superuser: false,
    }
}

pub fn create_test_server() -> TestServer {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let carehome_id: i64 = persistence
        .create_carehome("Willow House", "AB1 2CD", None, None, NOW)
        .unwrap();
    let other_carehome_id: i64 = persistence
        .create_carehome("Birch Lodge", "ZZ9 9ZZ", None, None, NOW)
        .unwrap();
    let staff_id: i64 = persistence
        .register_staff(&staff("jane", "Jane", Role::Staff, Some(carehome_id)), NOW)
        .unwrap();
    let lead_id: i64 = persistence
        .register_staff(&staff("lee", "Lee", Role::TeamLead, Some(carehome_id)), NOW)
        .unwrap();
    let manager_id: i64 = persistence
        .register_staff(&staff("mo", "Mo", Role::Manager, None), NOW)
        .unwrap();
    let outsider_id: i64 = persistence
        .register_staff(&staff("orla", "Orla", Role::Staff, Some(other_carehome_id)), NOW)
        .unwrap();
    persistence
        .assign_carehome_manager(carehome_id, manager_id)
        .unwrap();
    let service_user_id: i64 = persistence
        .register_service_user(carehome_id, "Arthur", "Dent", NOW)
        .unwrap();

    let sink: Arc<MemorySink> = Arc::new(MemorySink::new());
    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        renderer: Arc::new(TextRenderer),
        sink: sink.clone(),
        clock: Arc::new(FixedClock::new(NOW)),
    };

    TestServer {
        app: build_router(app_state),
        sink,
        carehome_id,
        service_user_id,
        staff_id,
        lead_id,
        manager_id,
        outsider_id,
    }
}

/// A response status with its raw body and headers.
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

impl TestServer {
    /// Sends one request as `staff_id`, with an optional JSON body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        staff_id: Option<i64>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = staff_id {
            builder = builder.header(STAFF_ID_HEADER, id.to_string());
        }
        let request: Request<Body> = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status: StatusCode = response.status();
        let header_text = |name: &str| -> Option<String> {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let content_type: Option<String> = header_text("content-type");
        let content_disposition: Option<String> = header_text("content-disposition");
        let body: Vec<u8> = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            content_type,
            content_disposition,
            body,
        }
    }
}
