// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification recipients and dispatch.
//!
//! The engine computes who is told what. Delivery belongs to a
//! `NotificationSink` and is fire-and-forget.

use std::collections::BTreeSet;
use std::sync::Mutex;

use carehome_domain::NotifyMode;
use serde::Serialize;

/// Someone who can receive a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    Staff(i64),
    ServiceUser(i64),
}

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RotaSubmitted,
    RotaPublished,
    RotaRejected,
    RotaManagerDraft,
    MissedShift,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RotaSubmitted => "rota_submitted",
            Self::RotaPublished => "rota_published",
            Self::RotaRejected => "rota_rejected",
            Self::RotaManagerDraft => "rota_manager_draft",
            Self::MissedShift => "missed_shift",
        }
    }
}

/// A message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
}

/// Delivers notifications.
pub trait NotificationSink: Send + Sync {
    /// Sends one notification. Failures are the sink's concern.
    fn send(&self, notification: &Notification);
}

/// Sends every notification to `sink`, returning how many were sent.
pub fn dispatch(sink: &dyn NotificationSink, notifications: &[Notification]) -> usize {
    for notification in notifications {
        sink.send(notification);
    }
    notifications.len()
}

/// A sink that keeps what it is sent.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<Notification>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn send(&self, notification: &Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
    }
}

/// Staff and service user assigned to one rota shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShiftAssignment {
    pub staff_id: Option<i64>,
    pub service_user_id: Option<i64>,
}

/// Computes who is told that a rota was published.
///
/// Unassigned shifts contribute nobody and each person appears once.
#[must_use]
pub fn publish_recipients(
    assignments: &[ShiftAssignment],
    mode: NotifyMode,
) -> BTreeSet<Recipient> {
    let mut recipients: BTreeSet<Recipient> = BTreeSet::new();

    for assignment in assignments {
        if mode.includes_staff() {
            recipients.extend(assignment.staff_id.map(Recipient::Staff));
        }
        if mode.includes_service_users() {
            recipients.extend(assignment.service_user_id.map(Recipient::ServiceUser));
        }
    }

    recipients
}

/// Builds one notification per recipient with shared content.
#[must_use]
pub fn fan_out(
    recipients: impl IntoIterator<Item = Recipient>,
    kind: NotificationKind,
    title: &str,
    message: &str,
    payload: &serde_json::Value,
) -> Vec<Notification> {
    recipients
        .into_iter()
        .map(|recipient| Notification {
            recipient,
            kind,
            title: title.to_string(),
            message: message.to_string(),
            payload: payload.clone(),
        })
        .collect()
}
