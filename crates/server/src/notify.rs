// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification delivery for the server: notifications are written to the log.

use carehome::{Notification, NotificationSink, Recipient};
use tracing::info;

/// Logs every notification it is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn send(&self, notification: &Notification) {
        let (recipient_type, recipient_id): (&str, i64) = match notification.recipient {
            Recipient::Staff(id) => ("staff", id),
            Recipient::ServiceUser(id) => ("service_user", id),
        };
        info!(
            recipient_type,
            recipient_id,
            kind = ?notification.kind,
            title = %notification.title,
            message = %notification.message,
            "Notification"
        );
    }
}
