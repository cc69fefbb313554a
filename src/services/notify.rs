// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-facing notifications raised by auth operations.

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A short message for the user, e.g. a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: &str, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn error(title: &str, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Sink for notifications. The UI layer supplies its own.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
            NotificationKind::Error => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
        }
    }
}
