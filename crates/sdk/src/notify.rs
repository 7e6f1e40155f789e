//! Operator-facing notifications.
//!
//! A [`NotificationSink`] receives short fixed-label messages about workflow
//! outcomes. The SDK emits exactly one [`NotificationLevel::Error`]
//! notification per failed mint drop and nothing on success.
//!
//! Sinks are attached at runtime through [`Sdk::set_notifier`](crate::Sdk::set_notifier):
//!
//! - [`TracingNotifier`] (default) writes the notification to the log
//! - [`RecordingNotifier`] keeps notifications in memory for inspection

use std::fmt;
use std::sync::RwLock;

use tracing::error;

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// Severity of a [`Notification`]. The workflow only reports failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
        }
    }
}

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Fixed, human-readable label.
    pub message: &'static str,
    /// Optional detail, e.g. the failing operation's diagnostic.
    pub description: Option<String>,
}

impl Notification {
    /// An error-level notification with no description.
    pub fn error(message: &'static str) -> Self {
        Self {
            level: NotificationLevel::Error,
            message,
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ---------------------------------------------------------------------------
// NotificationSink
// ---------------------------------------------------------------------------

/// Destination for operator notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the `tracing` log at the matching level.
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, n: Notification) {
        let description = n.description.as_deref().unwrap_or("");
        match n.level {
            NotificationLevel::Error => {
                error!(level = %n.level, label = n.message, description, "notification")
            }
        }
    }
}

/// Keeps every notification in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    received: RwLock<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.received.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.received.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.write().unwrap().push(notification);
    }
}
