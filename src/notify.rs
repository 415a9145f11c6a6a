//! User-facing notifications raised by list views.
//!
//! Controllers never surface gateway failures as errors to their caller;
//! they record a notification here instead and leave the view in a
//! consistent state. The front end drains the queue and shows it.

use std::time::Instant;

/// Severity level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// A notification message
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: Level,
    /// When the notification was raised
    pub timestamp: Instant,
}

impl Notification {
    pub fn new(message: String, level: Level) -> Self {
        Self {
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), Level::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), Level::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), Level::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), Level::Error)
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// Pending notifications, oldest first
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notification, logging errors at warn level
    pub fn push(&mut self, notification: Notification) {
        match notification.level {
            Level::Error => tracing::warn!("{}", notification.message),
            _ => tracing::debug!("{}", notification.message),
        }
        self.items.push(notification);
    }

    /// Pending notifications in the order they were raised
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    /// Number of pending notifications
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|n| n.is_error()).count()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.items.last()
    }

    /// Take every pending notification
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items)
    }
}
