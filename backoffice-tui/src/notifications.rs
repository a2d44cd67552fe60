//! Notification system for the TUI.

use backoffice_core::{Notice, NoticeLevel};
use chrono::{DateTime, Duration, Utc};

/// How long a notification stays in the footer.
pub const NOTIFICATION_TTL_SECS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::seconds(NOTIFICATION_TTL_SECS)
    }
}

impl From<Notice> for Notification {
    fn from(notice: Notice) -> Self {
        let level = match notice.level {
            NoticeLevel::Success => NotificationLevel::Success,
            NoticeLevel::Error => NotificationLevel::Error,
        };
        Self::new(level, notice.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_notice() {
        let note = Notification::from(Notice::error("Failed to save step"));
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(note.message, "Failed to save step");
    }

    #[test]
    fn test_expiry() {
        let note = Notification::new(NotificationLevel::Info, "hello");
        assert!(!note.is_expired(note.created_at));
        assert!(note.is_expired(note.created_at + Duration::seconds(NOTIFICATION_TTL_SECS + 1)));
    }
}
