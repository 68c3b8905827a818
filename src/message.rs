use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum NotificationLevel {
    Info,
    Warn,
    Error,
}

// A single message addressed to the invoking player only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub content: String,
}

impl Notification {
    pub fn info(content: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Info,
            content: content.into(),
        }
    }

    pub fn warn(content: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Warn,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            content: content.into(),
        }
    }
}
