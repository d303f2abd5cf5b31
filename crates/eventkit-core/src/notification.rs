//! Notification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Extra, NotificationId};

/// Something that happened to a Run or a Group the user belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,

    #[serde(default)]
    pub unread: bool,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// What happened (`run_completed`, `added_to_group`, ...).
    #[serde(default)]
    pub verb: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_object: Option<Value>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Notification {
    /// Return a copy with the unread flag set to `unread`.
    pub fn with_unread(&self, unread: bool) -> Self {
        Self {
            unread,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_from_api() {
        let notification: Notification = serde_json::from_value(json!({
            "id": 7,
            "unread": true,
            "verb": "run_completed",
            "timestamp": "2018-05-04T17:32:04.716806Z",
            "recipient_id": 1,
        }))
        .unwrap();

        assert_eq!(notification.id.as_str(), "7");
        assert!(notification.unread);
        assert!(!notification.with_unread(false).unread);
        assert_eq!(notification.extra.get("recipient_id"), Some(&json!(1)));
    }
}
