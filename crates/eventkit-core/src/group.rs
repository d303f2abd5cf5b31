//! Sharing groups and the user directory.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Extra, GroupId};

/// A named set of users that DataPacks can be shared with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,

    pub name: String,

    /// Usernames of the members.
    #[serde(default)]
    pub members: Vec<String>,

    /// Usernames allowed to manage the group.
    #[serde(default)]
    pub administrators: Vec<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Group {
    pub fn is_administrator(&self, username: &str) -> bool {
        self.administrators.iter().any(|name| name == username)
    }
}

/// Account details of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commonname: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// One entry of the user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user: UserProfile,

    /// License slug to whether the user accepted it.
    #[serde(default)]
    pub accepted_licenses: BTreeMap<String, bool>,

    /// Groups the user is a member of.
    #[serde(default)]
    pub groups: Vec<GroupId>,
}

impl User {
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_from_api() {
        let group: Group = serde_json::from_value(json!({
            "id": 3,
            "name": "Analysts",
            "members": ["admin", "jane"],
            "administrators": ["admin"],
        }))
        .unwrap();

        assert_eq!(group.id, GroupId::from(3));
        assert!(group.is_administrator("admin"));
        assert!(!group.is_administrator("jane"));
    }

    #[test]
    fn test_user_from_api() {
        let user: User = serde_json::from_value(json!({
            "user": {
                "username": "jane",
                "first_name": "Jane",
                "last_name": "Doe",
                "email": "jane.doe@email.com",
                "identification": null,
            },
            "accepted_licenses": {"odbl": true},
            "groups": [3, 5],
        }))
        .unwrap();

        assert_eq!(user.username(), "jane");
        assert_eq!(user.groups, vec![GroupId::from(3), GroupId::from(5)]);
        assert!(user.user.extra.contains_key("identification"));
        assert!(user.user.last_login.is_none());
    }
}
