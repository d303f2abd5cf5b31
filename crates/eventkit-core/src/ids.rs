//! Newtype wrappers for identifiers to ensure type safety.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new id from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random id.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string reference.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id!(
    /// Unique identifier for a Run (one export execution).
    RunUid
);
string_id!(
    /// Unique identifier for a Job (export definition).
    JobUid
);
string_id!(
    /// Unique identifier for a ProviderTask.
    ProviderTaskUid
);
string_id!(
    /// Unique identifier for a Task inside a ProviderTask.
    TaskUid
);
string_id!(
    /// Slug identifying a data provider.
    ProviderSlug
);

/// Ids the server hands out as integers. They are kept as strings so every
/// store map is keyed the same way, and written back as numbers.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string reference.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n.to_string())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.0.parse::<u64>() {
                    Ok(n) => serializer.serialize_u64(n),
                    Err(_) => serializer.serialize_str(&self.0),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Number(u64),
                    Text(String),
                }

                Ok(match Raw::deserialize(deserializer)? {
                    Raw::Number(n) => Self(n.to_string()),
                    Raw::Text(s) => Self(s),
                })
            }
        }
    };
}

numeric_id!(
    /// Identifier for a Notification.
    NotificationId
);
numeric_id!(
    /// Identifier for a sharing Group.
    GroupId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_uid_generate() {
        let id1 = RunUid::generate();
        let id2 = RunUid::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_display() {
        let id = JobUid::new("test-123");
        assert_eq!(format!("{}", id), "test-123");
    }

    #[test]
    fn test_notification_id_accepts_numbers_and_strings() {
        let from_number: NotificationId = serde_json::from_str("42").unwrap();
        let from_text: NotificationId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "42");

        let opaque = NotificationId::new("abc");
        assert_eq!(serde_json::to_string(&opaque).unwrap(), "\"abc\"");
    }

    #[test]
    fn test_group_id_written_back_as_number() {
        let id: GroupId = serde_json::from_str("7").unwrap();
        assert_eq!(id, GroupId::from(7));
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!(7));
    }
}
