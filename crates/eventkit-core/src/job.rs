//! Job (export definition) and sharing permission types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{Extra, JobUid};

/// Who can see a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Shared,
}

impl Visibility {
    /// Wire name of the visibility.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "PRIVATE",
            Self::Public => "PUBLIC",
            Self::Shared => "SHARED",
        }
    }
}

/// Sharing permissions as the server stores them on a job.
///
/// Both maps go from user or group name to a permission level
/// (`READ`, `ADMIN`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPermissions {
    #[serde(default)]
    pub users: BTreeMap<String, String>,
    #[serde(default)]
    pub groups: BTreeMap<String, String>,
}

/// Sharing permissions in the form the client edits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    /// Overall visibility of the job.
    pub value: Visibility,
    /// Group name to permission level.
    #[serde(default)]
    pub groups: BTreeMap<String, String>,
    /// User name to permission level.
    #[serde(default)]
    pub members: BTreeMap<String, String>,
}

impl Permissions {
    /// Build the PATCH body the jobs endpoint expects.
    pub fn to_job_patch(&self) -> Value {
        json!({
            "visibility": self.value.as_str(),
            "permissions": {
                "users": self.members,
                "groups": self.groups,
            },
        })
    }
}

/// Static descriptive metadata of an export request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub uid: JobUid,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<JobPermissions>,

    /// Spatial extent, category, formats and anything else the server sends.
    #[serde(flatten)]
    pub extra: Extra,
}

impl Job {
    /// Client form of this job's sharing settings.
    pub fn permissions(&self) -> Permissions {
        let server = self.permissions.clone().unwrap_or_default();
        Permissions {
            value: self.visibility.unwrap_or_default(),
            groups: server.groups,
            members: server.users,
        }
    }
}
