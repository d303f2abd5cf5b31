//! Run, ProviderTask and Task types.
//!
//! `ApiRun` and `ApiProviderTask` are the nested shapes returned by the runs
//! endpoints. `Run` and `ProviderTask` are their flattened counterparts,
//! holding ordered id references instead of embedded children.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Extra, Job, JobUid, ProviderTaskUid, RunStatus, RunUid, TaskStatus, TaskUid};

fn default_display() -> bool {
    true
}

/// A Run as returned by the API, with its job and provider tasks embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRun {
    pub uid: RunUid,

    /// Owning user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default)]
    pub status: RunStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_tasks: Option<Vec<ApiProviderTask>>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// A ProviderTask as returned by the API, with its tasks embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiProviderTask {
    pub uid: ProviderTaskUid,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default = "default_display")]
    pub display: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// A single export execution, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub uid: RunUid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default)]
    pub status: RunStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,

    /// Reference into the jobs map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobUid>,

    /// References into the provider tasks map, in display order.
    #[serde(default)]
    pub provider_tasks: Vec<ProviderTaskUid>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Run {
    /// Whether `username` owns this run.
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.user.as_deref() == Some(username)
    }
}

/// One data source's contribution to a Run, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTask {
    pub uid: ProviderTaskUid,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default = "default_display")]
    pub display: bool,

    /// References into the tasks map, in display order.
    #[serde(default)]
    pub tasks: Vec<TaskUid>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Result artifact of a finished task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub deleted: bool,
}

/// A single unit of work within a ProviderTask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub uid: TaskUid,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Value>,

    #[serde(default = "default_display")]
    pub display: bool,

    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_run_with_missing_children() {
        let run: ApiRun = serde_json::from_value(json!({
            "uid": "run-1",
            "status": "COMPLETED",
            "zipfile_url": "http://example.com/run-1.zip",
        }))
        .unwrap();

        assert!(run.job.is_none());
        assert!(run.provider_tasks.is_none());
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(
            run.extra.get("zipfile_url"),
            Some(&json!("http://example.com/run-1.zip"))
        );
    }

    #[test]
    fn test_run_ownership() {
        let run: Run = serde_json::from_value(json!({"uid": "run-1", "user": "admin"})).unwrap();
        assert!(run.is_owned_by("admin"));
        assert!(!run.is_owned_by("someone"));
    }
}
