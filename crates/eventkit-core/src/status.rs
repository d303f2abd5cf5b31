//! Status enums for Runs and Tasks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Status of an export Run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Run accepted by the server, not yet started.
    Submitted,
    /// Run waiting for a worker.
    Pending,
    /// Run actively executing.
    Running,
    /// Every provider finished successfully.
    Completed,
    /// Some providers failed or were canceled.
    Incomplete,
    /// Run failed.
    Failed,
    /// Run was canceled.
    Canceled,
    /// Any status this client does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Returns true if the run is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Incomplete | Self::Failed | Self::Canceled
        )
    }

    /// Returns true if the run is still active (not terminal).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitted | Self::Pending | Self::Running)
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Incomplete => "INCOMPLETE",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = CoreError;

    /// Parse a status name, ignoring case. `Unknown` is not accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("empty status".to_string()));
        }
        [
            Self::Submitted,
            Self::Pending,
            Self::Running,
            Self::Completed,
            Self::Incomplete,
            Self::Failed,
            Self::Canceled,
        ]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(name))
        .ok_or_else(|| CoreError::UnknownStatus(name.to_string()))
    }
}

/// Status of a ProviderTask or Task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Completed,
    Incomplete,
    Failed,
    Canceled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Returns true if the task can no longer change.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Completed | Self::Incomplete | Self::Failed | Self::Canceled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_is_tolerated() {
        let status: RunStatus = serde_json::from_str("\"ARCHIVED\"").unwrap();
        assert_eq!(status, RunStatus::Unknown);
    }

    #[test]
    fn test_run_status_round_names() {
        let status: RunStatus = serde_json::from_str("\"INCOMPLETE\"").unwrap();
        assert_eq!(status, RunStatus::Incomplete);
        assert!(status.is_terminal());
        assert_eq!(status.to_string(), "INCOMPLETE");
    }

    #[test]
    fn test_parse_run_status() {
        assert_eq!("completed".parse::<RunStatus>(), Ok(RunStatus::Completed));
        assert_eq!(" FAILED ".parse::<RunStatus>(), Ok(RunStatus::Failed));
        assert_eq!(
            "archived".parse::<RunStatus>(),
            Err(CoreError::UnknownStatus("archived".to_string()))
        );
        assert_eq!(
            "unknown".parse::<RunStatus>(),
            Err(CoreError::UnknownStatus("unknown".to_string()))
        );
        assert!(matches!("".parse::<RunStatus>(), Err(CoreError::InvalidInput(_))));
    }
}
