//! User activity records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApiRun, Extra};

/// A job the user recently viewed, with the run that was current at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewedJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_export_run: Option<ApiRun>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Extra,
}
