//! EventKit Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Client-side state management
//! - Runtime specifics
//!
//! Records mirror the resources served by the EventKit API. The nested
//! `Api*` shapes are what the server returns; the flat shapes are what the
//! normalized store holds.

pub mod activity;
pub mod error;
pub mod group;
pub mod ids;
pub mod job;
pub mod notification;
pub mod provider;
pub mod run;
pub mod status;

// Re-export commonly used types
pub use activity::ViewedJob;
pub use error::CoreError;
pub use group::{Group, User, UserProfile};
pub use ids::{GroupId, JobUid, NotificationId, ProviderSlug, ProviderTaskUid, RunUid, TaskUid};
pub use job::{Job, JobPermissions, Permissions, Visibility};
pub use notification::Notification;
pub use provider::{Format, Provider};
pub use run::{ApiProviderTask, ApiRun, ProviderTask, Run, Task, TaskResult};
pub use status::{RunStatus, TaskStatus};

/// Extra JSON fields carried through untouched on every record.
pub type Extra = serde_json::Map<String, serde_json::Value>;
