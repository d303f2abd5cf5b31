//! Application state snapshots.
//!
//! Every slice sits behind an `Arc`, and so does every entity map, id list
//! and entity. Reducers hand back the same pointer for anything they did not
//! change, so a caller can tell what moved with `Arc::ptr_eq`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use eventkit_core::{
    Group, GroupId, Job, JobUid, Notification, NotificationId, Provider, ProviderSlug,
    ProviderTask, ProviderTaskUid, Run, RunUid, Task, TaskUid, User,
};

use crate::status::{FetchStatus, MutationStatus};

/// Id-keyed entity map.
pub type EntityMap<K, V> = Arc<BTreeMap<K, Arc<V>>>;

/// Ordered id list.
pub type IdList<K> = Arc<Vec<K>>;

/// Root of application state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub exports: Arc<ExportsState>,
    pub notifications: Arc<NotificationsState>,
    pub providers: Arc<ProvidersState>,
    pub user_activity: Arc<UserActivityState>,
    pub user: Arc<UserState>,
    pub groups: Arc<GroupsState>,
    pub users: Arc<UsersState>,
}

impl AppState {
    /// True when every slice is the same allocation in both states.
    pub fn same_slices(&self, other: &AppState) -> bool {
        Arc::ptr_eq(&self.exports, &other.exports)
            && Arc::ptr_eq(&self.notifications, &other.notifications)
            && Arc::ptr_eq(&self.providers, &other.providers)
            && Arc::ptr_eq(&self.user_activity, &other.user_activity)
            && Arc::ptr_eq(&self.user, &other.user)
            && Arc::ptr_eq(&self.groups, &other.groups)
            && Arc::ptr_eq(&self.users, &other.users)
    }

    /// Name of the logged in user.
    pub fn username(&self) -> Option<&str> {
        self.user.username.as_deref()
    }
}

/// Paging state of the last list response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub next_page: bool,
    pub range: String,
}

/// An ordered list of runs together with the fetch that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunList {
    pub status: FetchStatus,
    pub meta: PageMeta,
    pub ids: IdList<RunUid>,
}

/// Normalized run entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportsData {
    pub runs: EntityMap<RunUid, Run>,
    pub jobs: EntityMap<JobUid, Job>,
    pub provider_tasks: EntityMap<ProviderTaskUid, ProviderTask>,
    pub tasks: EntityMap<TaskUid, Task>,
}

impl ExportsData {
    pub fn run(&self, id: &RunUid) -> Option<&Arc<Run>> {
        self.runs.get(id)
    }

    /// Resolve a list of run ids, skipping ids with no entity.
    pub fn runs_for(&self, ids: &[RunUid]) -> Vec<Arc<Run>> {
        ids.iter().filter_map(|id| self.runs.get(id).cloned()).collect()
    }

    pub fn job_for(&self, run: &Run) -> Option<&Arc<Job>> {
        run.job.as_ref().and_then(|id| self.jobs.get(id))
    }

    /// Provider tasks of a run in display order.
    pub fn provider_tasks_for(&self, run: &Run) -> Vec<Arc<ProviderTask>> {
        run.provider_tasks
            .iter()
            .filter_map(|id| self.provider_tasks.get(id).cloned())
            .collect()
    }

    pub fn tasks_for(&self, provider_task: &ProviderTask) -> Vec<Arc<Task>> {
        provider_task
            .tasks
            .iter()
            .filter_map(|id| self.tasks.get(id).cloned())
            .collect()
    }
}

/// Runs fetched for the DataPack details page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatacartDetails {
    pub status: FetchStatus,
    pub ids: IdList<RunUid>,
}

/// Outcome of the last rerun request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RerunInfo {
    pub status: MutationStatus,
    pub data: Option<Value>,
}

/// Runs and everything hanging off them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportsState {
    pub data: ExportsData,

    /// Result of the last filtered search, in server order.
    pub all: RunList,
    pub featured: RunList,
    pub viewed: RunList,
    /// Runs owned by the logged in user, in the order they were first seen.
    pub own: IdList<RunUid>,

    pub order: String,
    pub view: String,

    pub datacart_details: DatacartDetails,
    pub deletion: MutationStatus,
    pub expiration: MutationStatus,
    pub permissions: MutationStatus,
    pub provider_task_cancel: MutationStatus,
    pub rerun: RerunInfo,
}

/// Unread notification counter and the fetch that last set it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnreadCount {
    pub status: FetchStatus,
    pub unread_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationsState {
    pub status: FetchStatus,
    pub meta: PageMeta,
    pub notifications: EntityMap<NotificationId, Notification>,
    /// Ids ordered by timestamp, newest first.
    pub notifications_sorted: IdList<NotificationId>,
    pub unread_count: UnreadCount,
}

impl NotificationsState {
    /// Notifications in display order.
    pub fn sorted(&self) -> Vec<Arc<Notification>> {
        self.notifications_sorted
            .iter()
            .filter_map(|id| self.notifications.get(id).cloned())
            .collect()
    }

    /// Number of unread notifications held in the map.
    pub fn unread_in_map(&self) -> u64 {
        self.notifications.values().filter(|n| n.unread).count() as u64
    }
}

/// Providers visible to an area of interest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredProviders {
    pub status: FetchStatus,
    pub ids: IdList<ProviderSlug>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvidersState {
    pub status: FetchStatus,
    pub providers: EntityMap<ProviderSlug, Provider>,
    /// Slugs in the order the server listed them.
    pub ids: IdList<ProviderSlug>,
    pub filtered: FilteredProviders,
    pub favorite: MutationStatus,
}

impl ProvidersState {
    pub fn listed(&self) -> Vec<Arc<Provider>> {
        self.ids
            .iter()
            .filter_map(|slug| self.providers.get(slug).cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserActivityState {
    /// Last "record job view" request.
    pub viewing: MutationStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    pub username: Option<String>,
}

/// Sharing groups and the state of each group mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupsState {
    pub status: FetchStatus,
    pub groups: EntityMap<GroupId, Group>,
    /// Ids in the order the server listed them.
    pub ids: IdList<GroupId>,
    pub creating: MutationStatus,
    pub deleting: MutationStatus,
    pub adding: MutationStatus,
    pub removing: MutationStatus,
}

impl GroupsState {
    pub fn listed(&self) -> Vec<Arc<Group>> {
        self.ids
            .iter()
            .filter_map(|id| self.groups.get(id).cloned())
            .collect()
    }
}

/// A page, or several appended pages, of the user directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsersState {
    pub status: FetchStatus,
    pub meta: PageMeta,
    /// Size of the whole directory, from the `Total-Users` header.
    pub total: u64,
    pub users: EntityMap<String, User>,
    /// Usernames in the order received.
    pub ids: IdList<String>,
}

impl UsersState {
    pub fn listed(&self) -> Vec<Arc<User>> {
        self.ids
            .iter()
            .filter_map(|name| self.users.get(name).cloned())
            .collect()
    }
}
