//! Lifecycle messages folded into state by the reducers.

use serde_json::Value;

use eventkit_client::CancelSource;
use eventkit_core::{
    Group, GroupId, JobUid, Notification, NotificationId, Provider, ProviderSlug, ProviderTaskUid,
    RunUid, User,
};

use crate::normalizer::Entities;

/// Everything that can happen to application state.
///
/// Fetches follow `Fetching* -> Received* | *Error`; mutations follow
/// `*ing -> *ed | *Error`. Error variants carry the server payload verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Run list
    FetchingRuns {
        cancel_source: CancelSource,
    },
    ReceivedRuns {
        ids: Vec<RunUid>,
        next_page: bool,
        range: String,
    },
    FetchRunsError {
        error: Value,
    },
    AddRun {
        id: RunUid,
        username: Option<String>,
        entities: Entities,
    },

    // Featured runs
    FetchingFeaturedRuns {
        cancel_source: CancelSource,
    },
    ReceivedFeaturedRuns {
        ids: Vec<RunUid>,
        next_page: bool,
        range: String,
    },
    FetchFeaturedRunsError {
        error: Value,
    },
    AddFeaturedRun {
        id: RunUid,
        username: Option<String>,
        entities: Entities,
    },

    // Viewed jobs
    FetchingViewedJobs {
        cancel_source: CancelSource,
    },
    ReceivedViewedJobs {
        ids: Vec<RunUid>,
        next_page: bool,
        range: String,
    },
    FetchViewedJobsError {
        error: Value,
    },
    AddViewedRun {
        id: RunUid,
        username: Option<String>,
        entities: Entities,
    },

    // DataPack details
    GettingDatacartDetails {
        cancel_source: CancelSource,
    },
    DatacartDetailsReceived {
        ids: Vec<RunUid>,
    },
    DatacartDetailsError {
        error: Value,
    },
    ClearDatacartDetails,

    // Run mutations
    DeletingRun {
        id: RunUid,
    },
    DeletedRun {
        id: RunUid,
    },
    DeleteRunError {
        error: Value,
    },
    UpdatingExpiration {
        id: RunUid,
    },
    UpdateExpirationSuccess {
        id: RunUid,
    },
    UpdateExpirationError {
        error: Value,
    },
    RerunningExport {
        job_uid: JobUid,
    },
    RerunExportSuccess {
        data: Value,
    },
    RerunExportError {
        error: Value,
    },
    ClearRerunInfo,
    UpdatingPermission {
        job_uid: JobUid,
    },
    UpdatePermissionSuccess {
        job_uid: JobUid,
    },
    UpdatePermissionError {
        error: Value,
    },
    CancelingProviderTask {
        uid: ProviderTaskUid,
    },
    CanceledProviderTask {
        uid: ProviderTaskUid,
    },
    CancelProviderTaskError {
        error: Value,
    },

    // List presentation
    SetPageOrder {
        order: String,
    },
    SetPageView {
        view: String,
    },

    // Providers
    FetchingProviders {
        cancel_source: CancelSource,
    },
    ReceivedProviders {
        providers: Vec<Provider>,
    },
    FetchProvidersError {
        error: Value,
    },
    FilteringProviders {
        cancel_source: CancelSource,
    },
    ReceivedFilteredProviders {
        providers: Vec<Provider>,
    },
    FilterProvidersError {
        error: Value,
    },
    UpdatingFavorite {
        slug: ProviderSlug,
    },
    UpdatedFavorite {
        slug: ProviderSlug,
        favorite: bool,
    },
    UpdateFavoriteError {
        error: Value,
    },

    // Notifications
    FetchingNotifications {
        cancel_source: CancelSource,
    },
    ReceivedNotifications {
        notifications: Vec<Notification>,
        next_page: bool,
        range: String,
    },
    FetchNotificationsError {
        error: Value,
    },
    MarkingNotificationsAsRead {
        ids: Vec<NotificationId>,
    },
    MarkedNotificationsAsRead,
    MarkNotificationsAsReadError {
        error: Value,
    },
    MarkingNotificationsAsUnread {
        ids: Vec<NotificationId>,
    },
    MarkedNotificationsAsUnread,
    MarkNotificationsAsUnreadError {
        error: Value,
    },
    MarkingAllNotificationsAsRead,
    MarkedAllNotificationsAsRead,
    MarkAllNotificationsAsReadError {
        error: Value,
    },
    RemovingNotifications {
        ids: Vec<NotificationId>,
    },
    RemovedNotifications,
    RemoveNotificationsError {
        error: Value,
    },
    FetchingNotificationsUnreadCount {
        cancel_source: CancelSource,
    },
    ReceivedNotificationsUnreadCount {
        unread_count: u64,
    },
    FetchNotificationsUnreadCountError {
        error: Value,
    },

    // Job views
    ViewingJob {
        job_uid: JobUid,
    },
    ViewedJob {
        job_uid: JobUid,
    },
    ViewJobError {
        error: Value,
    },

    // Groups
    FetchingGroups {
        cancel_source: CancelSource,
    },
    ReceivedGroups {
        groups: Vec<Group>,
    },
    FetchGroupsError {
        error: Value,
    },
    CreatingGroup {
        name: String,
    },
    CreatedGroup,
    CreateGroupError {
        error: Value,
    },
    DeletingGroup {
        id: GroupId,
    },
    DeletedGroup {
        id: GroupId,
    },
    DeleteGroupError {
        error: Value,
    },
    AddingGroupUsers {
        id: GroupId,
    },
    AddedGroupUsers {
        id: GroupId,
        usernames: Vec<String>,
    },
    AddGroupUsersError {
        error: Value,
    },
    RemovingGroupUsers {
        id: GroupId,
    },
    RemovedGroupUsers {
        id: GroupId,
        usernames: Vec<String>,
    },
    RemoveGroupUsersError {
        error: Value,
    },

    // User directory
    FetchingUsers {
        cancel_source: CancelSource,
    },
    ReceivedUsers {
        users: Vec<User>,
        /// Add to the users already held instead of replacing them.
        append: bool,
        total: u64,
        next_page: bool,
        range: String,
    },
    FetchUsersError {
        error: Value,
    },
    ClearUsers,

    // Session
    UserLoggedIn {
        username: String,
    },
    UserLoggedOut,
}

impl Action {
    /// Wire-style type name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchingRuns { .. } => "FETCHING_RUNS",
            Self::ReceivedRuns { .. } => "RECEIVED_RUNS",
            Self::FetchRunsError { .. } => "FETCH_RUNS_ERROR",
            Self::AddRun { .. } => "ADD_RUN",
            Self::FetchingFeaturedRuns { .. } => "FETCHING_FEATURED_RUNS",
            Self::ReceivedFeaturedRuns { .. } => "RECEIVED_FEATURED_RUNS",
            Self::FetchFeaturedRunsError { .. } => "FETCH_FEATURED_RUNS_ERROR",
            Self::AddFeaturedRun { .. } => "ADD_FEATURED_RUN",
            Self::FetchingViewedJobs { .. } => "FETCHING_VIEWED_JOBS",
            Self::ReceivedViewedJobs { .. } => "RECEIVED_VIEWED_JOBS",
            Self::FetchViewedJobsError { .. } => "FETCH_VIEWED_JOBS_ERROR",
            Self::AddViewedRun { .. } => "ADD_VIEWED_RUN",
            Self::GettingDatacartDetails { .. } => "GETTING_DATACART_DETAILS",
            Self::DatacartDetailsReceived { .. } => "DATACART_DETAILS_RECEIVED",
            Self::DatacartDetailsError { .. } => "DATACART_DETAILS_ERROR",
            Self::ClearDatacartDetails => "CLEAR_DATACART_DETAILS",
            Self::DeletingRun { .. } => "DELETING_RUN",
            Self::DeletedRun { .. } => "DELETED_RUN",
            Self::DeleteRunError { .. } => "DELETE_RUN_ERROR",
            Self::UpdatingExpiration { .. } => "UPDATING_EXPIRATION",
            Self::UpdateExpirationSuccess { .. } => "UPDATE_EXPIRATION_SUCCESS",
            Self::UpdateExpirationError { .. } => "UPDATE_EXPIRATION_ERROR",
            Self::RerunningExport { .. } => "RERUNNING_EXPORT",
            Self::RerunExportSuccess { .. } => "RERUN_EXPORT_SUCCESS",
            Self::RerunExportError { .. } => "RERUN_EXPORT_ERROR",
            Self::ClearRerunInfo => "CLEAR_RERUN_INFO",
            Self::UpdatingPermission { .. } => "UPDATING_PERMISSION",
            Self::UpdatePermissionSuccess { .. } => "UPDATE_PERMISSION_SUCCESS",
            Self::UpdatePermissionError { .. } => "UPDATE_PERMISSION_ERROR",
            Self::CancelingProviderTask { .. } => "CANCELING_PROVIDER_TASK",
            Self::CanceledProviderTask { .. } => "CANCELED_PROVIDER_TASK",
            Self::CancelProviderTaskError { .. } => "CANCEL_PROVIDER_TASK_ERROR",
            Self::SetPageOrder { .. } => "SET_PAGE_ORDER",
            Self::SetPageView { .. } => "SET_PAGE_VIEW",
            Self::FetchingProviders { .. } => "FETCHING_PROVIDERS",
            Self::ReceivedProviders { .. } => "RECEIVED_PROVIDERS",
            Self::FetchProvidersError { .. } => "FETCH_PROVIDERS_ERROR",
            Self::FilteringProviders { .. } => "FILTERING_PROVIDERS",
            Self::ReceivedFilteredProviders { .. } => "RECEIVED_FILTERED_PROVIDERS",
            Self::FilterProvidersError { .. } => "FILTER_PROVIDERS_ERROR",
            Self::UpdatingFavorite { .. } => "UPDATING_FAVORITE",
            Self::UpdatedFavorite { .. } => "UPDATED_FAVORITE",
            Self::UpdateFavoriteError { .. } => "UPDATE_FAVORITE_ERROR",
            Self::FetchingNotifications { .. } => "FETCHING_NOTIFICATIONS",
            Self::ReceivedNotifications { .. } => "RECEIVED_NOTIFICATIONS",
            Self::FetchNotificationsError { .. } => "FETCH_NOTIFICATIONS_ERROR",
            Self::MarkingNotificationsAsRead { .. } => "MARKING_NOTIFICATIONS_AS_READ",
            Self::MarkedNotificationsAsRead => "MARKED_NOTIFICATIONS_AS_READ",
            Self::MarkNotificationsAsReadError { .. } => "MARK_NOTIFICATIONS_AS_READ_ERROR",
            Self::MarkingNotificationsAsUnread { .. } => "MARKING_NOTIFICATIONS_AS_UNREAD",
            Self::MarkedNotificationsAsUnread => "MARKED_NOTIFICATIONS_AS_UNREAD",
            Self::MarkNotificationsAsUnreadError { .. } => "MARK_NOTIFICATIONS_AS_UNREAD_ERROR",
            Self::MarkingAllNotificationsAsRead => "MARKING_ALL_NOTIFICATIONS_AS_READ",
            Self::MarkedAllNotificationsAsRead => "MARKED_ALL_NOTIFICATIONS_AS_READ",
            Self::MarkAllNotificationsAsReadError { .. } => "MARK_ALL_NOTIFICATIONS_AS_READ_ERROR",
            Self::RemovingNotifications { .. } => "REMOVING_NOTIFICATIONS",
            Self::RemovedNotifications => "REMOVED_NOTIFICATIONS",
            Self::RemoveNotificationsError { .. } => "REMOVE_NOTIFICATIONS_ERROR",
            Self::FetchingNotificationsUnreadCount { .. } => "FETCHING_NOTIFICATIONS_UNREAD_COUNT",
            Self::ReceivedNotificationsUnreadCount { .. } => "RECEIVED_NOTIFICATIONS_UNREAD_COUNT",
            Self::FetchNotificationsUnreadCountError { .. } => {
                "FETCH_NOTIFICATIONS_UNREAD_COUNT_ERROR"
            }
            Self::ViewingJob { .. } => "VIEWING_JOB",
            Self::ViewedJob { .. } => "VIEWED_JOB",
            Self::ViewJobError { .. } => "VIEW_JOB_ERROR",
            Self::FetchingGroups { .. } => "FETCHING_GROUPS",
            Self::ReceivedGroups { .. } => "FETCHED_GROUPS",
            Self::FetchGroupsError { .. } => "FETCH_GROUPS_ERROR",
            Self::CreatingGroup { .. } => "CREATING_GROUP",
            Self::CreatedGroup => "CREATED_GROUP",
            Self::CreateGroupError { .. } => "CREATE_GROUP_ERROR",
            Self::DeletingGroup { .. } => "DELETING_GROUP",
            Self::DeletedGroup { .. } => "DELETED_GROUP",
            Self::DeleteGroupError { .. } => "DELETE_GROUP_ERROR",
            Self::AddingGroupUsers { .. } => "ADDING_GROUP_USERS",
            Self::AddedGroupUsers { .. } => "ADDED_GROUP_USERS",
            Self::AddGroupUsersError { .. } => "ADDING_GROUP_USERS_ERROR",
            Self::RemovingGroupUsers { .. } => "REMOVING_GROUP_USERS",
            Self::RemovedGroupUsers { .. } => "REMOVED_GROUP_USERS",
            Self::RemoveGroupUsersError { .. } => "REMOVING_GROUP_USERS_ERROR",
            Self::FetchingUsers { .. } => "FETCHING_USERS",
            Self::ReceivedUsers { .. } => "RECEIVED_USERS",
            Self::FetchUsersError { .. } => "FETCH_USERS_ERROR",
            Self::ClearUsers => "CLEAR_USERS",
            Self::UserLoggedIn { .. } => "USER_LOGGED_IN",
            Self::UserLoggedOut => "USER_LOGGED_OUT",
        }
    }

    /// Whether this action reports a failure.
    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Server payload carried by an error action.
    pub fn error(&self) -> Option<&Value> {
        match self {
            Self::FetchRunsError { error }
            | Self::FetchFeaturedRunsError { error }
            | Self::FetchViewedJobsError { error }
            | Self::DatacartDetailsError { error }
            | Self::DeleteRunError { error }
            | Self::UpdateExpirationError { error }
            | Self::RerunExportError { error }
            | Self::UpdatePermissionError { error }
            | Self::CancelProviderTaskError { error }
            | Self::FetchProvidersError { error }
            | Self::FilterProvidersError { error }
            | Self::UpdateFavoriteError { error }
            | Self::FetchNotificationsError { error }
            | Self::MarkNotificationsAsReadError { error }
            | Self::MarkNotificationsAsUnreadError { error }
            | Self::MarkAllNotificationsAsReadError { error }
            | Self::RemoveNotificationsError { error }
            | Self::FetchNotificationsUnreadCountError { error }
            | Self::ViewJobError { error }
            | Self::FetchGroupsError { error }
            | Self::CreateGroupError { error }
            | Self::DeleteGroupError { error }
            | Self::AddGroupUsersError { error }
            | Self::RemoveGroupUsersError { error }
            | Self::FetchUsersError { error } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names() {
        assert_eq!(Action::UserLoggedOut.name(), "USER_LOGGED_OUT");
        assert_eq!(
            Action::MarkingNotificationsAsRead { ids: vec![] }.name(),
            "MARKING_NOTIFICATIONS_AS_READ"
        );
        assert_eq!(
            Action::FetchingRuns {
                cancel_source: CancelSource::new()
            }
            .name(),
            "FETCHING_RUNS"
        );
    }

    #[test]
    fn test_error_payload() {
        let action = Action::FetchRunsError {
            error: json!("oh no an error"),
        };
        assert!(action.is_error());
        assert_eq!(action.error(), Some(&json!("oh no an error")));
        assert!(!Action::ClearRerunInfo.is_error());
    }
}
