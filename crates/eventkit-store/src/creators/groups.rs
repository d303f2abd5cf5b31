use tokio::task::JoinHandle;

use eventkit_client::{endpoints, ApiRequest, PageInfo};
use eventkit_core::{Group, GroupId, JobUid, User};

use super::Session;
use crate::action::Action;

impl Session {
    /// Groups visible to the user. `params` go out as the query string.
    pub fn get_groups(&self, params: Vec<(String, String)>) -> Option<JoinHandle<()>> {
        let cancel = self.begin_fetch(
            "groups",
            false,
            |state| &state.groups.status,
            |cancel_source| Action::FetchingGroups { cancel_source },
        )?;

        Some(self.fetch(
            "groups",
            cancel,
            endpoints::groups(params),
            |response| response.json::<Vec<Group>>(),
            |outcome, groups| {
                outcome.dispatch(Action::ReceivedGroups { groups });
            },
            |error| Action::FetchGroupsError { error },
        ))
    }

    pub fn create_group(&self, name: &str, members: &[String]) -> Option<JoinHandle<()>> {
        self.store.dispatch(Action::CreatingGroup {
            name: name.to_string(),
        });
        Some(self.mutate(
            "create group",
            endpoints::create_group(name, members),
            |_| Action::CreatedGroup,
            |error| Action::CreateGroupError { error },
        ))
    }

    pub fn delete_group(&self, id: &GroupId) -> Option<JoinHandle<()>> {
        self.store
            .dispatch(Action::DeletingGroup { id: id.clone() });
        let deleted = id.clone();
        Some(self.mutate(
            "delete group",
            endpoints::delete_group(id),
            move |_| Action::DeletedGroup { id: deleted },
            |error| Action::DeleteGroupError { error },
        ))
    }

    pub fn add_group_users(&self, id: &GroupId, usernames: Vec<String>) -> Option<JoinHandle<()>> {
        self.store
            .dispatch(Action::AddingGroupUsers { id: id.clone() });
        let added = id.clone();
        Some(self.mutate(
            "add group users",
            endpoints::add_group_users(id, &usernames),
            move |_| Action::AddedGroupUsers {
                id: added,
                usernames,
            },
            |error| Action::AddGroupUsersError { error },
        ))
    }

    pub fn remove_group_users(
        &self,
        id: &GroupId,
        usernames: Vec<String>,
    ) -> Option<JoinHandle<()>> {
        self.store
            .dispatch(Action::RemovingGroupUsers { id: id.clone() });
        let removed = id.clone();
        Some(self.mutate(
            "remove group users",
            endpoints::remove_group_users(id, &usernames),
            move |_| Action::RemovedGroupUsers {
                id: removed,
                usernames,
            },
            |error| Action::RemoveGroupUsersError { error },
        ))
    }

    /// One page of the user directory. With `append` the page is added to
    /// the users already held, for infinite scrolling.
    pub fn get_users(&self, params: Vec<(String, String)>, append: bool) -> Option<JoinHandle<()>> {
        self.fetch_users(endpoints::users(params), append)
    }

    /// Like [`get_users`](Self::get_users), with each user's permission on
    /// `job_uid`.
    pub fn get_permission_users(
        &self,
        job_uid: &JobUid,
        params: Vec<(String, String)>,
        append: bool,
    ) -> Option<JoinHandle<()>> {
        self.fetch_users(endpoints::permission_users(job_uid, params), append)
    }

    pub fn clear_users(&self) {
        self.store.dispatch(Action::ClearUsers);
    }

    fn fetch_users(&self, request: ApiRequest, append: bool) -> Option<JoinHandle<()>> {
        let cancel = self.begin_fetch(
            "users",
            false,
            |state| &state.users.status,
            |cancel_source| Action::FetchingUsers { cancel_source },
        )?;

        Some(self.fetch(
            "users",
            cancel,
            request,
            |response| {
                Ok((
                    response.page_info(),
                    response.count_header(endpoints::TOTAL_USERS_HEADER),
                    response.json::<Vec<User>>()?,
                ))
            },
            move |outcome, (page, total, users): (PageInfo, u64, Vec<User>)| {
                outcome.dispatch(Action::ReceivedUsers {
                    users,
                    append,
                    total,
                    next_page: page.next_page,
                    range: page.range,
                });
            },
            |error| Action::FetchUsersError { error },
        ))
    }
}
