use std::sync::Arc;

use eventkit_core::{Group, GroupId, User};

use super::{
    keep_if_equal, merge_entities, remove_entities, replace_entities, replace_ids, without,
};
use crate::action::Action;
use crate::state::{GroupsState, PageMeta, UsersState};
use crate::status::{FetchStatus, MutationStatus};

pub(super) fn reduce_groups(state: &Arc<GroupsState>, action: &Action) -> Arc<GroupsState> {
    let mut next = (**state).clone();

    match action {
        Action::FetchingGroups { cancel_source } => {
            next.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedGroups { groups } => {
            next.status = FetchStatus::received();
            next.groups = replace_entities(
                &next.groups,
                groups.iter().map(|g| (g.id.clone(), g.clone())),
            );
            let ids: Vec<GroupId> = groups.iter().map(|g| g.id.clone()).collect();
            next.ids = replace_ids(&next.ids, &ids);
        }
        Action::FetchGroupsError { error } => next.status = FetchStatus::failed(error.clone()),

        Action::CreatingGroup { .. } => next.creating = MutationStatus::pending(),
        Action::CreatedGroup => next.creating = MutationStatus::done(),
        Action::CreateGroupError { error } => {
            next.creating = MutationStatus::failed(error.clone());
        }

        Action::DeletingGroup { .. } => next.deleting = MutationStatus::pending(),
        Action::DeletedGroup { id } => {
            next.deleting = MutationStatus::done();
            next.groups = remove_entities(&next.groups, std::slice::from_ref(id));
            next.ids = without(&next.ids, id);
        }
        Action::DeleteGroupError { error } => {
            next.deleting = MutationStatus::failed(error.clone());
        }

        Action::AddingGroupUsers { .. } => next.adding = MutationStatus::pending(),
        Action::AddedGroupUsers { id, usernames } => {
            next.adding = MutationStatus::done();
            update_members(&mut next, id, |members| {
                for name in usernames {
                    if !members.contains(name) {
                        members.push(name.clone());
                    }
                }
            });
        }
        Action::AddGroupUsersError { error } => {
            next.adding = MutationStatus::failed(error.clone());
        }

        Action::RemovingGroupUsers { .. } => next.removing = MutationStatus::pending(),
        Action::RemovedGroupUsers { id, usernames } => {
            next.removing = MutationStatus::done();
            update_members(&mut next, id, |members| {
                members.retain(|name| !usernames.contains(name));
            });
        }
        Action::RemoveGroupUsersError { error } => {
            next.removing = MutationStatus::failed(error.clone());
        }

        _ => return state.clone(),
    }

    keep_if_equal(state, next)
}

/// Edit the member list of a group we hold. Unknown ids are ignored.
fn update_members(state: &mut GroupsState, id: &GroupId, edit: impl FnOnce(&mut Vec<String>)) {
    let Some(group) = state.groups.get(id) else {
        return;
    };
    let mut members = group.members.clone();
    edit(&mut members);
    let updated = Group {
        members,
        ..(**group).clone()
    };
    state.groups = merge_entities(&state.groups, [(id.clone(), updated)]);
}

pub(super) fn reduce_users(state: &Arc<UsersState>, action: &Action) -> Arc<UsersState> {
    let mut next = (**state).clone();

    match action {
        Action::FetchingUsers { cancel_source } => {
            next.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedUsers {
            users,
            append,
            total,
            next_page,
            range,
        } => {
            next.status = FetchStatus::received();
            next.total = *total;
            next.meta = PageMeta {
                next_page: *next_page,
                range: range.clone(),
            };
            let keyed = users.iter().map(|u| (u.username().to_string(), u.clone()));
            if *append {
                next.users = merge_entities(&next.users, keyed);
                let mut ids = (*next.ids).clone();
                for user in users {
                    if !ids.iter().any(|name| name == user.username()) {
                        ids.push(user.username().to_string());
                    }
                }
                next.ids = replace_ids(&next.ids, &ids);
            } else {
                next.users = replace_entities(&next.users, keyed);
                next.ids = replace_ids(&next.ids, &usernames(users));
            }
        }
        // Paging is reset on failure; users already held stay.
        Action::FetchUsersError { error } => {
            next.status = FetchStatus::failed(error.clone());
            next.total = 0;
            next.meta = PageMeta::default();
        }
        Action::ClearUsers => next = UsersState::default(),

        _ => return state.clone(),
    }

    keep_if_equal(state, next)
}

fn usernames(users: &[User]) -> Vec<String> {
    users.iter().map(|u| u.username().to_string()).collect()
}
