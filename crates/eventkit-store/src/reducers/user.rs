use std::sync::Arc;

use super::keep_if_equal;
use crate::action::Action;
use crate::state::{UserActivityState, UserState};
use crate::status::MutationStatus;

pub(super) fn reduce_user(state: &Arc<UserState>, action: &Action) -> Arc<UserState> {
    match action {
        Action::UserLoggedIn { username } => keep_if_equal(
            state,
            UserState {
                username: Some(username.clone()),
            },
        ),
        _ => state.clone(),
    }
}

pub(super) fn reduce_activity(
    state: &Arc<UserActivityState>,
    action: &Action,
) -> Arc<UserActivityState> {
    let viewing = match action {
        Action::ViewingJob { .. } => MutationStatus::pending(),
        Action::ViewedJob { .. } => MutationStatus::done(),
        Action::ViewJobError { error } => MutationStatus::failed(error.clone()),
        _ => return state.clone(),
    };
    keep_if_equal(state, UserActivityState { viewing })
}
