use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use eventkit_core::{Notification, NotificationId};

use super::{keep_if_equal, remove_entities, replace_entities, replace_ids};
use crate::action::Action;
use crate::state::{EntityMap, NotificationsState, PageMeta};
use crate::status::FetchStatus;

pub(super) fn reduce(state: &Arc<NotificationsState>, action: &Action) -> Arc<NotificationsState> {
    let mut next = (**state).clone();

    match action {
        Action::FetchingNotifications { cancel_source } => {
            next.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedNotifications {
            notifications,
            next_page,
            range,
        } => {
            next.status = FetchStatus::received();
            next.meta = PageMeta {
                next_page: *next_page,
                range: range.clone(),
            };
            next.notifications = replace_entities(
                &next.notifications,
                notifications.iter().map(|n| (n.id.clone(), n.clone())),
            );
            resort(&mut next);
        }
        Action::FetchNotificationsError { error } => {
            next.status = FetchStatus::failed(error.clone());
        }

        Action::MarkingNotificationsAsRead { ids } => set_unread(&mut next, ids, false),
        Action::MarkingNotificationsAsUnread { ids } => set_unread(&mut next, ids, true),
        Action::MarkingAllNotificationsAsRead => {
            let ids: Vec<NotificationId> = next.notifications.keys().cloned().collect();
            set_unread(&mut next, &ids, false);
            next.unread_count.unread_count = 0;
        }
        Action::RemovingNotifications { ids } => {
            let removed_unread = ids
                .iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .filter(|id| next.notifications.get(*id).is_some_and(|n| n.unread))
                .count() as u64;
            next.notifications = remove_entities(&next.notifications, ids);
            next.unread_count.unread_count =
                next.unread_count.unread_count.saturating_sub(removed_unread);
            resort(&mut next);
        }

        // The optimistic update already happened; errors are surfaced but
        // not rolled back.
        Action::MarkNotificationsAsReadError { error }
        | Action::MarkNotificationsAsUnreadError { error }
        | Action::MarkAllNotificationsAsReadError { error }
        | Action::RemoveNotificationsError { error } => {
            next.status.error = Some(error.clone());
        }

        Action::FetchingNotificationsUnreadCount { cancel_source } => {
            next.unread_count.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedNotificationsUnreadCount { unread_count } => {
            next.unread_count.status = FetchStatus::received();
            next.unread_count.unread_count = *unread_count;
        }
        Action::FetchNotificationsUnreadCountError { error } => {
            next.unread_count.status = FetchStatus::failed(error.clone());
        }

        _ => return state.clone(),
    }

    keep_if_equal(state, next)
}

/// Flip the unread flag of the listed notifications, adjusting the counter
/// by the number that actually changed.
fn set_unread(state: &mut NotificationsState, ids: &[NotificationId], unread: bool) {
    let changed: BTreeMap<NotificationId, Arc<Notification>> = ids
        .iter()
        .filter_map(|id| state.notifications.get(id))
        .filter(|n| n.unread != unread)
        .map(|n| (n.id.clone(), Arc::new(n.with_unread(unread))))
        .collect();

    if changed.is_empty() {
        return;
    }

    let delta = changed.len() as u64;
    let count = &mut state.unread_count.unread_count;
    *count = if unread {
        count.saturating_add(delta)
    } else {
        count.saturating_sub(delta)
    };

    let mut notifications = (*state.notifications).clone();
    notifications.extend(changed);
    state.notifications = Arc::new(notifications);
}

/// Rebuild the display order: newest first, ties broken by id.
fn resort(state: &mut NotificationsState) {
    let ids = sorted_ids(&state.notifications);
    state.notifications_sorted = replace_ids(&state.notifications_sorted, &ids);
}

fn sorted_ids(notifications: &EntityMap<NotificationId, Notification>) -> Vec<NotificationId> {
    let mut entries: Vec<&Arc<Notification>> = notifications.values().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
    entries.into_iter().map(|n| n.id.clone()).collect()
}
