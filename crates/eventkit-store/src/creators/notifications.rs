use serde::Deserialize;
use tokio::task::JoinHandle;

use eventkit_client::{endpoints, MarkAction, PageInfo};
use eventkit_core::{Notification, NotificationId};

use super::Session;
use crate::action::Action;

/// Body of the unread counts endpoint.
#[derive(Debug, Deserialize)]
struct Counts {
    unread: u64,
}

/// Notification operations require a logged in user; without one they
/// return `None` and dispatch nothing.
impl Session {
    pub fn get_notifications(
        &self,
        page_size: Option<u32>,
        is_auto: bool,
    ) -> Option<JoinHandle<()>> {
        self.state().username()?;
        let cancel = self.begin_fetch(
            "notifications",
            is_auto,
            |state| &state.notifications.status,
            |cancel_source| Action::FetchingNotifications { cancel_source },
        )?;

        Some(self.fetch(
            "notifications",
            cancel,
            endpoints::notifications(page_size),
            |response| Ok((response.page_info(), response.json::<Vec<Notification>>()?)),
            |outcome, (page, notifications): (PageInfo, Vec<Notification>)| {
                outcome.dispatch(Action::ReceivedNotifications {
                    notifications,
                    next_page: page.next_page,
                    range: page.range,
                });
            },
            |error| Action::FetchNotificationsError { error },
        ))
    }

    /// Mark notifications read. Local state changes before this returns.
    pub fn mark_notifications_as_read(&self, ids: Vec<NotificationId>) -> Option<JoinHandle<()>> {
        self.state().username()?;
        let request = endpoints::mark_notifications(&ids, MarkAction::Read);
        self.store
            .dispatch(Action::MarkingNotificationsAsRead { ids });
        Some(self.mutate(
            "mark notifications read",
            request,
            |_| Action::MarkedNotificationsAsRead,
            |error| Action::MarkNotificationsAsReadError { error },
        ))
    }

    pub fn mark_notifications_as_unread(
        &self,
        ids: Vec<NotificationId>,
    ) -> Option<JoinHandle<()>> {
        self.state().username()?;
        let request = endpoints::mark_notifications(&ids, MarkAction::Unread);
        self.store
            .dispatch(Action::MarkingNotificationsAsUnread { ids });
        Some(self.mutate(
            "mark notifications unread",
            request,
            |_| Action::MarkedNotificationsAsUnread,
            |error| Action::MarkNotificationsAsUnreadError { error },
        ))
    }

    pub fn mark_all_notifications_as_read(&self) -> Option<JoinHandle<()>> {
        self.state().username()?;
        self.store.dispatch(Action::MarkingAllNotificationsAsRead);
        Some(self.mutate(
            "mark all notifications read",
            endpoints::mark_all_notifications_as_read(),
            |_| Action::MarkedAllNotificationsAsRead,
            |error| Action::MarkAllNotificationsAsReadError { error },
        ))
    }

    pub fn remove_notifications(&self, ids: Vec<NotificationId>) -> Option<JoinHandle<()>> {
        self.state().username()?;
        let request = endpoints::mark_notifications(&ids, MarkAction::Delete);
        self.store.dispatch(Action::RemovingNotifications { ids });
        Some(self.mutate(
            "remove notifications",
            request,
            |_| Action::RemovedNotifications,
            |error| Action::RemoveNotificationsError { error },
        ))
    }

    pub fn get_notifications_unread_count(&self, is_auto: bool) -> Option<JoinHandle<()>> {
        self.state().username()?;
        let cancel = self.begin_fetch(
            "unread count",
            is_auto,
            |state| &state.notifications.unread_count.status,
            |cancel_source| Action::FetchingNotificationsUnreadCount { cancel_source },
        )?;

        Some(self.fetch(
            "unread count",
            cancel,
            endpoints::notification_counts(),
            |response| response.json::<Counts>(),
            |outcome, counts: Counts| {
                outcome.dispatch(Action::ReceivedNotificationsUnreadCount {
                    unread_count: counts.unread,
                });
            },
            |error| Action::FetchNotificationsUnreadCountError { error },
        ))
    }
}
