//! Action creators: one method per user or background operation.
//!
//! Every method does its synchronous part (cancel check, requesting or
//! optimistic dispatch) before returning, then finishes the request on a
//! spawned task. The returned handle resolves once the final action has
//! been dispatched. Failures never escape: they become error actions.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use eventkit_client::{ApiRequest, ApiResponse, CancelSource, ClientError, HttpClient};

use crate::action::Action;
use crate::state::AppState;
use crate::status::FetchStatus;
use crate::store::Store;

mod activity;
mod exports;
mod groups;
mod notifications;
mod providers;

/// Reason given when a newer request supersedes one in flight.
pub const CANCEL_REASON: &str = "Request is no longer valid, cancelling.";

/// Picks the status that tracks one kind of fetch.
type StatusSlot = fn(&AppState) -> &FetchStatus;

/// Builds the requesting action for a fetch.
type Requesting = fn(CancelSource) -> Action;

/// Builds an error action from the server payload.
type OnError = fn(Value) -> Action;

/// Connects the store to the API.
#[derive(Clone)]
pub struct Session {
    store: Arc<Store>,
    client: Arc<HttpClient>,
}

impl Session {
    pub fn new(store: Arc<Store>, client: Arc<HttpClient>) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<AppState> {
        self.store.state()
    }

    /// Record the logged in user. Runs fetched afterwards are matched
    /// against this name to build the "own" list.
    pub fn log_in(&self, username: impl Into<String>) {
        self.store.dispatch(Action::UserLoggedIn {
            username: username.into(),
        });
    }

    /// End the server session and reset all state.
    pub fn log_out(&self) -> Option<JoinHandle<()>> {
        let store = self.store.clone();
        let client = self.client.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = client
                .execute(eventkit_client::endpoints::logout(), &CancelSource::new())
                .await
            {
                debug!(error = %e, "Logout request failed");
            }
            store.dispatch(Action::UserLoggedOut);
        }))
    }

    /// Apply the in-flight rule for a fetch and dispatch its requesting
    /// action.
    ///
    /// A user request cancels one already in flight. An automatic request
    /// is dropped when one is in flight and `None` is returned.
    fn begin_fetch(
        &self,
        kind: &'static str,
        is_auto: bool,
        slot: StatusSlot,
        requesting: Requesting,
    ) -> Option<CancelSource> {
        let cancel = CancelSource::new();
        let issued = cancel.clone();

        self.store.dispatch_with(move |state| {
            if let Some(previous) = slot(state).in_flight() {
                if is_auto {
                    debug!(kind, "Request already in flight, skipping automatic request");
                    return None;
                }
                debug!(kind, "Cancelling superseded request");
                previous.cancel(CANCEL_REASON);
            }
            Some(requesting(cancel))
        })?;

        Some(issued)
    }

    /// Send `request` on a spawned task, parse the response and hand the
    /// result to `on_success`, unless the request was cancelled.
    fn fetch<T, P, S>(
        &self,
        kind: &'static str,
        cancel: CancelSource,
        request: ApiRequest,
        parse: P,
        on_success: S,
        on_error: OnError,
    ) -> JoinHandle<()>
    where
        T: Send + 'static,
        P: FnOnce(ApiResponse) -> Result<T, ClientError> + Send + 'static,
        S: FnOnce(&Outcome<'_>, T) + Send + 'static,
    {
        let store = self.store.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.execute(request, &cancel).await.and_then(parse);
            let outcome = Outcome {
                kind,
                store: &store,
                cancel: &cancel,
            };
            match result {
                Ok(value) => on_success(&outcome, value),
                Err(e) if e.is_cancel() => debug!(kind, error = %e, "Request cancelled"),
                Err(e) => {
                    outcome.dispatch(on_error(e.payload()));
                }
            }
        })
    }

    /// Send a one-shot mutation and dispatch the action `on_success` builds.
    fn mutate<S>(
        &self,
        kind: &'static str,
        request: ApiRequest,
        on_success: S,
        on_error: OnError,
    ) -> JoinHandle<()>
    where
        S: FnOnce(ApiResponse) -> Action + Send + 'static,
    {
        self.fetch(
            kind,
            CancelSource::new(),
            request,
            Ok,
            move |outcome, response| {
                outcome.dispatch(on_success(response));
            },
            on_error,
        )
    }
}

/// Dispatches the results of one request for as long as it stays current.
///
/// The cancel check runs under the store lock, the same lock `begin_fetch`
/// cancels under, so a superseded request never lands after its successor
/// has started.
pub(crate) struct Outcome<'a> {
    kind: &'static str,
    store: &'a Store,
    cancel: &'a CancelSource,
}

impl Outcome<'_> {
    /// Apply `action` unless the request was cancelled. Returns false when
    /// the action was dropped.
    pub(crate) fn dispatch(&self, action: Action) -> bool {
        let applied = self
            .store
            .dispatch_with(|_| (!self.cancel.is_cancelled()).then_some(action))
            .is_some();
        if !applied {
            debug!(
                kind = self.kind,
                reason = self.cancel.reason().unwrap_or_default(),
                "Request cancelled"
            );
        }
        applied
    }

    /// Name of the logged in user right now.
    pub(crate) fn username(&self) -> Option<String> {
        self.store.state().username().map(str::to_string)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use eventkit_client::ClientConfig;
    use tokio::sync::broadcast;
    use wiremock::MockServer;

    /// Session against a mock server, logged in as `admin`.
    pub(crate) async fn session() -> (Session, MockServer) {
        let server = MockServer::start().await;
        let client = HttpClient::new(&ClientConfig::new(server.uri()).with_csrf_token("token"))
            .unwrap();
        let session = Session::new(Arc::new(Store::new()), Arc::new(client));
        session.log_in("admin");
        (session, server)
    }

    /// Names of every action received so far.
    pub(crate) fn drain(actions: &mut broadcast::Receiver<Action>) -> Vec<&'static str> {
        let mut names = Vec::new();
        while let Ok(action) = actions.try_recv() {
            names.push(action.name());
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{drain, session};
    use super::*;
    use eventkit_core::RunUid;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_log_out_resets_state() {
        let (session, server) = session().await;
        Mock::given(method("GET"))
            .and(path("/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut actions = session.store().actions();
        session.log_out().unwrap().await.unwrap();

        assert_eq!(drain(&mut actions), vec!["USER_LOGGED_OUT"]);
        assert_eq!(*session.state(), AppState::default());
    }

    #[tokio::test]
    async fn test_auto_fetch_is_skipped_while_in_flight() {
        let (session, _server) = session().await;
        let slot: StatusSlot = |state| &state.exports.all.status;
        let requesting: Requesting = |cancel_source| Action::FetchingRuns { cancel_source };

        let first = session.begin_fetch("runs", false, slot, requesting).unwrap();
        assert!(session.begin_fetch("runs", true, slot, requesting).is_none());
        assert!(!first.is_cancelled());

        let second = session.begin_fetch("runs", false, slot, requesting).unwrap();
        assert!(first.is_cancelled());
        assert_eq!(first.reason(), Some(CANCEL_REASON));
        assert_eq!(session.state().exports.all.status.in_flight(), Some(&second));
    }

    #[tokio::test]
    async fn test_superseded_result_is_dropped() {
        let (session, _server) = session().await;
        let slot: StatusSlot = |state| &state.exports.all.status;
        let requesting: Requesting = |cancel_source| Action::FetchingRuns { cancel_source };
        let received = |uid: &str| Action::ReceivedRuns {
            ids: vec![RunUid::new(uid)],
            next_page: false,
            range: "1/1".to_string(),
        };

        let stale = session.begin_fetch("runs", false, slot, requesting).unwrap();
        let current = session.begin_fetch("runs", false, slot, requesting).unwrap();
        let mut actions = session.store().actions();

        let superseded = Outcome {
            kind: "runs",
            store: session.store().as_ref(),
            cancel: &stale,
        };
        assert!(!superseded.dispatch(received("stale")));
        assert!(!superseded.dispatch(Action::FetchRunsError {
            error: serde_json::json!("too late"),
        }));

        let state = session.state();
        assert!(state.exports.all.ids.is_empty());
        assert!(state.exports.all.status.error.is_none());
        assert_eq!(state.exports.all.status.in_flight(), Some(&current));
        assert!(drain(&mut actions).is_empty());

        let latest = Outcome {
            kind: "runs",
            store: session.store().as_ref(),
            cancel: &current,
        };
        assert!(latest.dispatch(received("fresh")));
        let state = session.state();
        assert_eq!(*state.exports.all.ids, vec![RunUid::new("fresh")]);
        assert!(state.exports.all.status.in_flight().is_none());
    }
}
