//! Single owner of application state.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::action::Action;
use crate::reducers;
use crate::state::AppState;

/// Capacity of the action observer channel.
const ACTION_CHANNEL_CAPACITY: usize = 256;

/// Holds the current state snapshot and applies actions to it.
///
/// Subscribers to [`Store::subscribe`] are woken only when an action
/// produced a new root; observers from [`Store::actions`] see every action.
pub struct Store {
    state: watch::Sender<Arc<AppState>>,
    actions: broadcast::Sender<Action>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    /// Start from an existing state.
    pub fn with_state(state: AppState) -> Self {
        let (state, _) = watch::channel(Arc::new(state));
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);
        Self { state, actions }
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<AppState> {
        self.state.borrow().clone()
    }

    /// Receiver that changes whenever the root state does.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.state.subscribe()
    }

    /// Receiver of every dispatched action.
    pub fn actions(&self) -> broadcast::Receiver<Action> {
        self.actions.subscribe()
    }

    /// Apply an action. Returns true if the state changed.
    pub fn dispatch(&self, action: Action) -> bool {
        self.dispatch_with(|_| Some(action)).is_some_and(|(_, changed)| changed)
    }

    /// Decide on an action from the current state and apply it while still
    /// holding the state lock, so no other dispatch can slip in between.
    ///
    /// Returns the applied action and whether the state changed, or `None`
    /// when `decide` produced no action.
    pub fn dispatch_with<F>(&self, decide: F) -> Option<(Action, bool)>
    where
        F: FnOnce(&AppState) -> Option<Action>,
    {
        let mut applied = None;
        let changed = self.state.send_if_modified(|state| {
            let Some(action) = decide(&**state) else {
                return false;
            };
            let next = reducers::reduce(state, &action);
            let changed = !Arc::ptr_eq(&next, state);
            *state = next;
            applied = Some(action);
            changed
        });

        let action = applied?;
        if let Some(error) = action.error() {
            warn!(action = action.name(), error = %error, "Dispatched error action");
        } else {
            debug!(action = action.name(), changed, "Dispatched action");
        }
        // No observers is fine.
        let _ = self.actions.send(action.clone());
        Some((action, changed))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
