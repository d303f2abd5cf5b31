//! Request lifecycle snapshots kept in state.

use serde_json::Value;

use eventkit_client::CancelSource;

/// Lifecycle of a fetch. Exactly one of `fetching`, `fetched` or `error`
/// describes the last request; `cancel_source` is set only while fetching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchStatus {
    pub fetching: bool,
    pub fetched: bool,
    pub error: Option<Value>,
    pub cancel_source: Option<CancelSource>,
}

impl FetchStatus {
    pub fn requesting(cancel_source: CancelSource) -> Self {
        Self {
            fetching: true,
            fetched: false,
            error: None,
            cancel_source: Some(cancel_source),
        }
    }

    pub fn received() -> Self {
        Self {
            fetching: false,
            fetched: true,
            error: None,
            cancel_source: None,
        }
    }

    pub fn failed(error: Value) -> Self {
        Self {
            fetching: false,
            fetched: false,
            error: Some(error),
            cancel_source: None,
        }
    }

    /// Cancel source of the request still in flight, if any.
    pub fn in_flight(&self) -> Option<&CancelSource> {
        if self.fetching {
            self.cancel_source.as_ref()
        } else {
            None
        }
    }
}

/// Lifecycle of a one-shot mutation (delete, update, rerun...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationStatus {
    pub pending: bool,
    pub done: bool,
    pub error: Option<Value>,
}

impl MutationStatus {
    pub fn pending() -> Self {
        Self {
            pending: true,
            done: false,
            error: None,
        }
    }

    pub fn done() -> Self {
        Self {
            pending: false,
            done: true,
            error: None,
        }
    }

    pub fn failed(error: Value) -> Self {
        Self {
            pending: false,
            done: false,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_status_transitions() {
        let cancel = CancelSource::new();
        let status = FetchStatus::requesting(cancel.clone());
        assert_eq!(status.in_flight(), Some(&cancel));

        let status = FetchStatus::received();
        assert!(status.fetched);
        assert!(status.in_flight().is_none());

        let status = FetchStatus::failed(json!("oh no an error"));
        assert!(!status.fetching && !status.fetched);
        assert_eq!(status.error, Some(json!("oh no an error")));
    }

    #[test]
    fn test_mutation_status() {
        assert!(MutationStatus::pending().pending);
        assert!(MutationStatus::done().done);
        assert!(MutationStatus::failed(json!({})).error.is_some());
        assert_eq!(MutationStatus::default(), MutationStatus {
            pending: false,
            done: false,
            error: None,
        });
    }
}
