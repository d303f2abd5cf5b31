//! Client-side state for EventKit.
//!
//! API responses are normalized into id-keyed entity maps, folded into an
//! immutable [`AppState`] by pure reducers, and published through a
//! [`Store`]. A [`Session`] ties the store to an
//! [`HttpClient`](eventkit_client::HttpClient) and exposes one method per
//! operation; each dispatches its requesting action before returning.
//!
//! Unchanged parts of the state keep their `Arc`, so observers can compare
//! slices with [`Arc::ptr_eq`](std::sync::Arc::ptr_eq) to skip work.

pub mod action;
pub mod creators;
pub mod normalizer;
pub mod reducers;
pub mod state;
pub mod status;
pub mod store;

pub use action::Action;
pub use creators::{Session, CANCEL_REASON};
pub use normalizer::{normalize_run, normalize_runs, normalize_viewed_jobs, Entities, Normalized};
pub use reducers::reduce;
pub use state::{
    AppState, DatacartDetails, EntityMap, ExportsData, ExportsState, GroupsState, IdList,
    NotificationsState, PageMeta, ProvidersState, RerunInfo, RunList, UnreadCount,
    UserActivityState, UserState, UsersState,
};
pub use status::{FetchStatus, MutationStatus};
pub use store::Store;
