//! HTTP client library for the EventKit REST API.
//!
//! Wraps `reqwest` with the conventions the EventKit server expects:
//! JSON bodies, a CSRF token on every mutating request, cancellation
//! sources, and pagination metadata carried in response headers.

pub mod cancel;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod page;
pub mod query;
pub mod request;

pub use cancel::CancelSource;
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpClient;
pub use page::PageInfo;
pub use query::{FeaturedQuery, RunQuery};
pub use request::{ApiRequest, ApiResponse, MarkAction};
