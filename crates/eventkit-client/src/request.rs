//! Transport-neutral request and response values.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::page::PageInfo;

/// A request against the EventKit API, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request with no query and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Builder method to add a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Builder method to append several query parameters.
    pub fn params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Builder method to set the JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether the request changes server state and so needs a CSRF token.
    pub fn is_mutating(&self) -> bool {
        ![Method::GET, Method::HEAD, Method::OPTIONS].contains(&self.method)
    }

    /// Look up a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A successful API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body; `Null` when empty, a string when not JSON.
    pub body: Value,
}

impl ApiResponse {
    /// Deserialize the body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Paging state from the response headers.
    pub fn page_info(&self) -> PageInfo {
        PageInfo::from_headers(&self.headers)
    }

    /// Integer value of a count header such as `Total-Users`, 0 when absent
    /// or malformed.
    pub fn count_header(&self, name: &str) -> u64 {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// What a bulk notification mark request does to each notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkAction {
    Read,
    Unread,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mutating_methods() {
        assert!(!ApiRequest::get("/api/runs").is_mutating());
        assert!(ApiRequest::post("/api/runs/filter").is_mutating());
        assert!(ApiRequest::delete("/api/runs/1").is_mutating());
        assert!(ApiRequest::put("/api/groups").is_mutating());
    }

    #[test]
    fn test_count_header() {
        let mut headers = HeaderMap::new();
        headers.insert("total-users", "42".parse().unwrap());
        headers.insert("total-groups", "many".parse().unwrap());
        let response = ApiResponse {
            status: StatusCode::OK,
            headers,
            body: Value::Null,
        };

        assert_eq!(response.count_header("Total-Users"), 42);
        assert_eq!(response.count_header("total-groups"), 0);
        assert_eq!(response.count_header("missing"), 0);
    }

    #[test]
    fn test_builder() {
        let request = ApiRequest::get("/api/notifications/all")
            .param("page_size", 12)
            .json(json!({"a": 1}));
        assert_eq!(request.query_value("page_size"), Some("12"));
        assert_eq!(request.body, Some(json!({"a": 1})));
    }
}
