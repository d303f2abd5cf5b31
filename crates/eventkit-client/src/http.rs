//! HTTP client for REST endpoints.

use std::sync::RwLock;

use reqwest::header::{HeaderMap, ACCEPT, COOKIE, SET_COOKIE};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::cancel::CancelSource;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::request::{ApiRequest, ApiResponse};

const CSRF_HEADER: &str = "X-CSRFToken";
const CSRF_COOKIE: &str = "csrftoken";

/// HTTP client for the EventKit REST API.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    csrf_token: RwLock<Option<String>>,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            inner,
            base_url,
            csrf_token: RwLock::new(config.csrf_token.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current value of the `csrftoken` cookie, if known.
    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_csrf_token(&self, token: impl Into<String>) {
        *self.csrf_token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    /// Send a request, aborting as soon as `cancel` fires.
    ///
    /// Non-2xx responses become [`ClientError::Api`] carrying the parsed body.
    pub async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancelSource,
    ) -> Result<ApiResponse, ClientError> {
        if cancel.is_cancelled() {
            return Err(cancelled(cancel));
        }

        let url = self.url(&request.path)?;
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .inner
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if request.is_mutating() {
            if let Some(token) = self.csrf_token() {
                builder = builder
                    .header(CSRF_HEADER, token.as_str())
                    .header(COOKIE, format!("{CSRF_COOKIE}={token}"));
            }
        }

        let (status, headers, text) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(path = %request.path, "Request cancelled in flight");
                return Err(cancelled(cancel));
            }
            result = send(builder) => result?,
        };

        if let Some(token) = csrf_from_headers(&headers) {
            self.set_csrf_token(token);
        }

        let body = parse_body(&text);
        debug!(path = %request.path, status = status.as_u16(), "Received response");

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))
    }
}

async fn send(
    builder: reqwest::RequestBuilder,
) -> Result<(StatusCode, HeaderMap, String), reqwest::Error> {
    let response = builder.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let text = response.text().await?;
    Ok((status, headers, text))
}

fn cancelled(cancel: &CancelSource) -> ClientError {
    ClientError::Cancelled(cancel.reason().unwrap_or("cancelled").to_string())
}

/// Empty bodies are `Null`; bodies that are not JSON are kept as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn csrf_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            let (name, value) = pair.split_once('=')?;
            (name == CSRF_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}
