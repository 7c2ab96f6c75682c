//! HTTP transport implementation.
//!
//! Blocking client built on reqwest. Requests carry JSON bodies; responses
//! are parsed as JSON when possible. A body that is not JSON (for instance a
//! proxy error page) is passed through as a string value so the caller can
//! still see the status code.

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::trace;

use super::errors::{TransportError, TransportResult};
use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::config::ClientConfig;

/// HTTP transport for a remote store.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport from validated client configuration.
    pub fn new(config: &ClientConfig) -> TransportResult<Self> {
        config
            .validate()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("Failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    /// URL prefix every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn map_error(url: &str, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                target: url.to_string(),
            }
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Connection {
                target: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(Self::method(request.method), &url)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| Self::map_error(&url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let bytes = response
            .bytes()
            .map_err(|e| TransportError::InvalidResponse(format!("Failed to read body: {e}")))?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        trace!(method = %request.method, url = %url, status, "http exchange");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
