//! Tool server client — the HTTP side of the bridge.
//!
//! [`ToolServer`] is the seam the dispatcher talks to; [`HttpToolServer`] is
//! the production implementation over a blocking `reqwest` client.

use std::fmt;
use std::time::Duration;

use mcp_bridge_config::BridgeConfig;
use mcp_bridge_types::TransportError;
use serde::Deserialize;
use serde_json::{Value, json};

/// HTTP verbs used against the tool server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// Something that answers tool server endpoint calls with JSON.
pub trait ToolServer {
    /// Call `endpoint` (a path relative to the server's base URL) and return
    /// the decoded JSON body unchanged.
    fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError>;

    fn status(&self) -> Result<Value, TransportError> {
        self.request(HttpMethod::Get, "/status", None)
    }

    fn initialize(&self, params: &Value) -> Result<Value, TransportError> {
        self.request(HttpMethod::Post, "/initialize", Some(params))
    }

    fn list_tools(&self) -> Result<Value, TransportError> {
        self.request(HttpMethod::Get, "/tools/list", None)
    }

    fn call_tool(&self, name: &str, arguments: &Value) -> Result<Value, TransportError> {
        let body = json!({
            "name": name,
            "arguments": arguments,
        });
        self.request(HttpMethod::Post, "/tools/call", Some(&body))
    }
}

impl<T: ToolServer + ?Sized> ToolServer for &T {
    fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        (**self).request(method, endpoint, body)
    }
}

/// Decoded `GET /status` body. Every field is optional; the bridge only logs it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub server_version: Option<String>,
    #[serde(default)]
    pub tool_count: Option<u64>,
    #[serde(default)]
    pub auth_required: Option<bool>,
}

impl ServerStatus {
    /// Read a status body, rejecting the tool server's error shape.
    pub fn from_body(body: Value) -> Result<Self, TransportError> {
        if let Some(message) = error_message(&body) {
            return Err(TransportError::new(message));
        }
        Ok(serde_json::from_value(body).unwrap_or_else(|e| {
            tracing::debug!("Unrecognized status body: {e}");
            ServerStatus::default()
        }))
    }

    pub fn describe(&self) -> String {
        format!(
            "{} v{} ({} tools)",
            self.server_name.as_deref().unwrap_or("tool server"),
            self.server_version.as_deref().unwrap_or("?"),
            self.tool_count
                .map_or_else(|| "?".to_string(), |n| n.to_string()),
        )
    }
}

/// Client for a tool server reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpToolServer {
    http: reqwest::blocking::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpToolServer {
    /// Create a client for the server described by `config`.
    pub fn new(config: &BridgeConfig) -> Result<Self, TransportError> {
        Self::with_base_url(config.base_url(), config.timeout_ms)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TransportError::new(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify_send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::timeout(self.timeout_ms)
        } else {
            TransportError::connection(e)
        }
    }
}

impl ToolServer for HttpToolServer {
    fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("{method} {url}");

        let mut request = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(|e| self.classify_send_error(e))?;
        let status = response.status();
        let text = response.text().map_err(|e| self.classify_send_error(e))?;

        if !status.is_success() {
            return Err(classify_error(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status"),
                &text,
            ));
        }

        serde_json::from_str(&text).map_err(TransportError::invalid_json)
    }
}

/// Turn a non-2xx response into a TransportError, preferring the server's own message.
fn classify_error(status: u16, reason: &str, body: &str) -> TransportError {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| error_message(&v))
        .map(TransportError::new)
        .unwrap_or_else(|| TransportError::status(status, reason))
}

/// The `error` field of a tool server body: a string, or an object with a `message`.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(obj) => Some(
            obj.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}
