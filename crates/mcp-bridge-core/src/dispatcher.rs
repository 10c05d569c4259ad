//! Dispatcher — one input line in, at most one response out.
//!
//! Requests are routed to the tool server and shaped; notifications and
//! unreadable lines are logged and produce nothing.

use std::collections::HashSet;

use serde_json::Value;

use crate::client::ToolServer;
use crate::jsonrpc::{Envelope, INVALID_PARAMS, INVALID_REQUEST, Response};
use crate::shaper;

/// Routes JSON-RPC messages from the client to a [`ToolServer`].
pub struct Dispatcher<S> {
    server: S,
    screenshot_tools: HashSet<String>,
}

impl<S: ToolServer> Dispatcher<S> {
    pub fn new(server: S, screenshot_tools: impl IntoIterator<Item = String>) -> Self {
        Self {
            server,
            screenshot_tools: screenshot_tools.into_iter().collect(),
        }
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    /// Handle one line of input.
    ///
    /// Returns `None` for notifications and for lines that are not a JSON
    /// object; every request gets exactly one response carrying its id.
    pub fn handle(&self, line: &str) -> Option<Response> {
        let envelope = match Envelope::parse(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Dropping malformed input line: {e}");
                return None;
            }
        };

        let Some(id) = envelope.id else {
            self.notify(envelope.method.as_deref(), &envelope.params);
            return None;
        };

        let Some(method) = envelope.method else {
            tracing::warn!("Request {id} has no method");
            return Some(Response::error(
                id,
                INVALID_REQUEST,
                "Invalid Request: missing method",
            ));
        };

        tracing::debug!("Request {id}: {method}");
        let response = self.route(id, &method, &envelope.params);
        if let Some(err) = &response.error {
            tracing::warn!("{method} failed ({}): {}", err.code, err.message);
        }
        Some(response)
    }

    fn notify(&self, method: Option<&str>, params: &Value) {
        match method {
            Some("notifications/initialized") => {
                tracing::info!("Client initialized");
            }
            Some(method) => {
                tracing::debug!("Notification {method}: {params}");
            }
            None => {
                tracing::warn!("Dropping notification without method");
            }
        }
    }

    fn route(&self, id: Value, method: &str, params: &Value) -> Response {
        match method {
            "initialize" => shaper::shape_initialize(id, self.server.initialize(params)),
            "tools/list" => shaper::shape_tools_list(id, self.server.list_tools()),
            "tools/call" => self.call_tool(id, params),
            other => shaper::method_not_found(id, other),
        }
    }

    fn call_tool(&self, id: Value, params: &Value) -> Response {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return Response::error(id, INVALID_PARAMS, "Invalid params: missing tool name");
        };
        let arguments = match params.get("arguments") {
            Some(arguments) if !arguments.is_null() => arguments.clone(),
            _ => Value::Object(Default::default()),
        };

        tracing::debug!("Calling tool {name}");
        let result = self.server.call_tool(name, &arguments);
        shaper::shape_tools_call(id, result, self.screenshot_tools.contains(name))
    }
}
