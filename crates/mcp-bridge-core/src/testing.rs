//! In-memory tool server for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use mcp_bridge_types::TransportError;
use serde_json::Value;

use crate::client::{HttpMethod, ToolServer};

/// Answers each endpoint with a canned result and records every call.
#[derive(Default)]
pub struct FakeToolServer {
    responses: HashMap<String, Result<Value, TransportError>>,
    calls: RefCell<Vec<(HttpMethod, String, Option<Value>)>>,
}

impl FakeToolServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, endpoint: &str, body: Value) -> Self {
        self.responses.insert(endpoint.to_string(), Ok(body));
        self
    }

    pub fn fail(mut self, endpoint: &str, message: &str) -> Self {
        self.responses
            .insert(endpoint.to_string(), Err(TransportError::new(message)));
        self
    }

    pub fn calls(&self) -> Vec<(HttpMethod, String, Option<Value>)> {
        self.calls.borrow().clone()
    }
}

impl ToolServer for FakeToolServer {
    fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        self.calls
            .borrow_mut()
            .push((method, endpoint.to_string(), body.cloned()));
        self.responses
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::connection("no canned response")))
    }
}
