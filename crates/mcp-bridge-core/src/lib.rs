//! MCP STDIO to HTTP bridge.
//!
//! Reads newline-delimited JSON-RPC 2.0 messages from an MCP client, forwards
//! requests to an HTTP tool server, and reshapes the answers so they conform
//! to MCP. Notifications are never answered; every request is answered
//! exactly once, with an error response if anything fails on the way.

pub mod bridge;
pub mod client;
pub mod content;
pub mod dispatcher;
pub mod jsonrpc;
pub mod shaper;
#[cfg(test)]
mod testing;
pub mod transport;

pub use bridge::{Bridge, LoopStats};
pub use client::{HttpMethod, HttpToolServer, ServerStatus, ToolServer};
pub use content::{ContentBlock, ImageContent, ToolCallResult, ToolContent};
pub use dispatcher::Dispatcher;
pub use jsonrpc::{Envelope, ErrorObject, MalformedInput, Response};
pub use transport::StdioChannel;
