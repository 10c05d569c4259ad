//! Shared error hierarchy for the MCP STDIO/HTTP bridge.

pub mod error;

pub use error::{BridgeError, ConfigError, TransportError};
