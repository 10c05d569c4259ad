//! Error hierarchy for the bridge.

use thiserror::Error;

/// Top-level error for the bridge process.
///
/// Only these conditions end the read loop. Everything that goes wrong with a
/// single message is answered on the wire or logged and skipped instead.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Cannot connect to tool server: {0}")]
    Connectivity(#[source] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error on stdio channel: {0}")]
    Io(#[from] std::io::Error),
}

/// A failed call to the tool server.
///
/// Carries only a message. There is no retry classification: every transport
/// failure is terminal for the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The peer could not be reached (refused, DNS, reset).
    pub fn connection(cause: impl std::fmt::Display) -> Self {
        Self::new(format!("Connection failed: {cause}"))
    }

    pub fn timeout(timeout_ms: u64) -> Self {
        Self::new(format!("Request timed out after {timeout_ms}ms"))
    }

    /// Non-2xx response without a server-supplied error message.
    pub fn status(code: u16, reason: &str) -> Self {
        Self::new(format!("HTTP {code}: {reason}"))
    }

    pub fn invalid_json(cause: impl std::fmt::Display) -> Self {
        Self::new(format!("Invalid JSON response: {cause}"))
    }
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_displays_message_only() {
        let err = TransportError::new("boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn transport_error_constructors() {
        assert_eq!(
            TransportError::timeout(10000).to_string(),
            "Request timed out after 10000ms"
        );
        assert_eq!(
            TransportError::status(503, "Service Unavailable").to_string(),
            "HTTP 503: Service Unavailable"
        );
        assert!(
            TransportError::connection("refused")
                .message
                .starts_with("Connection failed:")
        );
    }

    #[test]
    fn connectivity_error_wraps_transport_message() {
        let err = BridgeError::Connectivity(TransportError::new("Connection failed: refused"));
        assert_eq!(
            err.to_string(),
            "Cannot connect to tool server: Connection failed: refused"
        );
    }

    #[test]
    fn config_error_converts_into_bridge_error() {
        let err: BridgeError = ConfigError::InvalidValue {
            key: "port".into(),
            message: "not a number".into(),
        }
        .into();
        assert!(matches!(err, BridgeError::Config(_)));
        assert!(err.to_string().contains("'port'"));
    }
}
