//! Bridge loop — connectivity check, then read/dispatch/write until EOF.

use std::io::{BufRead, Write};

use mcp_bridge_types::BridgeError;

use crate::client::{ServerStatus, ToolServer};
use crate::dispatcher::Dispatcher;
use crate::transport::StdioChannel;

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Non-blank lines handed to the dispatcher.
    pub lines: usize,
    pub responses: usize,
}

/// Owns the dispatcher for the lifetime of the process.
pub struct Bridge<S> {
    dispatcher: Dispatcher<S>,
}

impl<S: ToolServer> Bridge<S> {
    pub fn new(dispatcher: Dispatcher<S>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    /// Check that the tool server answers `GET /status`.
    pub fn connect(&self) -> Result<ServerStatus, BridgeError> {
        self.dispatcher
            .server()
            .status()
            .and_then(ServerStatus::from_body)
            .map_err(BridgeError::Connectivity)
    }

    /// Connect, then serve `input` until end of stream.
    ///
    /// Nothing is read from `input` if the connectivity check fails.
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<LoopStats, BridgeError> {
        let status = self.connect()?;
        tracing::info!("Connected to {}", status.describe());
        if status.auth_required == Some(true) {
            tracing::warn!("Tool server reports authRequired; the bridge sends no credentials");
        }
        self.serve(&mut StdioChannel::new(input, output))
    }

    /// Serve lines until end of stream.
    ///
    /// Per-message problems are answered or logged and never end the loop;
    /// only a failing stdio channel does.
    pub fn serve<R: BufRead, W: Write>(
        &self,
        channel: &mut StdioChannel<R, W>,
    ) -> Result<LoopStats, BridgeError> {
        let mut stats = LoopStats::default();

        while let Some(line) = channel.next_line()? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            stats.lines += 1;

            let Some(response) = self.dispatcher.handle(line) else {
                continue;
            };
            let encoded = match serde_json::to_string(&response) {
                Ok(encoded) => encoded,
                Err(e) => {
                    tracing::error!("Failed to serialize response {}: {e}", response.id);
                    continue;
                }
            };
            channel.write_line(&encoded)?;
            stats.responses += 1;
        }

        tracing::info!(
            "Input closed after {} messages ({} responses)",
            stats.lines,
            stats.responses
        );
        Ok(stats)
    }
}
