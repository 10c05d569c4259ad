//! Multi-tier TOML configuration for the bridge.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use mcp_bridge_types::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default tool server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default tool server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Path prefix under which the tool server mounts its endpoints.
pub const DEFAULT_PATH_PREFIX: &str = "/mcp";

/// Per-request timeout for tool server calls.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Tools whose image results are rendered as MCP image blocks.
pub const DEFAULT_SCREENSHOT_TOOLS: &[&str] = &["app_screenshot", "active_window_screenshot"];

/// Resolved, immutable configuration for one bridge process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    pub path_prefix: String,
    pub timeout_ms: u64,
    pub screenshot_tools: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            screenshot_tools: DEFAULT_SCREENSHOT_TOOLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub tools: ToolSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path_prefix: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    pub screenshot_tools: Option<Vec<String>>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
}

impl BridgeConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables (`MCP_BRIDGE_HOST`, `MCP_BRIDGE_PORT`, `MCP_BRIDGE_TIMEOUT_MS`)
    /// 3. Config file (`~/.mcp-bridge/config.toml`)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let settings = load_settings_file(&config_dir().join("config.toml"));
        Self::resolve(overrides, |key| std::env::var(key).ok(), settings)
    }

    /// Apply precedence over already-gathered sources.
    ///
    /// `env` looks up a variable by name; split out from [`BridgeConfig::load`]
    /// so resolution can be exercised without touching the process environment.
    pub fn resolve(
        overrides: CliOverrides,
        env: impl Fn(&str) -> Option<String>,
        settings: SettingsFile,
    ) -> Result<Self, ConfigError> {
        let host = overrides
            .host
            .or_else(|| env("MCP_BRIDGE_HOST"))
            .or(settings.server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match overrides.port {
            Some(port) => port,
            None => match env("MCP_BRIDGE_PORT") {
                Some(raw) => parse_env("MCP_BRIDGE_PORT", &raw)?,
                None => settings.server.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let timeout_ms = match overrides.timeout_ms {
            Some(ms) => ms,
            None => match env("MCP_BRIDGE_TIMEOUT_MS") {
                Some(raw) => parse_env("MCP_BRIDGE_TIMEOUT_MS", &raw)?,
                None => settings.server.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            },
        };
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_ms".into(),
                message: "must be greater than zero".into(),
            });
        }

        let path_prefix = normalize_prefix(
            settings
                .server
                .path_prefix
                .as_deref()
                .unwrap_or(DEFAULT_PATH_PREFIX),
        );

        let screenshot_tools = settings.tools.screenshot_tools.unwrap_or_else(|| {
            DEFAULT_SCREENSHOT_TOOLS
                .iter()
                .map(|s| s.to_string())
                .collect()
        });

        Ok(BridgeConfig {
            host,
            port,
            path_prefix,
            timeout_ms,
            screenshot_tools,
        })
    }

    /// Base URL every endpoint path is appended to, e.g. `http://localhost:8080/mcp`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path_prefix)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}': {e}"),
    })
}

/// Ensure a leading slash and no trailing slash; an empty prefix stays empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Get the bridge config directory path (~/.mcp-bridge/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MCP_BRIDGE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mcp-bridge")
}

/// Load and parse a TOML settings file, returning defaults on any error.
pub fn load_settings_file(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}
