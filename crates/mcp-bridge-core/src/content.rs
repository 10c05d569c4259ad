//! Tool result content, as returned by the tool server and as sent to the client.
//!
//! The tool server's `content` field is untagged: a string, an arbitrary
//! object, or an object carrying a base64 `image`. [`ToolContent`] recovers
//! which one it is once, at the transport boundary, so the shaping code can
//! match on a variant instead of probing JSON.

use serde::Serialize;
use serde_json::Value;

/// Image format assumed when the tool server does not name one.
pub const DEFAULT_IMAGE_FORMAT: &str = "png";

/// Decoded `content` of a `/tools/call` body.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolContent {
    Text(String),
    Structured(Value),
    Image(ImageContent),
}

/// An image payload as produced by screenshot tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageContent {
    /// Base64-encoded image bytes.
    pub data: String,
    pub format: String,
    pub width: Option<u64>,
    pub height: Option<u64>,
    /// The object the image was read from, kept for tools outside the
    /// screenshot allowlist, which get it rendered as JSON instead.
    pub raw: Value,
}

impl ImageContent {
    pub fn mime_type(&self) -> String {
        format!("image/{}", self.format)
    }

    /// One-line description sent alongside the image block.
    pub fn summary(&self) -> String {
        format!(
            "Screenshot captured: {}x{} pixels, format: {}",
            dimension(self.width),
            dimension(self.height),
            self.format
        )
    }
}

fn dimension(value: Option<u64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

impl ToolContent {
    /// Classify a raw `content` value by shape.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => ToolContent::Text(text),
            Value::Null => ToolContent::Text(String::new()),
            Value::Object(_) => match image_fields(&value) {
                Some((data, format, width, height)) => ToolContent::Image(ImageContent {
                    data,
                    format,
                    width,
                    height,
                    raw: value,
                }),
                None => ToolContent::Structured(value),
            },
            Value::Array(_) => ToolContent::Structured(value),
            scalar => ToolContent::Text(scalar.to_string()),
        }
    }
}

/// `(data, format, width, height)` when `value` has a string `image` key.
fn image_fields(value: &Value) -> Option<(String, String, Option<u64>, Option<u64>)> {
    let data = value.get("image")?.as_str()?.to_string();
    let format = value
        .get("format")
        .and_then(Value::as_str)
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_IMAGE_FORMAT)
        .to_string();
    let width = value.get("width").and_then(Value::as_u64);
    let height = value.get("height").and_then(Value::as_u64);
    Some((data, format, width, height))
}

/// Decoded body of a successful `/tools/call`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub content: ToolContent,
    pub is_error: bool,
}

impl ToolCallResult {
    /// Read `content` and the optional `isError` flag from a response body.
    ///
    /// A body without `content` is treated as empty text.
    pub fn from_body(mut body: Value) -> Self {
        let is_error = body
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let content = body
            .get_mut("content")
            .map(Value::take)
            .unwrap_or(Value::Null);
        Self {
            content: ToolContent::from_value(content),
            is_error,
        }
    }
}

/// A content item in an MCP `tools/call` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}
