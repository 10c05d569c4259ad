//! Turns raw tool server results into MCP-conformant responses.
//!
//! Every function here is a pure mapping from the originating request and the
//! transport result to exactly one [`Response`].

use mcp_bridge_types::TransportError;
use serde_json::{Map, Value, json};

use crate::content::{ContentBlock, ToolCallResult, ToolContent};
use crate::jsonrpc::{INTERNAL_ERROR, METHOD_NOT_FOUND, Response};

/// MCP protocol version announced to the client, whatever the tool server says.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Capabilities copied from the tool server's initialize result.
const FORWARDED_CAPABILITIES: &[&str] = &["tools", "logging"];

/// Shape an `initialize` result.
///
/// The protocol version is pinned and every capability becomes `{}`: MCP
/// clients reject boolean capability values that tool servers like to send.
pub fn shape_initialize(id: Value, result: Result<Value, TransportError>) -> Response {
    let upstream = match result {
        Ok(body) => body,
        Err(e) => return Response::error(id, INTERNAL_ERROR, format!("Initialization failed: {e}")),
    };

    let server_info = match upstream.get("serverInfo") {
        Some(info) if !info.is_null() => info.clone(),
        _ => json!({
            "name": "mcp-http-bridge",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    };

    Response::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": normalize_capabilities(upstream.get("capabilities")),
            "serverInfo": server_info,
        }),
    )
}

/// Keep only forwarded capabilities that are present and truthy, each as `{}`.
pub fn normalize_capabilities(upstream: Option<&Value>) -> Value {
    let mut capabilities = Map::new();
    if let Some(upstream) = upstream {
        for key in FORWARDED_CAPABILITIES {
            if upstream.get(*key).is_some_and(is_truthy) {
                capabilities.insert(key.to_string(), Value::Object(Map::new()));
            }
        }
    }
    Value::Object(capabilities)
}

/// Any object counts as enabled, including `{}`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Shape a `tools/list` result: the upstream body, verbatim.
pub fn shape_tools_list(id: Value, result: Result<Value, TransportError>) -> Response {
    match result {
        Ok(body) => Response::success(id, body),
        Err(e) => Response::error(id, INTERNAL_ERROR, format!("Failed to list tools: {e}")),
    }
}

/// Shape a `tools/call` result.
///
/// `screenshot_tool` says whether the called tool is on the screenshot
/// allowlist. Image content from any other tool is rendered as JSON text.
pub fn shape_tools_call(
    id: Value,
    result: Result<Value, TransportError>,
    screenshot_tool: bool,
) -> Response {
    let body = match result {
        Ok(body) => body,
        Err(e) => return Response::error(id, INTERNAL_ERROR, format!("Tool call failed: {e}")),
    };

    let call = ToolCallResult::from_body(body);
    let blocks = content_blocks(call.content, screenshot_tool);

    let mut result = json!({ "content": blocks });
    if call.is_error {
        result["isError"] = Value::Bool(true);
    }
    Response::success(id, result)
}

fn content_blocks(content: ToolContent, screenshot_tool: bool) -> Vec<ContentBlock> {
    match content {
        ToolContent::Image(image) if screenshot_tool => {
            let summary = image.summary();
            vec![
                ContentBlock::Image {
                    mime_type: image.mime_type(),
                    data: image.data,
                },
                ContentBlock::text(summary),
            ]
        }
        ToolContent::Image(image) => vec![ContentBlock::text(pretty(&image.raw))],
        ToolContent::Structured(value) => vec![ContentBlock::text(pretty(&value))],
        ToolContent::Text(text) => vec![ContentBlock::text(text)],
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Error response for a method the bridge does not route.
pub fn method_not_found(id: Value, method: &str) -> Response {
    Response::error(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_of(resp: &Response) -> &Value {
        resp.result.as_ref().expect("expected a result response")
    }

    #[test]
    fn initialize_pins_protocol_version() {
        let resp = shape_initialize(
            json!(1),
            Ok(json!({
                "protocolVersion": "1999-01-01",
                "serverInfo": {"name": "Swing MCP", "version": "0.9"},
                "capabilities": {"tools": true}
            })),
        );
        let result = result_of(&resp);
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "Swing MCP");
        assert_eq!(result["capabilities"], json!({"tools": {}}));
    }

    #[test]
    fn initialize_capabilities_never_contain_booleans() {
        let shapes = [
            json!({"tools": true, "logging": true}),
            json!({"tools": false, "logging": false}),
            json!({}),
            json!({"tools": {}, "logging": {"level": "info"}}),
            json!({"tools": null, "logging": 1}),
            json!({"tools": 0, "logging": ""}),
            json!(true),
        ];
        for shape in shapes {
            let resp = shape_initialize(json!(1), Ok(json!({"capabilities": shape.clone()})));
            let caps = result_of(&resp)["capabilities"].as_object().unwrap();
            for (key, value) in caps {
                assert_eq!(value, &json!({}), "capability {key} for upstream {shape}");
            }
        }
    }

    #[test]
    fn initialize_keeps_only_truthy_known_capabilities() {
        let caps = normalize_capabilities(Some(&json!({
            "tools": true,
            "logging": false,
            "prompts": true
        })));
        assert_eq!(caps, json!({"tools": {}}));

        let caps = normalize_capabilities(Some(&json!({"tools": {}, "logging": {}})));
        assert_eq!(caps, json!({"tools": {}, "logging": {}}));

        assert_eq!(normalize_capabilities(None), json!({}));
    }

    #[test]
    fn initialize_without_server_info_uses_placeholder() {
        let resp = shape_initialize(json!("a"), Ok(json!({})));
        let info = &result_of(&resp)["serverInfo"];
        assert_eq!(info["name"], "mcp-http-bridge");
        assert!(info["version"].is_string());
        assert_eq!(resp.id, json!("a"));
    }

    #[test]
    fn initialize_transport_error() {
        let resp = shape_initialize(json!(3), Err(TransportError::new("Connection failed: x")));
        let err = resp.error.unwrap();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.message, "Initialization failed: Connection failed: x");
    }

    #[test]
    fn tools_list_passes_body_through() {
        let body = json!({"tools": [{"name": "tab", "description": "Press Tab", "inputSchema": {}}]});
        let resp = shape_tools_list(json!(2), Ok(body.clone()));
        assert_eq!(resp.result, Some(body));
        assert!(resp.error.is_none());
    }

    #[test]
    fn tools_list_transport_error_wraps_cause() {
        let resp = shape_tools_list(json!(2), Err(TransportError::new("HTTP 503: Service Unavailable")));
        let err = resp.error.unwrap();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert!(err.message.contains("HTTP 503"));
    }

    #[test]
    fn screenshot_becomes_image_and_text_blocks() {
        let resp = shape_tools_call(
            json!(4),
            Ok(json!({"content": {"image": "QQ==", "format": "png", "width": 10, "height": 20}})),
            true,
        );
        let content = result_of(&resp)["content"].as_array().unwrap().clone();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["data"], "QQ==");
        assert_eq!(content[0]["mimeType"], "image/png");
        assert_eq!(content[1]["type"], "text");
        assert!(content[1]["text"].as_str().unwrap().contains("10x20"));
    }

    #[test]
    fn image_shape_from_other_tool_is_json_text() {
        let resp = shape_tools_call(
            json!(4),
            Ok(json!({"content": {"image": "QQ==", "width": 1}})),
            false,
        );
        let content = result_of(&resp)["content"].as_array().unwrap().clone();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        let text = content[0]["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed["image"], "QQ==");
    }

    #[test]
    fn screenshot_tool_without_image_falls_through() {
        let resp = shape_tools_call(json!(5), Ok(json!({"content": "window not found"})), true);
        let content = &result_of(&resp)["content"];
        assert_eq!(content, &json!([{"type": "text", "text": "window not found"}]));
    }

    #[test]
    fn structured_content_is_pretty_printed() {
        let resp = shape_tools_call(
            json!(6),
            Ok(json!({"content": {"x": 0, "y": 0, "width": 800, "height": 600}})),
            false,
        );
        let text = result_of(&resp)["content"][0]["text"].as_str().unwrap().to_string();
        assert!(text.contains('\n'));
        assert!(text.contains("\"width\": 800"));
    }

    #[test]
    fn upstream_is_error_is_passed_through() {
        let resp = shape_tools_call(
            json!(7),
            Ok(json!({"content": "Cannot type character", "isError": true})),
            false,
        );
        assert_eq!(result_of(&resp)["isError"], true);

        let resp = shape_tools_call(json!(7), Ok(json!({"content": "ok"})), false);
        assert!(result_of(&resp).get("isError").is_none());
    }

    #[test]
    fn tools_call_transport_error() {
        let resp = shape_tools_call(json!(8), Err(TransportError::timeout(10000)), true);
        let err = resp.error.unwrap();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.message, "Tool call failed: Request timed out after 10000ms");
        assert!(resp.result.is_none());
    }

    #[test]
    fn unknown_method() {
        let resp = method_not_found(json!(1), "foo");
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found: foo"}})
        );
    }
}
