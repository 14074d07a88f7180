//! MCP server over stdio: newline-delimited JSON-RPC 2.0.
//!
//! Handles `initialize`, `tools/list`, and `tools/call`. Notifications (no
//! `id`) get no response. Tool failures never surface as JSON-RPC errors;
//! they come back as a result with `isError: true` and a
//! `{ "success": false, "error": ... }` payload.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{remote::Trigger, tools};

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ── Server loop ──

/// Serve requests from `input` until it closes.
pub fn serve(
    input: impl BufRead,
    mut output: impl Write,
    trigger: &dyn Trigger,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Err(e) => Some(JsonRpcResponse::err(None, -32700, format!("parse error: {e}"))),
            // Notifications have no "id" key.
            Ok(raw) if raw.get("id").is_none() => None,
            Ok(raw) => Some(match serde_json::from_value::<JsonRpcRequest>(raw) {
                Ok(request) => handle_request(&request, trigger),
                Err(e) => JsonRpcResponse::err(None, -32600, format!("invalid request: {e}")),
            }),
        };

        if let Some(response) = response {
            serde_json::to_writer(&mut output, &response)?;
            writeln!(output)?;
            output.flush()?;
        }
    }
    Ok(())
}

// ── Request dispatch ──

pub fn handle_request(request: &JsonRpcRequest, trigger: &dyn Trigger) -> JsonRpcResponse {
    let id = request.id.clone();
    match request.method.as_str() {
        "initialize" => JsonRpcResponse::ok(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "sunday-coffee-mcp-server",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),

        "tools/list" => JsonRpcResponse::ok(id, json!({ "tools": tools::list() })),

        "tools/call" => {
            let Some(params) = &request.params else {
                return JsonRpcResponse::err(id, -32602, "missing params");
            };
            let Some(name) = params.get("name").and_then(Value::as_str) else {
                return JsonRpcResponse::err(id, -32602, "missing tool name in params");
            };
            let args = params.get("arguments").cloned().unwrap_or(Value::Null);

            let (payload, is_error) = match tools::call(name, &args, trigger) {
                Ok(value) => (value, false),
                Err(e) => {
                    tracing::warn!(tool = name, error = %e, "tool call failed");
                    (tools::failure(&e), true)
                }
            };
            let text = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("serialization error: {e}"));

            JsonRpcResponse::ok(
                id,
                json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": is_error,
                }),
            )
        }

        other => JsonRpcResponse::err(id, -32601, format!("method not found: {other}")),
    }
}
