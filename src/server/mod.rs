//! MCP stdio server
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout. Logs go to stderr so
//! stdout stays clean for the protocol. Handles the standard handshake
//! (`initialize`, `notifications/initialized`), `ping`, `tools/list`,
//! and `tools/call`; tool execution failures come back as `isError`
//! results with the error message as content, while malformed requests
//! and arguments become JSON-RPC errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::tools::{call_tool, tool_definitions, ToolContext};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl Response {
    fn ok(id: Value, result: Value) -> Self {
        Response { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    fn err(id: Value, code: i64, message: String) -> Self {
        Response { jsonrpc: "2.0", id, result: None, error: Some(RpcError { code, message }) }
    }
}

/// Run the server until stdin closes.
pub async fn serve(ctx: ToolContext) -> anyhow::Result<()> {
    info!("lingon MCP server listening on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_line(&ctx, &line).await {
            let mut payload = serde_json::to_vec(&response)?;
            payload.push(b'\n');
            stdout.write_all(&payload).await?;
            stdout.flush().await?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

/// Handle one raw line. Notifications produce no response.
async fn handle_line(ctx: &ToolContext, line: &str) -> Option<Response> {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("Unparsable request: {}", e);
            return Some(Response::err(
                Value::Null,
                PARSE_ERROR,
                format!("parse error: {}", e),
            ));
        }
    };

    debug!("<- {}", request.method);
    let is_notification = request.id.is_none();
    let response = handle_request(ctx, request).await;
    if is_notification {
        None
    } else {
        Some(response)
    }
}

async fn handle_request(ctx: &ToolContext, request: Request) -> Response {
    let id = request.id.unwrap_or(Value::Null);

    match request.method.as_str() {
        "initialize" => Response::ok(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "lingon",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "notifications/initialized" | "notifications/cancelled" => {
            // Notifications; handle_line drops the response.
            Response::ok(id, Value::Null)
        }
        "ping" => Response::ok(id, json!({})),
        "tools/list" => Response::ok(id, json!({ "tools": tool_definitions() })),
        "tools/call" => handle_tool_call(ctx, id, request.params).await,
        other => Response::err(id, METHOD_NOT_FOUND, format!("unknown method '{}'", other)),
    }
}

async fn handle_tool_call(ctx: &ToolContext, id: Value, params: Value) -> Response {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return Response::err(id, INVALID_PARAMS, "tools/call requires a tool name".to_string());
    };
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    match call_tool(ctx, name, arguments).await {
        Ok(text) => Response::ok(id, tool_result(text, false)),
        // Shape errors in the request itself are protocol-level errors;
        // everything else is reported as a failed tool result so the
        // assistant sees what went wrong.
        Err(e @ Error::InvalidRequest(_)) | Err(e @ Error::InvalidOutcome(_)) => {
            Response::err(id, INVALID_PARAMS, e.to_string())
        }
        Err(e @ Error::Config(_)) => Response::err(id, INTERNAL_ERROR, e.to_string()),
        Err(e) => {
            warn!("Tool {} failed: {}", name, e);
            Response::ok(id, tool_result(e.to_string(), true))
        }
    }
}

fn tool_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SchedulerConfig};
    use crate::notion::NotionGateway;

    fn test_ctx() -> ToolContext {
        let config = Config {
            notion_token: "secret".into(),
            vocab_db_id: "vocab-db".into(),
            grammar_db_id: "grammar-db".into(),
            scheduler: SchedulerConfig::default(),
        };
        ToolContext {
            gateway: NotionGateway::new(&config).with_base_url("http://127.0.0.1:9"),
            scheduler: config.scheduler,
        }
    }

    #[tokio::test]
    async fn initialize_reports_tool_capability() {
        let response = handle_line(
            &test_ctx(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await
        .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "lingon");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn tools_list_returns_the_catalog() {
        let response = handle_line(
            &test_ctx(),
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        )
        .await
        .unwrap();

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 13);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let response = handle_line(
            &test_ctx(),
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let response = handle_line(
            &test_ctx(),
            r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#,
        )
        .await
        .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let response = handle_line(&test_ctx(), "{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let response = handle_line(
            &test_ctx(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"no_such_tool","arguments":{}}}"#,
        )
        .await
        .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert!(error.message.contains("no_such_tool"));
    }

    #[tokio::test]
    async fn invalid_outcome_arguments_are_invalid_params() {
        let response = handle_line(
            &test_ctx(),
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"update_word_mastery","arguments":{"word_id":"w1","correct_answers":11,"total_answers":10}}}"#,
        )
        .await
        .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert!(error.message.contains("11"));
    }

    #[tokio::test]
    async fn upstream_failure_is_a_tool_error_result() {
        // Gateway points at an unroutable port, so the call fails at
        // the network layer and should surface as isError content.
        let response = handle_line(
            &test_ctx(),
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"search_vocabulary","arguments":{"query":"hej"}}}"#,
        )
        .await
        .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().len() > 0);
    }
}
