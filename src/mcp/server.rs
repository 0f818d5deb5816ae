//! MCP server that reads JSON-RPC 2.0 messages from stdin and writes
//! responses to stdout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use crate::api::GraphApi;
use crate::config::GraphLensConfig;
use crate::errors::{GraphLensError, Result};

use super::handlers::ToolContext;
use super::progress::{ProgressReporter, ProgressSink, StdoutProgressSink};
use super::tools::{get_tool_definitions, handle_tool_call, is_error_result};
use super::transport::{ErrorCode, JsonRpcRequest, JsonRpcResponse};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Default step total for tools that report progress without their own.
const DEFAULT_PROGRESS_TOTAL: f64 = 100.0;

/// Counters logged when the server shuts down.
struct ServerStats {
    started_at: Instant,
    total_requests: AtomicU64,
    tool_calls: AtomicU64,
    failed_tool_calls: AtomicU64,
}

impl ServerStats {
    fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_requests: AtomicU64::new(0),
            tool_calls: AtomicU64::new(0),
            failed_tool_calls: AtomicU64::new(0),
        }
    }
}

/// The MCP server, forwarding tool calls to a graph-analysis backend.
pub struct McpServer {
    api: Box<dyn GraphApi>,
    config: GraphLensConfig,
    progress_sink: Option<Box<dyn ProgressSink>>,
    stats: ServerStats,
}

impl McpServer {
    /// Creates a server that sends progress notifications to stdout.
    pub fn new(api: Box<dyn GraphApi>, config: GraphLensConfig) -> Self {
        Self {
            api,
            config,
            progress_sink: Some(Box::new(StdoutProgressSink)),
            stats: ServerStats::new(),
        }
    }

    /// Replaces the progress sink; `None` disables progress notifications.
    pub fn with_progress_sink(mut self, sink: Option<Box<dyn ProgressSink>>) -> Self {
        self.progress_sink = sink;
        self
    }

    /// Runs the server until stdin is closed.
    pub async fn run(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        info!(protocol = PROTOCOL_VERSION, api_url = %self.config.api_url, "mcp server started");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                // Upstream calls block; keep them off the reactor's core threads.
                Ok(request) => tokio::task::block_in_place(|| self.handle_request(&request)),
                Err(e) => Some(JsonRpcResponse::error(
                    Value::Null,
                    ErrorCode::ParseError,
                    format!("failed to parse JSON-RPC request: {}", e),
                )),
            };

            let Some(response) = response else {
                continue;
            };
            let json_line = match serde_json::to_string(&response) {
                Ok(s) => s,
                Err(e) => {
                    error!(error = %e, "failed to serialize response");
                    continue;
                }
            };
            if let Err(e) = write_line(&mut stdout, &json_line).await {
                error!(error = %e, "failed to write response");
                break;
            }
        }

        info!(
            uptime_secs = self.stats.started_at.elapsed().as_secs(),
            requests = self.stats.total_requests.load(Ordering::Relaxed),
            tool_calls = self.stats.tool_calls.load(Ordering::Relaxed),
            failed_tool_calls = self.stats.failed_tool_calls.load(Ordering::Relaxed),
            "mcp server stopped"
        );
        Ok(())
    }

    /// Dispatches a parsed JSON-RPC request.
    ///
    /// Returns `None` for notifications.
    pub fn handle_request(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(id)),
            "initialized" | "notifications/initialized" | "notifications/cancelled" => None,
            "tools/list" => Some(JsonRpcResponse::success(
                id,
                json!({ "tools": get_tool_definitions() }),
            )),
            "tools/call" => Some(self.handle_tools_call(id, request.params.as_ref())),
            "ping" => Some(JsonRpcResponse::success(id, json!({}))),
            _ if request.is_notification() => None,
            _ => Some(JsonRpcResponse::error(
                id,
                ErrorCode::MethodNotFound,
                format!("method not found: {}", request.method),
            )),
        }
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "graphlens",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_call(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(
                id,
                ErrorCode::InvalidParams,
                "missing params for tools/call".to_string(),
            );
        };
        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(
                id,
                ErrorCode::InvalidParams,
                "missing 'name' in tools/call params".to_string(),
            );
        };

        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
        let token = params
            .get("_meta")
            .and_then(|meta| meta.get("progressToken"))
            .cloned();

        self.stats.tool_calls.fetch_add(1, Ordering::Relaxed);
        info!(tool = tool_name, "tool call");

        let ctx = ToolContext {
            api: self.api.as_ref(),
            config: &self.config,
            progress: ProgressReporter::new(self.progress_sink.as_deref(), token, DEFAULT_PROGRESS_TOTAL),
        };

        match handle_tool_call(&ctx, tool_name, arguments) {
            Ok(result) => {
                if is_error_result(&result) {
                    self.stats.failed_tool_calls.fetch_add(1, Ordering::Relaxed);
                }
                JsonRpcResponse::success(id, result)
            }
            Err(e @ GraphLensError::UnknownTool { .. }) => {
                JsonRpcResponse::error(id, ErrorCode::InvalidParams, e.to_string())
            }
            Err(e) => JsonRpcResponse::error(
                id,
                ErrorCode::InternalError,
                format!("tool execution failed: {}", e),
            ),
        }
    }
}

async fn write_line(stdout: &mut tokio::io::Stdout, line: &str) -> std::io::Result<()> {
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
