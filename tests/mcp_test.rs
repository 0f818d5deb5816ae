mod common;

use std::sync::{Arc, Mutex};

use common::RecordingApi;
use graphlens::config::GraphLensConfig;
use graphlens::errors::{GraphLensError, Result};
use graphlens::mcp::progress::ProgressSink;
use graphlens::mcp::server::PROTOCOL_VERSION;
use graphlens::mcp::tools::*;
use graphlens::mcp::transport::*;
use graphlens::mcp::McpServer;
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct SharedSink {
    seen: Arc<Mutex<Vec<(Value, f64, f64)>>>,
}

impl ProgressSink for SharedSink {
    fn notify(&self, token: &Value, progress: f64, total: f64, _message: Option<&str>) -> Result<()> {
        self.seen.lock().unwrap().push((token.clone(), progress, total));
        Ok(())
    }
}

struct BrokenSink;

impl ProgressSink for BrokenSink {
    fn notify(&self, _: &Value, _: f64, _: f64, _: Option<&str>) -> Result<()> {
        Err(GraphLensError::Io(std::io::Error::other("broken pipe")))
    }
}

fn server(answers: Vec<Value>) -> McpServer {
    McpServer::new(Box::new(RecordingApi::new(answers)), GraphLensConfig::default())
        .with_progress_sink(None)
}

fn request(value: Value) -> JsonRpcRequest {
    serde_json::from_value(value).unwrap()
}

fn call(name: &str, arguments: Value) -> JsonRpcRequest {
    request(json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    }))
}

fn result_text(response: &JsonRpcResponse) -> Value {
    let result = response.result.as_ref().unwrap();
    serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap()
}

#[test]
fn test_parse_jsonrpc_request() {
    let request = request(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/list",
        "params": {}
    }));
    assert_eq!(request.method, "tools/list");
    assert_eq!(request.id, Value::Number(1.into()));
    assert!(!request.is_notification());
}

#[test]
fn test_notification_has_no_id() {
    let request = request(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }));
    assert!(request.is_notification());
}

#[test]
fn test_tool_definitions() {
    let tools = get_tool_definitions();
    assert_eq!(tools.len(), 18);

    let tool_names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    for expected in [
        "generate_knowledge_graph",
        "create_knowledge_graph",
        "analyze_existing_graph_by_name",
        "generate_content_gaps",
        "generate_text_insights",
        "develop_latent_concepts",
        "generate_difference_graph",
        "generate_seo_graph",
        "search",
        "fetch",
    ] {
        assert!(tool_names.contains(&expected), "missing tool '{}'", expected);
    }
}

#[test]
fn test_error_response() {
    let response = JsonRpcResponse::error(
        Value::Number(1.into()),
        ErrorCode::MethodNotFound,
        "Method not found".to_string(),
    );

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("-32601"));
    assert!(!json.contains("\"result\""));
}

#[test]
fn test_success_response_omits_error() {
    let response = JsonRpcResponse::success(Value::Number(42.into()), json!({"result": "ok"}));

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"result\""));
    assert!(!json.contains("\"error\""));
}

#[test]
fn test_initialize() {
    let server = server(vec![]);
    let response = server
        .handle_request(&request(json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} })))
        .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(result["serverInfo"]["name"], "graphlens");
    assert!(result["capabilities"]["tools"].is_object());
}

#[test]
fn test_initialized_notification_gets_no_response() {
    let server = server(vec![]);
    let response = server.handle_request(&request(json!({
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    })));
    assert!(response.is_none());
}

#[test]
fn test_tools_list() {
    let server = server(vec![]);
    let response = server
        .handle_request(&request(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" })))
        .unwrap();
    let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 18);
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[test]
fn test_unknown_method() {
    let server = server(vec![]);
    let response = server
        .handle_request(&request(json!({ "jsonrpc": "2.0", "id": 3, "method": "resources/list" })))
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}

#[test]
fn test_unknown_tool_is_invalid_params() {
    let server = server(vec![]);
    let response = server.handle_request(&call("make_coffee", json!({}))).unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32602);
    assert!(error.message.contains("make_coffee"));
}

#[test]
fn test_tools_call_success() {
    let server = server(vec![json!({
        "extendedGraphSummary": { "contentGaps": ["Link storage to policy"] }
    })]);
    let response = server
        .handle_request(&call("generate_content_gaps", json!({ "text": "Solar and wind." })))
        .unwrap();
    assert_eq!(response.id, Value::Number(7.into()));
    assert!(!is_error_result(response.result.as_ref().unwrap()));
    assert_eq!(result_text(&response), json!({ "contentGaps": ["Link storage to policy"] }));
}

#[test]
fn test_tools_call_upstream_error_is_envelope() {
    let server = server(vec![json!({ "error": "Invalid API key" })]);
    let response = server
        .handle_request(&call("generate_text_overview", json!({ "text": "Solar." })))
        .unwrap();
    assert!(response.error.is_none());
    assert!(is_error_result(response.result.as_ref().unwrap()));
    assert_eq!(result_text(&response), json!({ "error": "Invalid API key" }));
}

#[test]
fn test_tools_call_validation_error_is_envelope() {
    let server = server(vec![]);
    let response = server
        .handle_request(&call("generate_content_gaps", json!({ "text": "   " })))
        .unwrap();
    assert!(is_error_result(response.result.as_ref().unwrap()));
    assert_eq!(result_text(&response), json!({ "error": "Text is required for analysis" }));
}

#[test]
fn test_progress_token_reaches_sink() {
    let sink = SharedSink::default();
    let server = McpServer::new(
        Box::new(RecordingApi::new(vec![json!({ "graphSummary": "nothing" })])),
        GraphLensConfig::default(),
    )
    .with_progress_sink(Some(Box::new(sink.clone())));

    let response = server
        .handle_request(&request(json!({
            "jsonrpc": "2.0",
            "id": 9,
            "method": "tools/call",
            "params": {
                "name": "generate_seo_graph",
                "arguments": { "text": "Solar" },
                "_meta": { "progressToken": "seo-1" }
            }
        })))
        .unwrap();

    // The chain stops after the first call, but the first step was reported.
    assert!(is_error_result(response.result.as_ref().unwrap()));
    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&(json!("seo-1"), 0.0, 6.0)));
}

#[test]
fn test_failing_progress_sink_does_not_affect_result() {
    let server = McpServer::new(
        Box::new(RecordingApi::new(vec![json!({ "graphSummary": "nothing" })])),
        GraphLensConfig::default(),
    )
    .with_progress_sink(Some(Box::new(BrokenSink)));

    let response = server
        .handle_request(&request(json!({
            "jsonrpc": "2.0",
            "id": 10,
            "method": "tools/call",
            "params": {
                "name": "generate_seo_graph",
                "arguments": { "text": "Solar" },
                "_meta": { "progressToken": 3 }
            }
        })))
        .unwrap();

    assert_eq!(
        result_text(&response),
        json!({ "error": "No keywords found in the text for SEO analysis" })
    );
}

#[test]
fn test_ping() {
    let server = server(vec![]);
    let response = server
        .handle_request(&request(json!({ "jsonrpc": "2.0", "id": "p", "method": "ping" })))
        .unwrap();
    assert_eq!(response.result, Some(json!({})));
}
