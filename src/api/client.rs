//! HTTP transport to the graph-analysis service.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use crate::config::GraphLensConfig;
use crate::errors::{GraphLensError, Result};
use crate::types::{RawGraphResponse, RawSearchResponse};

use super::request::Endpoint;

/// Anything that can answer requests to the graph-analysis service.
///
/// Non-2xx answers are not errors at this boundary: they come back as a JSON
/// object carrying an `error` string. `Err` is reserved for transport and
/// decoding failures.
pub trait GraphApi: Send + Sync {
    fn request(&self, endpoint: &Endpoint, body: &Value) -> Result<Value>;
}

/// Sends a request and decodes the answer as a graph response.
pub fn request_graph(api: &dyn GraphApi, endpoint: &Endpoint, body: &Value) -> Result<RawGraphResponse> {
    let value = api.request(endpoint, body)?;
    Ok(serde_json::from_value(value)?)
}

/// Sends a request and decodes the answer as a search response.
pub fn request_search(api: &dyn GraphApi, endpoint: &Endpoint, body: &Value) -> Result<RawSearchResponse> {
    let value = api.request(endpoint, body)?;
    Ok(serde_json::from_value(value)?)
}

/// `GraphApi` over HTTPS using a blocking `ureq` agent.
pub struct HttpGraphApi {
    agent: ureq::Agent,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGraphApi {
    /// Creates a client from the loaded configuration.
    pub fn new(config: &GraphLensConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

impl GraphApi for HttpGraphApi {
    fn request(&self, endpoint: &Endpoint, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        debug!(endpoint = %endpoint.to_path_and_query(), "upstream request");

        let mut request = self.agent.post(&url);
        for (key, value) in &endpoint.query {
            request = request.query(*key, value);
        }
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let http_error = |e: ureq::Error| GraphLensError::Http {
            message: e.to_string(),
            endpoint: endpoint.path.to_string(),
        };

        let mut response = request.send_json(body).map_err(http_error)?;
        let status = response.status();
        let text = response.body_mut().read_to_string().map_err(http_error)?;
        debug!(endpoint = endpoint.path, status = status.as_u16(), bytes = text.len(), "upstream response");

        Ok(decode_body(status.as_u16(), status.is_success(), &text))
    }
}

/// Turns a response body into the JSON value handed to tool handlers.
///
/// Failed statuses always yield an object with an `error` string, taken
/// from the body when the service provided one.
fn decode_body(status: u16, success: bool, text: &str) -> Value {
    let parsed: Option<Value> = serde_json::from_str(text).ok();

    if success {
        return match parsed {
            Some(value) => value,
            None => json!({ "error": format!("invalid JSON in response: {}", snippet(text)) }),
        };
    }

    match parsed {
        Some(value) if value.get("error").is_some_and(Value::is_string) => value,
        _ => json!({ "error": format!("HTTP {}: {}", status, snippet(text)) }),
    }
}

/// First few hundred characters of a body, for error messages.
fn snippet(text: &str) -> &str {
    const MAX: usize = 300;
    if text.len() <= MAX {
        return text;
    }
    let mut end = MAX;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_body() {
        let value = decode_body(200, true, r#"{"graphSummary":"s"}"#);
        assert_eq!(value["graphSummary"], "s");
    }

    #[test]
    fn test_decode_error_body_kept() {
        let value = decode_body(401, false, r#"{"error":"Invalid API key"}"#);
        assert_eq!(value, json!({ "error": "Invalid API key" }));
    }

    #[test]
    fn test_decode_error_status_without_json() {
        let value = decode_body(502, false, "Bad Gateway");
        assert_eq!(value, json!({ "error": "HTTP 502: Bad Gateway" }));
    }

    #[test]
    fn test_decode_invalid_json_on_success() {
        let value = decode_body(200, true, "<html>");
        assert!(value["error"].as_str().unwrap().contains("invalid JSON"));
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let text = "é".repeat(400);
        let cut = snippet(&text);
        assert!(cut.len() <= 300);
        assert!(text.starts_with(cut));
    }
}
