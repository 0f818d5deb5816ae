#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use graphlens::api::{Endpoint, GraphApi};
use graphlens::config::GraphLensConfig;
use graphlens::errors::{GraphLensError, Result};
use graphlens::mcp::{ProgressReporter, ToolContext};
use serde_json::Value;

/// A `GraphApi` that replays canned answers and records every request.
#[derive(Default)]
pub struct RecordingApi {
    answers: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<(Endpoint, Value)>>,
}

impl RecordingApi {
    pub fn new(answers: Vec<Value>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(Ok).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a transport failure after the canned answers.
    pub fn then_fail(self, message: &str) -> Self {
        self.answers.lock().unwrap().push_back(Err(GraphLensError::Http {
            message: message.to_string(),
            endpoint: "test".to_string(),
        }));
        self
    }

    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl GraphApi for RecordingApi {
    fn request(&self, endpoint: &Endpoint, body: &Value) -> Result<Value> {
        self.calls.lock().unwrap().push((endpoint.clone(), body.clone()));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Object(Default::default())))
    }
}

pub fn context<'a>(api: &'a RecordingApi, config: &'a GraphLensConfig) -> ToolContext<'a> {
    ToolContext {
        api,
        config,
        progress: ProgressReporter::disabled(),
    }
}

/// Decodes the JSON carried in a tool result envelope.
pub fn envelope_body(result: &Value) -> Value {
    let text = result["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}
