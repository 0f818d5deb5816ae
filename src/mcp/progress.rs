//! Best-effort progress notifications for long-running tool calls.

use std::io::Write;

use serde_json::{json, Value};
use tracing::warn;

use crate::errors::Result;

use super::transport::JsonRpcNotification;

/// Destination for progress notifications.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, token: &Value, progress: f64, total: f64, message: Option<&str>) -> Result<()>;
}

/// Writes `notifications/progress` messages as JSON lines to stdout.
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn notify(&self, token: &Value, progress: f64, total: f64, message: Option<&str>) -> Result<()> {
        let note = JsonRpcNotification::new("notifications/progress", progress_params(token, progress, total, message));
        let line = serde_json::to_string(&note)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
        Ok(())
    }
}

/// Builds the `params` object of a progress notification.
pub fn progress_params(token: &Value, progress: f64, total: f64, message: Option<&str>) -> Value {
    let mut params = json!({
        "progressToken": token,
        "progress": progress,
        "total": total,
    });
    if let Some(message) = message {
        params["message"] = Value::String(message.to_string());
    }
    params
}

/// Reports progress for one tool call.
///
/// Without a sink or a caller-supplied token every report is a no-op. Sink
/// failures never reach the caller.
pub struct ProgressReporter<'a> {
    sink: Option<&'a dyn ProgressSink>,
    token: Option<Value>,
    total: f64,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: Option<&'a dyn ProgressSink>, token: Option<Value>, total: f64) -> Self {
        Self {
            sink,
            token: token.filter(|t| t.is_string() || t.is_number()),
            total,
        }
    }

    /// A reporter that never sends anything.
    pub fn disabled() -> Self {
        Self::new(None, None, 0.0)
    }

    /// Returns a reporter for the same call with a different step total.
    pub fn with_total(&self, total: f64) -> Self {
        Self {
            sink: self.sink,
            token: self.token.clone(),
            total,
        }
    }

    pub fn is_available(&self) -> bool {
        self.sink.is_some() && self.token.is_some()
    }

    pub fn report(&self, progress: f64, message: Option<&str>) {
        let (Some(sink), Some(token)) = (self.sink, self.token.as_ref()) else {
            return;
        };
        if let Err(e) = sink.notify(token, progress, self.total, message) {
            let text = e.to_string();
            if !text.contains("not supported") {
                warn!(error = %text, "progress notification failed");
            }
        }
    }
}
