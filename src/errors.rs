use thiserror::Error;

/// Errors that can occur while serving graph-analysis tools.
#[derive(Error, Debug)]
pub enum GraphLensError {
    /// The upstream service answered with an `error` field. The message is
    /// surfaced to the caller verbatim.
    #[error("{message}")]
    Upstream { message: String },

    /// A precondition on tool input or on normalized intermediate data failed.
    #[error("{message}")]
    Validation { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("http error: {message} (endpoint: {endpoint})")]
    Http { message: String, endpoint: String },

    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphLensError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience alias for results using `GraphLensError`.
pub type Result<T> = std::result::Result<T, GraphLensError>;
