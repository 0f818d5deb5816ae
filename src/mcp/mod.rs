//! MCP (Model Context Protocol) server for graph analysis.
//!
//! Provides a JSON-RPC 2.0 interface over stdio so that AI assistants can
//! submit texts, search queries, or saved graph names for analysis and get
//! back structured summaries.

/// Tool handlers.
pub mod handlers;

/// Typed and validated tool arguments.
pub mod params;

/// Best-effort progress notifications.
pub mod progress;

/// Multi-step SEO analysis.
pub mod seo;

/// MCP server implementation.
pub mod server;

/// Tool definitions and dispatch.
pub mod tools;

/// JSON-RPC 2.0 transport types.
pub mod transport;

pub use handlers::ToolContext;
pub use progress::{ProgressReporter, ProgressSink};
pub use server::McpServer;
pub use tools::{get_tool_definitions, handle_tool_call, ToolDefinition};
pub use transport::{ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
