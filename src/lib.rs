pub mod api;
pub mod config;
pub mod errors;
pub mod mcp;
pub mod normalize;
pub mod output;
pub mod types;
