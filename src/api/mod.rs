//! Client for the remote graph-analysis service.
//!
//! Tool handlers talk to the service only through the [`GraphApi`] trait,
//! which lets tests substitute scripted responses for real HTTP calls.

/// HTTP transport and the `GraphApi` trait.
pub mod client;

/// Endpoint paths and query-parameter builders.
pub mod request;

pub use client::{request_graph, request_search, GraphApi, HttpGraphApi};
pub use request::{AnalysisOptions, Endpoint};
