//! Upstream payload records returned by the graph-analysis service.
//!
//! The service omits whatever it chose not to compute, so every field is
//! optional. Fields this crate never inspects are kept in `extra` maps so
//! that verbatim passthrough does not lose data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of the text, graph, and advice analysis endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGraphResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_graph_summary: Option<ExtendedGraphSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<Statement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_url: Option<String>,
    /// AI-generated advice entries (questions, responses, ideas).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_advice: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RawGraphResponse {
    /// Returns the graphology graph, if the service sent one.
    pub fn graphology(&self) -> Option<&GraphologyGraph> {
        self.graph.as_ref()?.graphology_graph.as_ref()
    }

    /// Returns the graph attributes, if the service sent any.
    pub fn attributes(&self) -> Option<&GraphAttributes> {
        self.graphology()?.attributes.as_ref()
    }
}

/// Precomputed textual summaries of the graph structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedGraphSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_gaps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_topics: Option<Vec<String>>,
    /// Topic names, usually numbered as `"1. Name"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_topic_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_concepts: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conceptual_gateways: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conceptual_gateways_graph: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_relations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bigrams: Option<Vec<String>>,
}

/// Wrapper object around the graphology export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphology_graph: Option<GraphologyGraph>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A graph in graphology's serialization format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphologyGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<GraphAttributes>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Graph-level statistics and structures computed by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphAttributes {
    /// Partition quality in `0.0..=1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modularity: Option<f64>,
    /// Clusters ordered by size, largest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_clusters: Option<Vec<TopCluster>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaps: Option<Vec<Gap>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_nodes: Option<Vec<Value>>,
    /// DOT rendering of the graph, keyed by cluster.
    #[serde(
        rename = "dotGraphByCluster",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dot_graph_by_cluster: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A topical cluster (community) of the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_name: Option<String>,
    /// Community identifier; numeric in practice, but kept as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<ClusterNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_ids: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TopCluster {
    /// Number of statements attributed to this cluster.
    ///
    /// Prefers `statementIds`; an empty or missing list falls back to
    /// `statements`.
    pub fn statement_count(&self) -> usize {
        match self.statement_ids.as_ref().map(Vec::len) {
            Some(n) if n > 0 => n,
            _ => self.statements.as_ref().map_or(0, Vec::len),
        }
    }

    /// Display label of the community identifier.
    pub fn community_label(&self) -> String {
        self.community.as_ref().map(display_value).unwrap_or_default()
    }
}

/// A concept node inside a cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A structural gap between two clusters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Concepts that could bridge the gap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Gap {
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or_default()
    }

    pub fn target_name(&self) -> &str {
        self.target.as_deref().unwrap_or_default()
    }
}

/// A processed statement of the analyzed text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Renders a loosely typed upstream value as display text: strings as-is,
/// `null` as empty, anything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Response of the graph search endpoint.
///
/// `graph_names` and `graph_urls` are parallel: the same index describes the
/// same graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_added: Option<EntriesAdded>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Text entries matched by a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntriesAdded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texts: Option<Vec<String>>,
}
