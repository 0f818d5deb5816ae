//! Public output views produced by the normalizer.
//!
//! Each view serializes in camelCase. Optional fields are omitted entirely
//! when absent, never emitted as `null` or an empty placeholder.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{GraphologyGraph, Statement, TopCluster};

/// Headline numbers of an analyzed graph. Always present, zero by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    pub modularity: f64,
    pub node_count: usize,
    pub edge_count: usize,
    pub cluster_count: usize,
}

/// Structured view of a full knowledge-graph analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGraphOutput {
    pub statistics: GraphStatistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_gaps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_topical_clusters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_concepts: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conceptual_gateways: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_relations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bigrams: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_graph_by_cluster: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_clusters: Option<Vec<TopCluster>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<GraphologyGraph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<Statement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapsOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_gaps: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverviewOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_overview: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicsOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topical_clusters: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Insights derived from the extended graph summary. Every list is always
/// present, empty when the service sent nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedInsights {
    pub main_topics: Vec<String>,
    pub content_gaps: Vec<String>,
    pub main_concepts: Vec<Value>,
    pub top_keyword_combinations: Vec<String>,
    pub concepts_to_develop: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementStringsOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordsOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNamesOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchQuestionsOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsesOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatentConceptsOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideas: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latent_concepts_to_develop: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latent_concepts_graph: Option<Value>,
}

/// One hit of a graph search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Composite `"<userName>:<graphName>:<query>"` identifier.
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Search hits. `results` is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOutput {
    pub results: Vec<SearchResult>,
}

/// Contents of a single search hit, all fields empty when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchOutput {
    pub id: String,
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Which sections `to_general_insights` should produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    #[default]
    All,
    Summary,
    Topics,
    Gaps,
    Questions,
}

impl InsightType {
    /// Returns `true` if the `section` should be produced for this type.
    pub fn includes(self, section: InsightType) -> bool {
        self == InsightType::All || self == section
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicInsight {
    pub name: String,
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapInsight {
    pub description: String,
    pub concepts: Vec<String>,
    pub bridges: Vec<Value>,
}

/// Insights derived from graph attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphInsights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<TopicInsight>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaps: Option<Vec<GapInsight>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_insights: Option<Vec<String>>,
}

/// Composite result of the SEO analysis chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub in_search_results_not_in_text: ExtendedInsights,
    pub in_search_queries_not_in_text: ExtendedInsights,
    pub in_search_queries_not_in_results: ExtendedInsights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_missing_queries: Option<Vec<String>>,
}
