//! Typed tool arguments.
//!
//! Arguments arrive as loose JSON. They are deserialized into these structs,
//! which carry the declared defaults, and then checked by [`Validate`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{GraphLensError, Result};
use crate::output::InsightType;

/// Models the service accepts for AI-generated advice.
pub const SUPPORTED_MODELS: &[&str] = &[
    "claude-opus-4.1",
    "claude-sonnet-4",
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-5",
    "gpt-5-mini",
];

/// Post-deserialization checks that serde defaults cannot express.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Deserializes and validates tool arguments.
pub fn parse_params<T: DeserializeOwned + Validate>(args: Value) -> Result<T> {
    let args = if args.is_null() { Value::Object(Default::default()) } else { args };
    let params: T = serde_json::from_value(args)
        .map_err(|e| GraphLensError::validation(format!("invalid arguments: {}", e)))?;
    params.validate()?;
    Ok(params)
}

fn require_non_empty(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GraphLensError::validation(message));
    }
    Ok(())
}

fn require_model(model: &Option<String>) -> Result<()> {
    match model {
        Some(m) if !SUPPORTED_MODELS.contains(&m.as_str()) => Err(GraphLensError::validation(
            format!("unsupported model '{}'; expected one of: {}", m, SUPPORTED_MODELS.join(", ")),
        )),
        _ => Ok(()),
    }
}

fn default_true() -> bool {
    true
}

/// How the service should preprocess the analyzed text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifyAnalyzedText {
    #[default]
    None,
    DetectEntities,
    ExtractEntitiesOnly,
}

impl ModifyAnalyzedText {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::DetectEntities => "detectEntities",
            Self::ExtractEntitiesOnly => "extractEntitiesOnly",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateGraphParams {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub include_statements: bool,
    #[serde(default)]
    pub include_graph: bool,
    #[serde(default)]
    pub add_nodes_and_edges: bool,
    #[serde(default)]
    pub modify_analyzed_text: ModifyAnalyzedText,
}

impl Validate for GenerateGraphParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.text, "Text is required for analysis")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGraphParams {
    #[serde(default)]
    pub graph_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub include_statements: bool,
    #[serde(default)]
    pub include_graph: bool,
    #[serde(default)]
    pub add_nodes_and_edges: bool,
    #[serde(default)]
    pub modify_analyzed_text: ModifyAnalyzedText,
}

impl Validate for CreateGraphParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.graph_name, "Graph name is required")?;
        require_non_empty(&self.text, "Text is required for analysis")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeExistingGraphParams {
    #[serde(default)]
    pub graph_name: String,
    #[serde(default = "default_true")]
    pub include_statements: bool,
    #[serde(default)]
    pub include_graph: bool,
    #[serde(default)]
    pub add_nodes_and_edges: bool,
    #[serde(default)]
    pub include_graph_summary: bool,
    #[serde(default)]
    pub modify_analyzed_text: ModifyAnalyzedText,
}

impl Validate for AnalyzeExistingGraphParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.graph_name, "Graph name is required")
    }
}

/// Arguments of the single-text tools (gaps, topics, overview).
#[derive(Debug, Clone, Deserialize)]
pub struct TextParams {
    #[serde(default)]
    pub text: String,
}

impl Validate for TextParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.text, "Text is required for analysis")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInsightsParams {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub insight_type: InsightType,
}

impl Validate for TextInsightsParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.text, "Text is required for analysis")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchQuestionsParams {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub use_several_gaps: bool,
    #[serde(default)]
    pub gap_depth: u32,
    #[serde(default)]
    pub model_to_use: Option<String>,
}

impl Validate for ResearchQuestionsParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.text, "Text is required for analysis")?;
        require_model(&self.model_to_use)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQuestionsParams {
    #[serde(default)]
    pub graph_name: String,
    #[serde(default)]
    pub use_several_gaps: bool,
    #[serde(default)]
    pub gap_depth: u32,
    #[serde(default)]
    pub model_to_use: Option<String>,
}

impl Validate for GraphQuestionsParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.graph_name, "Graph name is required")?;
        require_model(&self.model_to_use)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphResponsesParams {
    #[serde(default)]
    pub graph_name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model_to_use: Option<String>,
}

impl Validate for GraphResponsesParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.graph_name, "Graph name is required")?;
        require_non_empty(&self.prompt, "Prompt is required")?;
        require_model(&self.model_to_use)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatentConceptsParams {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub model_to_use: Option<String>,
}

impl Validate for LatentConceptsParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.text, "Text is required for analysis")?;
        require_model(&self.model_to_use)
    }
}

/// One text of a multi-text comparison.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContext {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub modify_analyzed_text: ModifyAnalyzedText,
}

/// Arguments of the overlap and difference tools. For difference graphs the
/// first context is the target and the rest are references.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextsParams {
    #[serde(default)]
    pub contexts: Vec<TextContext>,
    #[serde(default)]
    pub include_statements: bool,
    #[serde(default)]
    pub include_graph: bool,
    #[serde(default)]
    pub add_nodes_and_edges: bool,
}

impl Validate for ContextsParams {
    fn validate(&self) -> Result<()> {
        if self.contexts.len() < 2 {
            return Err(GraphLensError::validation("At least two contexts are required"));
        }
        for context in &self.contexts {
            require_non_empty(&context.text, "Text is required for analysis")?;
        }
        Ok(())
    }
}

fn require_queries(queries: &[String]) -> Result<()> {
    if queries.iter().all(|q| q.trim().is_empty()) {
        return Err(GraphLensError::validation("Queries are required for analysis"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultsGraphParams {
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub include_search_results_only: bool,
    #[serde(default = "default_true")]
    pub show_graph_only: bool,
    #[serde(default)]
    pub show_extended_graph_info: bool,
    #[serde(default)]
    pub import_language: Option<String>,
    #[serde(default)]
    pub import_country: Option<String>,
}

impl Validate for SearchResultsGraphParams {
    fn validate(&self) -> Result<()> {
        require_queries(&self.queries)
    }
}

/// Where search-query suggestions come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordsSource {
    /// Search engine suggestions.
    #[default]
    Related,
    /// Advertising keyword planner, a broader range.
    Adwords,
}

impl KeywordsSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Related => "related",
            Self::Adwords => "adwords",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueriesGraphParams {
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub include_search_queries_only: bool,
    #[serde(default)]
    pub keywords_source: KeywordsSource,
    #[serde(default = "default_true")]
    pub show_graph_only: bool,
    #[serde(default)]
    pub show_extended_graph_info: bool,
    #[serde(default)]
    pub import_language: Option<String>,
    #[serde(default)]
    pub import_country: Option<String>,
}

impl Validate for SearchQueriesGraphParams {
    fn validate(&self) -> Result<()> {
        require_queries(&self.queries)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoParams {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub import_language: Option<String>,
    #[serde(default)]
    pub import_country: Option<String>,
}

impl Validate for SeoParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.text, "Text is required for analysis")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub context_names: Vec<String>,
}

impl Validate for SearchParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.query, "Search query is required")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchParams {
    #[serde(default)]
    pub id: String,
}

impl Validate for FetchParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.id, "ID of the Search Result is required")
    }
}

/// Parts of a search result id, `"<userName>:<graphName>:<query>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultId<'a> {
    pub user_name: &'a str,
    pub graph_name: &'a str,
    pub query: &'a str,
}

impl<'a> SearchResultId<'a> {
    /// Splits on the first two colons; the query keeps any further colons.
    pub fn parse(id: &'a str) -> Result<Self> {
        let mut parts = id.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(user_name), Some(graph_name), Some(query)) if !graph_name.is_empty() => Ok(Self {
                user_name,
                graph_name,
                query,
            }),
            _ => Err(GraphLensError::validation(format!(
                "invalid search result id '{}'; expected username:graph_name:search_query",
                id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_apply() {
        let params: AnalyzeExistingGraphParams =
            parse_params(json!({ "graphName": "notes" })).unwrap();
        assert!(params.include_statements);
        assert!(!params.include_graph);
        assert_eq!(params.modify_analyzed_text, ModifyAnalyzedText::None);
    }

    #[test]
    fn test_missing_text_is_rejected() {
        let err = parse_params::<TextParams>(json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Text is required for analysis");
    }

    #[test]
    fn test_bad_enum_is_rejected() {
        let err = parse_params::<GenerateGraphParams>(json!({
            "text": "t",
            "modifyAnalyzedText": "everything"
        }))
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid arguments"));
    }

    #[test]
    fn test_unsupported_model() {
        let err = parse_params::<LatentConceptsParams>(json!({
            "text": "t",
            "modelToUse": "gpt-2"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unsupported model 'gpt-2'"));
    }

    #[test]
    fn test_contexts_need_two() {
        let err = parse_params::<ContextsParams>(json!({ "contexts": [{ "text": "a" }] })).unwrap_err();
        assert_eq!(err.to_string(), "At least two contexts are required");
    }

    #[test]
    fn test_search_result_id_keeps_colons_in_query() {
        let id = SearchResultId::parse("alice:notes:time: 10:30").unwrap();
        assert_eq!(id.user_name, "alice");
        assert_eq!(id.graph_name, "notes");
        assert_eq!(id.query, "time: 10:30");
    }

    #[test]
    fn test_search_result_id_malformed() {
        assert!(SearchResultId::parse("alice").is_err());
        assert!(SearchResultId::parse("alice::q").is_err());
    }

    #[test]
    fn test_null_arguments_use_defaults() {
        let err = parse_params::<SearchParams>(Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "Search query is required");
    }
}
