//! MCP tool definitions and dispatch.
//!
//! Tool definitions carry JSON Schema descriptions so that MCP clients can
//! discover the available analyses. Handler failures are reported inside the
//! tool result envelope with `isError: true`, never as protocol errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{GraphLensError, Result};

use super::handlers::{self, ToolContext};
use super::params::SUPPORTED_MODELS;

/// A tool definition exposed by the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

type Handler = fn(&ToolContext, Value) -> Result<Value>;

fn tool(name: &str, title: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

fn flag_prop(description: &str, default: bool) -> Value {
    json!({ "type": "boolean", "default": default, "description": description })
}

fn modify_text_prop() -> Value {
    json!({
        "type": "string",
        "enum": ["none", "detectEntities", "extractEntitiesOnly"],
        "default": "none",
        "description": "Entity detection: none (normal), detectEntities (detect entities and keywords), extractEntitiesOnly (only entities)"
    })
}

fn model_prop() -> Value {
    json!({
        "type": "string",
        "enum": SUPPORTED_MODELS,
        "default": "gpt-4o",
        "description": "AI model used to generate the advice"
    })
}

fn queries_prop(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "minItems": 1, "description": description })
}

fn contexts_prop(description: &str) -> Value {
    json!({
        "type": "array",
        "minItems": 2,
        "description": description,
        "items": {
            "type": "object",
            "properties": {
                "text": string_prop("Text to analyze"),
                "modifyAnalyzedText": modify_text_prop()
            },
            "required": ["text"]
        }
    })
}

fn graph_output_flags(include_statements_default: bool) -> [(&'static str, Value); 3] {
    [
        (
            "includeStatements",
            flag_prop("Include processed statements in response (add only if explicitly needed)", include_statements_default),
        ),
        (
            "includeGraph",
            flag_prop("Include full graph structure in response (add only if explicitly needed)", false),
        ),
        (
            "addNodesAndEdges",
            flag_prop("Include nodes and edges in response (not recommended for longer texts)", false),
        ),
    ]
}

fn with_props(mut base: Value, extra: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
    if let Some(map) = base.as_object_mut() {
        for (key, value) in extra {
            map.insert(key.to_string(), value);
        }
    }
    base
}

fn locale_props() -> [(&'static str, Value); 2] {
    [
        ("importLanguage", json!({ "type": "string", "description": "Language of the search results, e.g. EN" })),
        ("importCountry", json!({ "type": "string", "description": "Country of the search results, e.g. US" })),
    ]
}

/// Returns the list of all tool definitions exposed by this server.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    let text_only = |description: &str| {
        object_schema(json!({ "text": string_prop(description) }), &["text"])
    };

    vec![
        tool(
            "generate_knowledge_graph",
            "Generate a Knowledge Graph from Text",
            "Analyze text and return its topical clusters, main concepts, content gaps, and graph statistics without saving it.",
            object_schema(
                with_props(
                    json!({ "text": string_prop("Text that you'd like to analyze"), "modifyAnalyzedText": modify_text_prop() }),
                    graph_output_flags(false),
                ),
                &["text"],
            ),
        ),
        tool(
            "create_knowledge_graph",
            "Create a Knowledge Graph from Text",
            "Create and save a knowledge graph from text, and return its name and a link to it for future use.",
            object_schema(
                with_props(
                    json!({
                        "graphName": string_prop("Name of the graph to create"),
                        "text": string_prop("Text that you'd like to analyze"),
                        "modifyAnalyzedText": modify_text_prop()
                    }),
                    graph_output_flags(false),
                ),
                &["graphName", "text"],
            ),
        ),
        tool(
            "analyze_existing_graph_by_name",
            "Analyze an Existing Graph",
            "Retrieve and analyze a graph already saved in your account.",
            object_schema(
                with_props(
                    json!({
                        "graphName": string_prop("Name of the existing graph in your account to retrieve"),
                        "includeGraphSummary": flag_prop("Include AI-generated graph summary for RAG prompt augmentation", false),
                        "modifyAnalyzedText": modify_text_prop()
                    }),
                    graph_output_flags(true),
                ),
                &["graphName"],
            ),
        ),
        tool(
            "generate_content_gaps",
            "Generate Content Gaps from Text",
            "Identify the structural gaps between the topics of a text.",
            text_only("Text that you'd like to retrieve content gaps from"),
        ),
        tool(
            "generate_topical_clusters",
            "Generate Topical Clusters from Text",
            "Extract the main topics and topical clusters of a text.",
            text_only("Text that you'd like to retrieve topics and topical clusters from"),
        ),
        tool(
            "generate_text_overview",
            "Generate a Text Overview",
            "Summarize what a text is about using its knowledge graph.",
            text_only("Text that you'd like to get an overview of"),
        ),
        tool(
            "generate_text_insights",
            "Generate Insights from Text",
            "Derive topics, gaps, research prompts, and key structural insights from a text's knowledge graph.",
            object_schema(
                json!({
                    "text": string_prop("Text that you'd like to analyze"),
                    "insightType": {
                        "type": "string",
                        "enum": ["all", "summary", "topics", "gaps", "questions"],
                        "default": "all",
                        "description": "Which insights to return"
                    }
                }),
                &["text"],
            ),
        ),
        tool(
            "generate_research_questions",
            "Generate Research Questions from Text",
            "Generate research questions that bridge the content gaps found in a text.",
            object_schema(
                json!({
                    "text": string_prop("Text that you'd like to generate research questions from"),
                    "useSeveralGaps": flag_prop("Generate questions for several content gaps found in text", false),
                    "gapDepth": { "type": "integer", "minimum": 0, "default": 0, "description": "Depth of content gaps to generate questions for" },
                    "modelToUse": model_prop()
                }),
                &["text"],
            ),
        ),
        tool(
            "generate_research_questions_from_graph",
            "Generate Research Questions from a Graph",
            "Generate research questions that bridge the content gaps of a saved graph.",
            object_schema(
                json!({
                    "graphName": string_prop("Name of the existing graph in your account"),
                    "useSeveralGaps": flag_prop("Generate questions for several content gaps found in the graph", false),
                    "gapDepth": { "type": "integer", "minimum": 0, "default": 0, "description": "Depth of content gaps to generate questions for" },
                    "modelToUse": model_prop()
                }),
                &["graphName"],
            ),
        ),
        tool(
            "generate_responses_from_graph",
            "Generate Responses from a Graph",
            "Answer a prompt using the knowledge of a saved graph.",
            object_schema(
                json!({
                    "graphName": string_prop("Name of the existing graph in your account"),
                    "prompt": string_prop("Prompt to generate responses to from the graph"),
                    "modelToUse": model_prop()
                }),
                &["graphName", "prompt"],
            ),
        ),
        tool(
            "develop_latent_concepts",
            "Develop Latent Concepts from Text",
            "Develop latent ideas from the concepts that connect a text to a broader discourse.",
            object_schema(
                json!({
                    "text": string_prop("Text that you'd like to develop latent concepts for"),
                    "modelToUse": model_prop()
                }),
                &["text"],
            ),
        ),
        tool(
            "generate_overlap_graph",
            "Generate an Overlap Graph from Texts",
            "Extract the relationships that several texts have in common.",
            object_schema(
                with_props(
                    json!({ "contexts": contexts_prop("Texts to analyze and find overlaps for") }),
                    graph_output_flags(false),
                ),
                &["contexts"],
            ),
        ),
        tool(
            "generate_difference_graph",
            "Generate a Difference Graph from Texts",
            "Find what the first text is missing compared to the remaining reference texts.",
            object_schema(
                with_props(
                    json!({ "contexts": contexts_prop("The FIRST text is analyzed for missing parts compared to the REMAINING reference texts") }),
                    graph_output_flags(false),
                ),
                &["contexts"],
            ),
        ),
        tool(
            "generate_google_search_graph",
            "Generate a Search Results Graph",
            "Build a knowledge graph of the search engine results for the given queries.",
            object_schema(
                with_props(
                    json!({
                        "queries": queries_prop("Queries to get search results for"),
                        "includeSearchResultsOnly": flag_prop("Only include the search results, not the knowledge graph", false),
                        "showGraphOnly": flag_prop("Only include the graph structure and keywords, not the search results", true),
                        "showExtendedGraphInfo": flag_prop("Include extended graph information (add only if explicitly needed)", false)
                    }),
                    locale_props(),
                ),
                &["queries"],
            ),
        ),
        tool(
            "generate_search_queries_graph",
            "Generate a Search Queries Graph",
            "Build a knowledge graph of the search queries people use around the given queries.",
            object_schema(
                with_props(
                    json!({
                        "queries": queries_prop("Queries to get related search queries for"),
                        "includeSearchQueriesOnly": flag_prop("Only include the search queries, not the knowledge graph", false),
                        "keywordsSource": {
                            "type": "string",
                            "enum": ["related", "adwords"],
                            "default": "related",
                            "description": "related (search suggestions) or adwords (keyword planner, broader range)"
                        },
                        "showGraphOnly": flag_prop("Only include the graph structure and keywords, not the search queries", true),
                        "showExtendedGraphInfo": flag_prop("Include extended graph information (add only if explicitly needed)", false)
                    }),
                    locale_props(),
                ),
                &["queries"],
            ),
        ),
        tool(
            "generate_seo_graph",
            "Generate an SEO Analysis",
            "Compare content with search results and search queries to find the topics and queries it is missing.",
            object_schema(
                with_props(
                    json!({ "text": string_prop("Content to optimize for search") }),
                    locale_props(),
                ),
                &["text"],
            ),
        ),
        tool(
            "search",
            "Search Existing Graphs",
            "Search for a query across the graphs saved in your account.",
            object_schema(
                json!({
                    "query": string_prop("Query to search for in existing graphs"),
                    "contextNames": {
                        "type": "array",
                        "items": { "type": "string" },
                        "default": [],
                        "description": "Names of the graphs to search in, empty for all"
                    }
                }),
                &["query"],
            ),
        ),
        tool(
            "fetch",
            "Fetch a Search Result",
            "Retrieve the matching text of a search result by its id.",
            object_schema(
                json!({ "id": string_prop("ID of the search result to retrieve (username:graph_name:search_query)") }),
                &["id"],
            ),
        ),
    ]
}

fn lookup_handler(tool_name: &str) -> Option<Handler> {
    let handler: Handler = match tool_name {
        "generate_knowledge_graph" => handlers::generate_knowledge_graph,
        "create_knowledge_graph" => handlers::create_knowledge_graph,
        "analyze_existing_graph_by_name" => handlers::analyze_existing_graph,
        "generate_content_gaps" => handlers::generate_content_gaps,
        "generate_topical_clusters" => handlers::generate_topical_clusters,
        "generate_text_overview" => handlers::generate_text_overview,
        "generate_text_insights" => handlers::generate_text_insights,
        "generate_research_questions" => handlers::generate_research_questions,
        "generate_research_questions_from_graph" => handlers::generate_research_questions_from_graph,
        "generate_responses_from_graph" => handlers::generate_responses_from_graph,
        "develop_latent_concepts" => handlers::develop_latent_concepts,
        "generate_overlap_graph" => handlers::generate_overlap_graph,
        "generate_difference_graph" => handlers::generate_difference_graph,
        "generate_google_search_graph" => handlers::generate_google_search_graph,
        "generate_search_queries_graph" => handlers::generate_search_queries_graph,
        "generate_seo_graph" => handlers::generate_seo_graph,
        "search" => handlers::search,
        "fetch" => handlers::fetch,
        _ => return None,
    };
    Some(handler)
}

/// Wraps a tool output into a successful tool result.
pub fn tool_result(output: &Value) -> Value {
    let text = serde_json::to_string_pretty(output).unwrap_or_default();
    json!({ "content": [{ "type": "text", "text": text }] })
}

/// Wraps an error message into a failed tool result.
pub fn tool_error(message: &str) -> Value {
    let text = json!({ "error": message }).to_string();
    json!({ "content": [{ "type": "text", "text": text }], "isError": true })
}

/// Returns `true` if a tool result reports a failure.
pub fn is_error_result(result: &Value) -> bool {
    result.get("isError").and_then(Value::as_bool).unwrap_or(false)
}

/// Dispatches a tool call to the appropriate handler.
///
/// Only an unknown tool name is an `Err`; every handler failure becomes an
/// error envelope.
pub fn handle_tool_call(ctx: &ToolContext, tool_name: &str, args: Value) -> Result<Value> {
    let handler = lookup_handler(tool_name).ok_or_else(|| GraphLensError::UnknownTool {
        name: tool_name.to_string(),
    })?;

    match handler(ctx, args) {
        Ok(output) => Ok(tool_result(&output)),
        Err(e) => {
            debug!(tool = tool_name, error = %e, "tool call failed");
            Ok(tool_error(&e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_definition_has_a_handler() {
        for tool in get_tool_definitions() {
            assert!(lookup_handler(&tool.name).is_some(), "no handler for '{}'", tool.name);
        }
    }

    #[test]
    fn test_required_fields_are_declared() {
        for tool in get_tool_definitions() {
            let properties = tool.input_schema["properties"].as_object().unwrap();
            for required in tool.input_schema["required"].as_array().unwrap() {
                let key = required.as_str().unwrap();
                assert!(properties.contains_key(key), "{} requires undeclared '{}'", tool.name, key);
            }
        }
    }

    #[test]
    fn test_error_envelope() {
        let envelope = tool_error("Invalid API key");
        assert!(is_error_result(&envelope));
        let text = envelope["content"][0]["text"].as_str().unwrap();
        let body: Value = serde_json::from_str(text).unwrap();
        assert_eq!(body, json!({ "error": "Invalid API key" }));
    }

    #[test]
    fn test_success_envelope() {
        let envelope = tool_result(&json!({ "results": [] }));
        assert!(!is_error_result(&envelope));
        assert_eq!(envelope["content"][0]["type"], "text");
        assert!(envelope.get("isError").is_none());
    }
}
