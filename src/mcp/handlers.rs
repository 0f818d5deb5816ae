//! Tool handlers.
//!
//! Each handler validates its arguments, builds the upstream request, checks
//! the upstream `error` field, and hands the payload to the normalizer.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::api::request::{
    GOOGLE_SEARCH_INTENT, GOOGLE_SEARCH_RESULTS, GRAPHS_AND_STATEMENTS, GRAPH_AND_ADVICE,
    GRAPH_AND_STATEMENTS, SEARCH,
};
use crate::api::{request_graph, request_search, AnalysisOptions, Endpoint, GraphApi};
use crate::config::GraphLensConfig;
use crate::errors::{GraphLensError, Result};
use crate::normalize;
use crate::output::InsightType;
use crate::types::RawGraphResponse;

use super::params::*;
use super::progress::ProgressReporter;

/// Everything a handler needs for one tool call.
pub struct ToolContext<'a> {
    pub api: &'a dyn GraphApi,
    pub config: &'a GraphLensConfig,
    pub progress: ProgressReporter<'a>,
}

/// Fails with the upstream message if the service reported an error.
pub(crate) fn check_upstream(error: &Option<String>) -> Result<()> {
    match error {
        Some(message) => Err(GraphLensError::Upstream {
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

/// Requests a graph analysis and fails on an upstream error.
pub(crate) fn fetch_graph(
    ctx: &ToolContext,
    options: &AnalysisOptions,
    path: &'static str,
    body: &Value,
) -> Result<RawGraphResponse> {
    let raw = request_graph(ctx.api, &options.endpoint(path), body)?;
    check_upstream(&raw.error)?;
    Ok(raw)
}

fn to_json<T: Serialize>(output: &T) -> Result<Value> {
    Ok(serde_json::to_value(output)?)
}

fn text_body(text: &str, modify: ModifyAnalyzedText) -> Value {
    let mut body = Map::new();
    body.insert("text".into(), json!(text));
    body.insert("aiTopics".into(), json!("true"));
    if modify != ModifyAnalyzedText::None {
        body.insert("modifyAnalyzedText".into(), json!(modify.as_str()));
    }
    Value::Object(body)
}

fn model<'a>(ctx: &'a ToolContext, requested: &'a Option<String>) -> &'a str {
    requested.as_deref().unwrap_or(&ctx.config.default_model)
}

fn import_locale<'a>(
    ctx: &'a ToolContext,
    language: &'a Option<String>,
    country: &'a Option<String>,
) -> (&'a str, &'a str) {
    (
        language.as_deref().unwrap_or(&ctx.config.import_language),
        country.as_deref().unwrap_or(&ctx.config.import_country),
    )
}

pub fn generate_knowledge_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: GenerateGraphParams = parse_params(args)?;
    let options = AnalysisOptions {
        include_statements: p.include_statements,
        include_graph: p.include_graph,
        optimize: Some("develop"),
        ..Default::default()
    };
    let raw = fetch_graph(ctx, &options, GRAPH_AND_STATEMENTS, &text_body(&p.text, p.modify_analyzed_text))?;
    to_json(&normalize::to_knowledge_graph_output(&raw, p.include_graph, p.add_nodes_and_edges))
}

pub fn create_knowledge_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: CreateGraphParams = parse_params(args)?;
    let options = AnalysisOptions {
        do_not_save: false,
        include_statements: p.include_statements,
        include_graph: p.include_graph,
        optimize: Some("develop"),
        ..Default::default()
    };
    let mut body = text_body(&p.text, p.modify_analyzed_text);
    body["name"] = json!(p.graph_name);
    let raw = fetch_graph(ctx, &options, GRAPH_AND_STATEMENTS, &body)?;
    to_json(&normalize::to_knowledge_graph_output(&raw, p.include_graph, p.add_nodes_and_edges))
}

pub fn analyze_existing_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: AnalyzeExistingGraphParams = parse_params(args)?;
    let options = AnalysisOptions {
        include_statements: p.include_statements,
        include_graph_summary: p.include_graph_summary,
        include_graph: p.include_graph,
        ..Default::default()
    };
    let mut body = json!({ "name": p.graph_name, "aiTopics": "true" });
    if p.modify_analyzed_text != ModifyAnalyzedText::None {
        body["modifyAnalyzedText"] = json!(p.modify_analyzed_text.as_str());
    }
    let raw = fetch_graph(ctx, &options, GRAPH_AND_STATEMENTS, &body)?;
    to_json(&normalize::to_knowledge_graph_output(&raw, p.include_graph, p.add_nodes_and_edges))
}

pub fn generate_content_gaps(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: TextParams = parse_params(args)?;
    let raw = fetch_graph(
        ctx,
        &AnalysisOptions::default(),
        GRAPH_AND_STATEMENTS,
        &text_body(&p.text, ModifyAnalyzedText::None),
    )?;
    to_json(&normalize::to_gaps_output(&raw))
}

pub fn generate_topical_clusters(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: TextParams = parse_params(args)?;
    let raw = fetch_graph(
        ctx,
        &AnalysisOptions::default(),
        GRAPH_AND_STATEMENTS,
        &text_body(&p.text, ModifyAnalyzedText::None),
    )?;
    to_json(&normalize::to_topics_output(&raw))
}

pub fn generate_text_overview(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: TextParams = parse_params(args)?;
    let options = AnalysisOptions {
        include_graph_summary: true,
        extended_graph_summary: false,
        ..Default::default()
    };
    let raw = fetch_graph(ctx, &options, GRAPH_AND_STATEMENTS, &text_body(&p.text, ModifyAnalyzedText::None))?;
    to_json(&normalize::to_text_overview(&raw))
}

pub fn generate_text_insights(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: TextInsightsParams = parse_params(args)?;
    // Cluster, gap, and node attributes live on the graph; statements feed
    // the dominance ratio.
    let options = AnalysisOptions {
        include_statements: p.insight_type == InsightType::All,
        include_graph_summary: p.insight_type.includes(InsightType::Summary),
        include_graph: true,
        compact: true,
        ..Default::default()
    };
    let raw = fetch_graph(ctx, &options, GRAPH_AND_STATEMENTS, &text_body(&p.text, ModifyAnalyzedText::None))?;
    to_json(&normalize::to_general_insights(&raw, p.insight_type))
}

fn advice_options() -> AnalysisOptions {
    AnalysisOptions {
        optimize: Some("gap"),
        ..Default::default()
    }
}

pub fn generate_research_questions(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: ResearchQuestionsParams = parse_params(args)?;
    let body = json!({
        "text": p.text,
        "aiTopics": "true",
        "requestMode": "question",
        "modelToUse": model(ctx, &p.model_to_use),
        "useSeveralGaps": p.use_several_gaps,
        "gapDepth": p.gap_depth,
    });
    let raw = fetch_graph(ctx, &advice_options(), GRAPH_AND_ADVICE, &body)?;
    to_json(&normalize::to_research_questions(&raw))
}

pub fn generate_research_questions_from_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: GraphQuestionsParams = parse_params(args)?;
    let body = json!({
        "name": p.graph_name,
        "aiTopics": "true",
        "requestMode": "question",
        "modelToUse": model(ctx, &p.model_to_use),
        "useSeveralGaps": p.use_several_gaps,
        "gapDepth": p.gap_depth,
    });
    let raw = fetch_graph(ctx, &advice_options(), GRAPH_AND_ADVICE, &body)?;
    to_json(&normalize::to_research_questions(&raw))
}

pub fn generate_responses_from_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: GraphResponsesParams = parse_params(args)?;
    let body = json!({
        "name": p.graph_name,
        "prompt": p.prompt,
        "aiTopics": "true",
        "requestMode": "response",
        "modelToUse": model(ctx, &p.model_to_use),
    });
    let options = AnalysisOptions {
        optimize: None,
        ..advice_options()
    };
    let raw = fetch_graph(ctx, &options, GRAPH_AND_ADVICE, &body)?;
    to_json(&normalize::to_responses_output(&raw))
}

pub fn develop_latent_concepts(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: LatentConceptsParams = parse_params(args)?;
    let options = AnalysisOptions {
        optimize: Some("latent"),
        ..Default::default()
    };
    let body = json!({
        "text": p.text,
        "aiTopics": "true",
        "requestMode": "question",
        "modelToUse": model(ctx, &p.model_to_use),
    });
    let raw = fetch_graph(ctx, &options, GRAPH_AND_ADVICE, &body)?;
    to_json(&normalize::to_latent_concepts_output(&raw))
}

fn contexts_body(contexts: &[TextContext]) -> Value {
    let contexts: Vec<Value> = contexts
        .iter()
        .map(|c| json!({ "text": c.text, "modifyAnalyzedText": c.modify_analyzed_text.as_str() }))
        .collect();
    json!({ "contexts": contexts, "aiTopics": "true" })
}

fn compare_texts(ctx: &ToolContext, args: Value, compare_mode: Option<&'static str>) -> Result<Value> {
    let p: ContextsParams = parse_params(args)?;
    let options = AnalysisOptions {
        include_statements: p.include_statements,
        include_graph: p.include_graph,
        compact: true,
        optimize: Some("develop"),
        compare_mode,
        ..Default::default()
    };
    let raw = fetch_graph(ctx, &options, GRAPHS_AND_STATEMENTS, &contexts_body(&p.contexts))?;
    to_json(&normalize::to_knowledge_graph_output(&raw, p.include_graph, p.add_nodes_and_edges))
}

pub fn generate_overlap_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    compare_texts(ctx, args, None)
}

pub fn generate_difference_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    compare_texts(ctx, args, Some("difference"))
}

/// Options for the search-engine import endpoints.
///
/// `include_graph` asks the service for the graph; `include_statements`
/// asks for the imported results or queries themselves.
fn import_options(include_graph: bool, include_statements: bool) -> AnalysisOptions {
    AnalysisOptions {
        include_statements,
        include_graph_summary: true,
        include_graph,
        compact: true,
        ..Default::default()
    }
}

fn join_queries(queries: &[String]) -> String {
    queries
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn generate_google_search_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: SearchResultsGraphParams = parse_params(args)?;
    let include_graph = p.show_extended_graph_info && !p.include_search_results_only;
    let (language, country) = import_locale(ctx, &p.import_language, &p.import_country);
    let body = json!({
        "searchQuery": join_queries(&p.queries),
        "doNotAddGraph": if p.include_search_results_only { "true" } else { "false" },
        "aiTopics": "true",
        "importLanguage": language,
        "importCountry": country,
    });
    let options = import_options(include_graph, !p.show_graph_only);
    let raw = fetch_graph(ctx, &options, GOOGLE_SEARCH_RESULTS, &body)?;
    to_json(&normalize::to_knowledge_graph_output(&raw, include_graph, false))
}

pub fn generate_search_queries_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: SearchQueriesGraphParams = parse_params(args)?;
    let include_graph = p.show_extended_graph_info && !p.include_search_queries_only;
    let (language, country) = import_locale(ctx, &p.import_language, &p.import_country);
    let body = json!({
        "searchQuery": join_queries(&p.queries),
        "doNotAddGraph": if p.include_search_queries_only { "true" } else { "false" },
        "aiTopics": "true",
        "keywordsSource": p.keywords_source.as_str(),
        "importLanguage": language,
        "importCountry": country,
    });
    let options = import_options(include_graph, !p.show_graph_only);
    let raw = fetch_graph(ctx, &options, GOOGLE_SEARCH_INTENT, &body)?;
    to_json(&normalize::to_knowledge_graph_output(&raw, include_graph, false))
}

pub fn generate_seo_graph(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: SeoParams = parse_params(args)?;
    let (language, country) = import_locale(ctx, &p.import_language, &p.import_country);
    let report = super::seo::run(ctx, &p.text, language, country)?;
    to_json(&report)
}

pub fn search(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: SearchParams = parse_params(args)?;
    let body = json!({ "query": p.query, "contextNames": p.context_names });
    let raw = request_search(ctx.api, &Endpoint::new(SEARCH), &body)?;
    check_upstream(&raw.error)?;
    to_json(&normalize::to_search_output(&raw, &p.query))
}

pub fn fetch(ctx: &ToolContext, args: Value) -> Result<Value> {
    let p: FetchParams = parse_params(args)?;
    let id = SearchResultId::parse(&p.id)?;
    let body = json!({ "query": id.query, "contextNames": [id.graph_name] });
    let raw = request_search(ctx.api, &Endpoint::new(SEARCH), &body)?;
    check_upstream(&raw.error)?;
    to_json(&normalize::to_fetch_output(&raw, id.query))
}
