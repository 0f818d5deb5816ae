//! SEO gap analysis: a chain of upstream calls reduced to one report.
//!
//! 1. Analyze the source text and derive search queries from its keywords
//!    and topic names.
//! 2. Import the search-results graph and the search-queries graph for those
//!    queries and summarize each.
//! 3. Compare the source text against each summary, and the search queries
//!    against the search results.
//!
//! Upstream errors in the first two stages abort the chain. In the
//! comparison stage an upstream error only empties that comparison.

use std::collections::HashSet;

use serde_json::{json, Value};
use tracing::warn;

use crate::api::request::{
    GOOGLE_SEARCH_INTENT, GOOGLE_SEARCH_RESULTS, GOOGLE_SEARCH_VS_INTENT, GRAPHS_AND_STATEMENTS,
    GRAPH_AND_STATEMENTS,
};
use crate::api::{request_graph, AnalysisOptions, Endpoint};
use crate::errors::{GraphLensError, Result};
use crate::normalize;
use crate::output::SeoReport;
use crate::types::RawGraphResponse;

use super::handlers::{check_upstream, ToolContext};

/// Keywords (bigrams) taken from the source text.
pub const MAX_SEO_KEYWORDS: usize = 3;
/// Topic names taken from the source text.
pub const MAX_SEO_TOPIC_NAMES: usize = 3;

const TOTAL_STEPS: f64 = 6.0;

/// An upstream request ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRequest {
    pub endpoint: Endpoint,
    pub body: Value,
}

pub fn source_analysis_request(text: &str) -> StageRequest {
    StageRequest {
        endpoint: AnalysisOptions::default().endpoint(GRAPH_AND_STATEMENTS),
        body: json!({ "text": text }),
    }
}

/// Derives the search queries from the source analysis: the top keywords,
/// then the top topic names, without duplicates.
pub fn derive_queries(source: &RawGraphResponse) -> Vec<String> {
    let keywords = normalize::to_keywords_from_bigrams(source).keywords.unwrap_or_default();
    let topics = normalize::to_topic_names(source).topic_names.unwrap_or_default();

    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .take(MAX_SEO_KEYWORDS)
        .chain(topics.into_iter().take(MAX_SEO_TOPIC_NAMES))
        .filter(|q| seen.insert(q.clone()))
        .collect()
}

fn search_import_options(include_statements: bool) -> AnalysisOptions {
    AnalysisOptions {
        include_statements,
        include_graph_summary: !include_statements,
        compact: true,
        ..Default::default()
    }
}

pub fn search_results_request(queries: &[String], language: &str, country: &str) -> StageRequest {
    StageRequest {
        endpoint: search_import_options(false).endpoint(GOOGLE_SEARCH_RESULTS),
        body: json!({
            "searchQuery": queries.join(","),
            "aiTopics": "true",
            "importLanguage": language,
            "importCountry": country,
        }),
    }
}

pub fn search_queries_request(queries: &[String], language: &str, country: &str) -> StageRequest {
    StageRequest {
        endpoint: search_import_options(false).endpoint(GOOGLE_SEARCH_INTENT),
        body: json!({
            "searchQuery": queries.join(","),
            "aiTopics": "true",
            "keywordsSource": "related",
            "importLanguage": language,
            "importCountry": country,
        }),
    }
}

/// Compares `text` with `reference`, asking what the reference covers that
/// the text does not.
pub fn difference_request(text: &str, reference: &str) -> StageRequest {
    let options = AnalysisOptions {
        compact: true,
        compare_mode: Some("difference"),
        ..Default::default()
    };
    StageRequest {
        endpoint: options.endpoint(GRAPHS_AND_STATEMENTS),
        body: json!({
            "contexts": [
                { "text": text, "modifyAnalyzedText": "none" },
                { "text": reference, "modifyAnalyzedText": "none" },
            ],
            "aiTopics": "true",
        }),
    }
}

pub fn queries_vs_results_request(queries: &[String], language: &str, country: &str) -> StageRequest {
    StageRequest {
        endpoint: search_import_options(true).endpoint(GOOGLE_SEARCH_VS_INTENT),
        body: json!({
            "searchQuery": queries.join(","),
            "aiTopics": "true",
            "importLanguage": language,
            "importCountry": country,
        }),
    }
}

fn send(ctx: &ToolContext, stage: &StageRequest) -> Result<RawGraphResponse> {
    request_graph(ctx.api, &stage.endpoint, &stage.body)
}

/// Sends a stage whose upstream error aborts the chain.
fn send_required(ctx: &ToolContext, stage: &StageRequest) -> Result<RawGraphResponse> {
    let raw = send(ctx, stage)?;
    check_upstream(&raw.error)?;
    Ok(raw)
}

/// Sends a comparison stage; an upstream error degrades to an empty result.
fn send_comparison(ctx: &ToolContext, stage: &StageRequest, label: &str) -> Result<RawGraphResponse> {
    let raw = send(ctx, stage)?;
    if let Some(error) = &raw.error {
        warn!(comparison = label, error = %error, "comparison failed, continuing without it");
        return Ok(RawGraphResponse::default());
    }
    Ok(raw)
}

/// Runs the full chain for `text`.
pub fn run(ctx: &ToolContext, text: &str, language: &str, country: &str) -> Result<SeoReport> {
    let progress = ctx.progress.with_total(TOTAL_STEPS);

    progress.report(0.0, Some("Extracting keywords from the text"));
    let source = send_required(ctx, &source_analysis_request(text))?;
    let queries = derive_queries(&source);
    if queries.is_empty() {
        return Err(GraphLensError::validation(
            "No keywords found in the text for SEO analysis",
        ));
    }

    progress.report(1.0, Some("Importing search results"));
    let results = send_required(ctx, &search_results_request(&queries, language, country))?;
    let results_summary = normalize::to_summary_output(&results).summary.unwrap_or_default();

    progress.report(2.0, Some("Importing search queries"));
    let intent = send_required(ctx, &search_queries_request(&queries, language, country))?;
    let intent_summary = normalize::to_summary_output(&intent).summary.unwrap_or_default();

    progress.report(3.0, Some("Comparing text with search results"));
    let text_vs_results = send_comparison(ctx, &difference_request(text, &results_summary), "text_vs_results")?;

    progress.report(4.0, Some("Comparing text with search queries"));
    let text_vs_queries = send_comparison(ctx, &difference_request(text, &intent_summary), "text_vs_queries")?;

    progress.report(5.0, Some("Comparing search queries with search results"));
    let queries_vs_results = send_comparison(
        ctx,
        &queries_vs_results_request(&queries, language, country),
        "queries_vs_results",
    )?;

    progress.report(TOTAL_STEPS, Some("SEO analysis complete"));

    Ok(SeoReport {
        in_search_results_not_in_text: normalize::to_insights_from_extended_summary(&text_vs_results),
        in_search_queries_not_in_text: normalize::to_insights_from_extended_summary(&text_vs_queries),
        in_search_queries_not_in_results: normalize::to_insights_from_extended_summary(&queries_vs_results),
        top_missing_queries: normalize::to_statement_strings(&queries_vs_results).statements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: Value) -> RawGraphResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_derive_queries_caps_and_dedupes() {
        let source = raw(json!({
            "extendedGraphSummary": {
                "topBigrams": ["solar power", "wind energy", "grid storage", "heat pumps"],
                "mainTopicNames": ["1. wind energy", "2. Policy", "3. Costs", "4. Jobs"]
            }
        }));
        assert_eq!(
            derive_queries(&source),
            vec!["solar power", "wind energy", "grid storage", "Policy", "Costs"]
        );
    }

    #[test]
    fn test_derive_queries_empty() {
        assert!(derive_queries(&RawGraphResponse::default()).is_empty());
    }

    #[test]
    fn test_difference_request_shape() {
        let stage = difference_request("mine", "theirs");
        assert_eq!(stage.endpoint.get("compareMode"), Some("difference"));
        assert_eq!(stage.body["contexts"][1]["text"], "theirs");
    }

    #[test]
    fn test_queries_vs_results_asks_for_statements() {
        let stage = queries_vs_results_request(&["a".to_string()], "EN", "US");
        assert_eq!(stage.endpoint.get("includeStatements"), Some("true"));
        assert_eq!(stage.endpoint.path, GOOGLE_SEARCH_VS_INTENT);
    }
}
