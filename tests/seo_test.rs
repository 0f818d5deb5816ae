mod common;

use common::{context, envelope_body, RecordingApi};
use graphlens::api::request::{
    GOOGLE_SEARCH_INTENT, GOOGLE_SEARCH_RESULTS, GOOGLE_SEARCH_VS_INTENT, GRAPHS_AND_STATEMENTS,
    GRAPH_AND_STATEMENTS,
};
use graphlens::config::GraphLensConfig;
use graphlens::mcp::handle_tool_call;
use graphlens::mcp::tools::is_error_result;
use serde_json::{json, Value};

fn source_analysis() -> Value {
    json!({
        "extendedGraphSummary": {
            "topBigrams": ["solar power", "heat pump"],
            "mainTopicNames": ["1. Solar power", "2. Storage"]
        }
    })
}

fn summary(topic: &str, gap: &str) -> Value {
    json!({ "extendedGraphSummary": { "mainTopics": [topic], "contentGaps": [gap] } })
}

fn comparison(topic: &str) -> Value {
    json!({ "extendedGraphSummary": { "mainTopics": [topic], "conceptualGateways": ["bridge"] } })
}

fn run_seo(api: &RecordingApi) -> Value {
    let config = GraphLensConfig::default();
    let ctx = context(api, &config);
    handle_tool_call(&ctx, "generate_seo_graph", json!({ "text": "Solar power and heat pumps." })).unwrap()
}

#[test]
fn test_no_keywords_stops_after_first_call() {
    let api = RecordingApi::new(vec![json!({ "graphSummary": "nothing useful" })]);
    let result = run_seo(&api);

    assert!(is_error_result(&result));
    assert_eq!(
        envelope_body(&result),
        json!({ "error": "No keywords found in the text for SEO analysis" })
    );
    assert_eq!(api.call_count(), 1);
}

#[test]
fn test_upstream_error_short_circuits() {
    let api = RecordingApi::new(vec![
        source_analysis(),
        json!({ "error": "Search import quota exceeded" }),
    ]);
    let result = run_seo(&api);

    assert!(is_error_result(&result));
    assert_eq!(envelope_body(&result)["error"], "Search import quota exceeded");
    assert_eq!(api.call_count(), 2);
}

#[test]
fn test_source_analysis_error_is_verbatim() {
    let api = RecordingApi::new(vec![json!({ "error": "Invalid API key" })]);
    let result = run_seo(&api);
    assert_eq!(envelope_body(&result), json!({ "error": "Invalid API key" }));
    assert_eq!(api.call_count(), 1);
}

#[test]
fn test_full_chain() {
    let api = RecordingApi::new(vec![
        source_analysis(),
        summary("Results topic", "Results gap"),
        summary("Queries topic", "Queries gap"),
        comparison("Missing from text (results)"),
        comparison("Missing from text (queries)"),
        json!({
            "extendedGraphSummary": { "mainTopics": ["Unanswered queries"] },
            "statements": [{ "content": "best solar panels", "categories": ["Solar"] }]
        }),
    ]);
    let result = run_seo(&api);
    assert!(!is_error_result(&result));

    let calls = api.calls();
    let paths: Vec<&str> = calls.iter().map(|(endpoint, _)| endpoint.path).collect();
    assert_eq!(
        paths,
        vec![
            GRAPH_AND_STATEMENTS,
            GOOGLE_SEARCH_RESULTS,
            GOOGLE_SEARCH_INTENT,
            GRAPHS_AND_STATEMENTS,
            GRAPHS_AND_STATEMENTS,
            GOOGLE_SEARCH_VS_INTENT,
        ]
    );

    // Keywords first, then topic names, deduplicated.
    assert_eq!(calls[1].1["searchQuery"], "solar power,heat pump,Solar power,Storage");
    assert_eq!(calls[1].1["importLanguage"], "EN");
    assert_eq!(calls[1].1["importCountry"], "US");

    assert_eq!(calls[3].1["contexts"][0]["text"], "Solar power and heat pumps.");
    assert_eq!(calls[3].1["contexts"][1]["text"], "Results topic\n\nResults gap");
    assert_eq!(calls[4].1["contexts"][1]["text"], "Queries topic\n\nQueries gap");

    let report = envelope_body(&result);
    assert_eq!(
        report["inSearchResultsNotInText"]["mainTopics"],
        json!(["Missing from text (results)"])
    );
    assert_eq!(report["inSearchQueriesNotInText"]["conceptsToDevelop"], json!(["bridge"]));
    assert_eq!(
        report["inSearchQueriesNotInResults"]["mainTopics"],
        json!(["Unanswered queries"])
    );
    assert_eq!(report["topMissingQueries"], json!(["best solar panels Solar"]));
}

#[test]
fn test_failed_comparison_degrades_to_empty_insights() {
    let api = RecordingApi::new(vec![
        source_analysis(),
        summary("Results topic", "Results gap"),
        summary("Queries topic", "Queries gap"),
        json!({ "error": "Comparison failed" }),
        comparison("Missing from text (queries)"),
        json!({}),
    ]);
    let result = run_seo(&api);
    assert!(!is_error_result(&result));
    assert_eq!(api.call_count(), 6);

    let report = envelope_body(&result);
    assert_eq!(report["inSearchResultsNotInText"]["mainTopics"], json!([]));
    assert_eq!(
        report["inSearchQueriesNotInText"]["mainTopics"],
        json!(["Missing from text (queries)"])
    );
    assert!(report.get("topMissingQueries").is_none());
}

#[test]
fn test_transport_failure_aborts_chain() {
    let api = RecordingApi::new(vec![
        source_analysis(),
        summary("Results topic", "Results gap"),
        summary("Queries topic", "Queries gap"),
    ])
    .then_fail("connection reset");
    let result = run_seo(&api);

    assert!(is_error_result(&result));
    let message = envelope_body(&result)["error"].as_str().unwrap().to_string();
    assert!(message.contains("connection reset"), "unexpected message: {}", message);
    assert_eq!(api.call_count(), 4);
}

#[test]
fn test_locale_arguments_override_config() {
    let api = RecordingApi::new(vec![source_analysis()]).then_fail("stop here");
    let config = GraphLensConfig::default();
    let ctx = context(&api, &config);
    handle_tool_call(
        &ctx,
        "generate_seo_graph",
        json!({ "text": "Solar", "importLanguage": "DE", "importCountry": "AT" }),
    )
    .unwrap();

    let calls = api.calls();
    assert_eq!(calls[1].1["importLanguage"], "DE");
    assert_eq!(calls[1].1["importCountry"], "AT");
}
