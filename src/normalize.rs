//! Projection of raw upstream responses into the public output views.
//!
//! Every function here is pure: it reads the raw response by reference,
//! never fails on missing data, and returns a fresh output value. Upstream
//! `error` fields are not interpreted here; callers check them first.

use serde_json::Value;

use crate::output::*;
use crate::types::{display_value, GraphAttributes, RawGraphResponse, RawSearchResponse, Statement};

/// Modularity above which clusters are reported as well separated.
pub const DISTINCT_CLUSTERS_MODULARITY: f64 = 0.4;
/// Modularity below which the text is reported as highly interconnected.
pub const INTERCONNECTED_MODULARITY: f64 = 0.2;
/// Gap count above which the number of gaps is called out.
pub const NOTABLE_GAP_COUNT: usize = 5;
/// Share of all statements above which the top cluster is called dominant.
pub const DOMINANT_CLUSTER_SHARE: f64 = 0.5;

/// Payload caps for insight sections consumed by language models.
pub const MAX_INSIGHT_TOPICS: usize = 7;
pub const MAX_CONCEPTS_PER_TOPIC: usize = 10;
pub const MAX_INSIGHT_GAPS: usize = 7;
pub const MAX_GAP_QUESTIONS: usize = 5;
pub const MAX_NODE_QUESTIONS: usize = 3;

/// Returns a copy of the list if it is present and non-empty.
fn non_empty<T: Clone>(list: &Option<Vec<T>>) -> Option<Vec<T>> {
    list.as_ref().filter(|items| !items.is_empty()).cloned()
}

fn non_empty_str(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn non_empty_value(value: Option<Value>) -> Option<Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    })
}

/// Builds the full structured view of a graph analysis.
///
/// `statistics` is always populated. The cluster DOT renderings and
/// `top_clusters` are lifted out of the graph attributes into top-level
/// fields, so they never appear twice. The graph itself is included only
/// with `include_graph`; its bulk `nodes` and `edges` arrays additionally
/// require `include_nodes_and_edges`.
pub fn to_knowledge_graph_output(
    raw: &RawGraphResponse,
    include_graph: bool,
    include_nodes_and_edges: bool,
) -> KnowledgeGraphOutput {
    let mut output = KnowledgeGraphOutput {
        graph_summary: non_empty_str(&raw.graph_summary),
        ..Default::default()
    };

    if let Some(ext) = &raw.extended_graph_summary {
        output.content_gaps = non_empty(&ext.content_gaps);
        output.main_topical_clusters = non_empty(&ext.main_topics);
        output.main_concepts = non_empty(&ext.main_concepts);
        output.conceptual_gateways = non_empty(&ext.conceptual_gateways);
        output.top_relations = non_empty(&ext.top_relations);
        output.top_bigrams = non_empty(&ext.top_bigrams);
    }

    if let Some(graph) = raw.graphology() {
        let mut graph = graph.clone();

        output.statistics = GraphStatistics {
            modularity: graph
                .attributes
                .as_ref()
                .and_then(|a| a.modularity)
                .unwrap_or(0.0),
            node_count: graph.nodes.as_ref().map_or(0, Vec::len),
            edge_count: graph.edges.as_ref().map_or(0, Vec::len),
            cluster_count: graph
                .attributes
                .as_ref()
                .and_then(|a| a.top_clusters.as_ref())
                .map_or(0, Vec::len),
        };

        if let Some(attrs) = graph.attributes.as_mut() {
            output.knowledge_graph_by_cluster = non_empty_value(attrs.dot_graph_by_cluster.take());
            output.top_clusters = attrs.top_clusters.take().filter(|c| !c.is_empty());
        }

        if include_graph {
            if !include_nodes_and_edges {
                graph.nodes = None;
                graph.edges = None;
            }
            output.knowledge_graph = Some(graph);
        }
    }

    output.statements = non_empty(&raw.statements);
    output.user_name = non_empty_str(&raw.user_name);
    output.graph_name = non_empty_str(&raw.graph_name);
    output.graph_url = non_empty_str(&raw.graph_url);

    output
}

pub fn to_gaps_output(raw: &RawGraphResponse) -> GapsOutput {
    GapsOutput {
        content_gaps: raw
            .extended_graph_summary
            .as_ref()
            .and_then(|ext| non_empty(&ext.content_gaps)),
    }
}

pub fn to_text_overview(raw: &RawGraphResponse) -> TextOverviewOutput {
    TextOverviewOutput {
        text_overview: non_empty_str(&raw.graph_summary),
    }
}

pub fn to_topics_output(raw: &RawGraphResponse) -> TopicsOutput {
    TopicsOutput {
        topical_clusters: raw
            .extended_graph_summary
            .as_ref()
            .and_then(|ext| non_empty(&ext.main_topics)),
    }
}

/// Joins topics and gaps into one plain-text summary.
///
/// Produces nothing unless both topics and gaps are present; a half summary
/// is never emitted.
pub fn to_summary_output(raw: &RawGraphResponse) -> SummaryOutput {
    let summary = raw.extended_graph_summary.as_ref().and_then(|ext| {
        let topics = non_empty(&ext.main_topics)?;
        let gaps = non_empty(&ext.content_gaps)?;
        Some(format!("{}\n\n{}", topics.join("\n"), gaps.join("\n")))
    });
    SummaryOutput { summary }
}

/// Extracts the five insight lists of the extended summary, each defaulting
/// to an empty list.
pub fn to_insights_from_extended_summary(raw: &RawGraphResponse) -> ExtendedInsights {
    let Some(ext) = &raw.extended_graph_summary else {
        return ExtendedInsights::default();
    };
    ExtendedInsights {
        main_topics: ext.main_topics.clone().unwrap_or_default(),
        content_gaps: ext.content_gaps.clone().unwrap_or_default(),
        main_concepts: ext.main_concepts.clone().unwrap_or_default(),
        top_keyword_combinations: ext.top_bigrams.clone().unwrap_or_default(),
        concepts_to_develop: ext.conceptual_gateways.clone().unwrap_or_default(),
    }
}

fn statement_string(statement: &Statement) -> String {
    let categories: Vec<String> = statement
        .categories
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(display_value)
        .collect();
    format!(
        "{} {}",
        statement.content.as_deref().unwrap_or_default(),
        categories.join(", ")
    )
}

/// Formats each statement as `"<content> <category, category, ...>"`.
pub fn to_statement_strings(raw: &RawGraphResponse) -> StatementStringsOutput {
    StatementStringsOutput {
        statements: raw
            .statements
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| s.iter().map(statement_string).collect()),
    }
}

pub fn to_keywords_from_bigrams(raw: &RawGraphResponse) -> KeywordsOutput {
    KeywordsOutput {
        keywords: raw
            .extended_graph_summary
            .as_ref()
            .and_then(|ext| non_empty(&ext.top_bigrams)),
    }
}

/// Strips a leading `"<n>. "` from a numbered topic name.
fn strip_topic_number(topic: &str) -> &str {
    match topic.split_once(". ") {
        Some((_, name)) => name,
        None => topic,
    }
}

pub fn to_topic_names(raw: &RawGraphResponse) -> TopicNamesOutput {
    TopicNamesOutput {
        topic_names: raw
            .extended_graph_summary
            .as_ref()
            .and_then(|ext| ext.main_topic_names.as_ref())
            .filter(|names| !names.is_empty())
            .map(|names| {
                names
                    .iter()
                    .map(|name| strip_topic_number(name).to_string())
                    .collect()
            }),
    }
}

pub fn to_research_questions(raw: &RawGraphResponse) -> ResearchQuestionsOutput {
    ResearchQuestionsOutput {
        questions: non_empty(&raw.ai_advice),
    }
}

pub fn to_responses_output(raw: &RawGraphResponse) -> ResponsesOutput {
    ResponsesOutput {
        responses: non_empty(&raw.ai_advice),
    }
}

pub fn to_latent_concepts_output(raw: &RawGraphResponse) -> LatentConceptsOutput {
    let ext = raw.extended_graph_summary.as_ref();
    LatentConceptsOutput {
        ideas: non_empty(&raw.ai_advice),
        latent_concepts_to_develop: ext.and_then(|e| non_empty(&e.conceptual_gateways)),
        latent_concepts_graph: non_empty_value(ext.and_then(|e| e.conceptual_gateways_graph.clone())),
    }
}

fn search_id(user_name: &str, graph_name: &str, query: &str) -> String {
    format!("{}:{}:{}", user_name, graph_name, query)
}

/// Returns the parallel `(name, url)` pairs of a search response, or `None`
/// unless both lists are non-empty.
fn search_pairs(raw: &RawSearchResponse) -> Option<impl Iterator<Item = (&String, &String)>> {
    let names = raw.graph_names.as_ref().filter(|n| !n.is_empty())?;
    let urls = raw.graph_urls.as_ref().filter(|u| !u.is_empty())?;
    Some(names.iter().zip(urls.iter()))
}

/// Lists one result per matched graph.
pub fn to_search_output(raw: &RawSearchResponse, query: &str) -> SearchOutput {
    let user_name = raw.user_name.as_deref().unwrap_or_default();
    let results = search_pairs(raw)
        .map(|pairs| {
            pairs
                .map(|(name, url)| SearchResult {
                    id: search_id(user_name, name, query),
                    title: name.clone(),
                    url: url.clone(),
                })
                .collect()
        })
        .unwrap_or_default();
    SearchOutput { results }
}

/// Returns the first matched graph together with the matched text.
pub fn to_fetch_output(raw: &RawSearchResponse, query: &str) -> FetchOutput {
    let user_name = raw.user_name.as_deref().unwrap_or_default();
    let Some((name, url)) = search_pairs(raw).and_then(|mut pairs| pairs.next()) else {
        return FetchOutput::default();
    };
    let text = raw
        .entries_added
        .as_ref()
        .and_then(|entries| entries.texts.as_ref())
        .map(|texts| texts.join("\n"))
        .unwrap_or_default();
    FetchOutput {
        id: search_id(user_name, name, query),
        title: name.clone(),
        text,
        url: url.clone(),
    }
}

fn topic_insights(attrs: &GraphAttributes) -> Option<Vec<TopicInsight>> {
    let clusters = attrs.top_clusters.as_ref().filter(|c| !c.is_empty())?;
    Some(
        clusters
            .iter()
            .take(MAX_INSIGHT_TOPICS)
            .map(|cluster| TopicInsight {
                name: cluster
                    .ai_name
                    .clone()
                    .unwrap_or_else(|| format!("Topic {}", cluster.community_label())),
                concepts: cluster
                    .nodes
                    .iter()
                    .flatten()
                    .filter_map(|n| n.node_name.clone())
                    .take(MAX_CONCEPTS_PER_TOPIC)
                    .collect(),
            })
            .collect(),
    )
}

fn gap_insights(attrs: &GraphAttributes) -> Option<Vec<GapInsight>> {
    let gaps = attrs.gaps.as_ref().filter(|g| !g.is_empty())?;
    Some(
        gaps.iter()
            .take(MAX_INSIGHT_GAPS)
            .map(|gap| GapInsight {
                description: format!(
                    "Potential connection between \"{}\" and \"{}\"",
                    gap.source_name(),
                    gap.target_name()
                ),
                concepts: vec![gap.source_name().to_string(), gap.target_name().to_string()],
                bridges: gap.concepts.clone().unwrap_or_default(),
            })
            .collect(),
    )
}

fn research_prompts(attrs: Option<&GraphAttributes>) -> Vec<String> {
    let mut questions = Vec::new();
    let Some(attrs) = attrs else {
        return questions;
    };
    if let Some(gaps) = &attrs.gaps {
        questions.extend(gaps.iter().take(MAX_GAP_QUESTIONS).map(|gap| {
            format!(
                "How might \"{}\" relate to or influence \"{}\"?",
                gap.source_name(),
                gap.target_name()
            )
        }));
    }
    if let Some(nodes) = &attrs.top_nodes {
        questions.extend(nodes.iter().take(MAX_NODE_QUESTIONS).map(|node| {
            format!(
                "What role does \"{}\" play in connecting different aspects of this topic?",
                display_value(node)
            )
        }));
    }
    questions
}

fn key_insights(attrs: &GraphAttributes, total_statements: usize) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(modularity) = attrs.modularity {
        if modularity > DISTINCT_CLUSTERS_MODULARITY {
            insights.push("The text has well-defined, distinct topic clusters".to_string());
        } else if modularity < INTERCONNECTED_MODULARITY {
            insights.push("The text is highly interconnected with overlapping themes".to_string());
        }
    }

    if let Some(gaps) = attrs.gaps.as_ref().filter(|g| g.len() > NOTABLE_GAP_COUNT) {
        insights.push(format!(
            "Found {} potential connections between disparate topics",
            gaps.len()
        ));
    }

    if let Some(dominant) = attrs.top_clusters.as_ref().and_then(|c| c.first()) {
        let share = dominant.statement_count() as f64 / total_statements.max(1) as f64;
        if share > DOMINANT_CLUSTER_SHARE {
            insights.push(format!(
                "The text is strongly focused on \"{}\"",
                dominant.ai_name.as_deref().unwrap_or("one main topic")
            ));
        }
    }

    insights
}

/// Derives readable insights from the graph attributes.
///
/// `insight_type` selects a single section, or every section plus the
/// `key_insights` narrative with [`InsightType::All`].
pub fn to_general_insights(raw: &RawGraphResponse, insight_type: InsightType) -> GraphInsights {
    let attrs = raw.attributes();
    let mut insights = GraphInsights::default();

    if insight_type.includes(InsightType::Summary) {
        insights.summary = non_empty_str(&raw.graph_summary);
    }
    if insight_type.includes(InsightType::Topics) {
        insights.topics = attrs.and_then(topic_insights);
    }
    if insight_type.includes(InsightType::Gaps) {
        insights.gaps = attrs.and_then(gap_insights);
    }
    if insight_type.includes(InsightType::Questions) {
        insights.questions = Some(research_prompts(attrs));
    }
    if insight_type == InsightType::All {
        let total = raw.statements.as_ref().map_or(0, Vec::len);
        insights.key_insights = Some(attrs.map(|a| key_insights(a, total)).unwrap_or_default());
    }

    insights
}
