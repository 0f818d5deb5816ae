//! Endpoint paths and query parameters understood by the service.

/// Analyze one text (or a saved graph by name) and return graph data.
pub const GRAPH_AND_STATEMENTS: &str = "/graphAndStatements";
/// Analyze several texts together, for overlap or difference comparisons.
pub const GRAPHS_AND_STATEMENTS: &str = "/graphsAndStatements";
/// Analyze a text and ask the service's language model for advice.
pub const GRAPH_AND_ADVICE: &str = "/graphAndAdvice";
/// Search the user's saved graphs.
pub const SEARCH: &str = "/search";
pub const GOOGLE_SEARCH_RESULTS: &str = "/import/googleSearchResultsGraph";
pub const GOOGLE_SEARCH_INTENT: &str = "/import/googleSearchIntentGraph";
pub const GOOGLE_SEARCH_VS_INTENT: &str = "/import/googleSearchVsIntentGraph";

/// A service path together with its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Appends a boolean query parameter as `"true"` / `"false"`.
    pub fn flag(self, key: &'static str, value: bool) -> Self {
        self.param(key, if value { "true" } else { "false" })
    }

    /// Returns the value of the first query parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the path and query string, e.g. `/search?a=1&b=2`.
    ///
    /// Values are used for logging only and are not percent-encoded.
    pub fn to_path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.to_string();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// Query options shared by the analysis endpoints.
///
/// These decide what the service computes and returns. They are independent
/// of how much of the response a tool later emits.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub do_not_save: bool,
    pub add_stats: bool,
    pub include_statements: bool,
    pub include_graph_summary: bool,
    pub extended_graph_summary: bool,
    pub include_graph: bool,
    /// Ask for compact graph and statement encodings.
    pub compact: bool,
    pub ai_topics: bool,
    /// Optimization mode such as `"develop"` or `"latent"`.
    pub optimize: Option<&'static str>,
    /// Multi-text comparison mode such as `"difference"`.
    pub compare_mode: Option<&'static str>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            do_not_save: true,
            add_stats: true,
            include_statements: false,
            include_graph_summary: false,
            extended_graph_summary: true,
            include_graph: false,
            compact: false,
            ai_topics: true,
            optimize: None,
            compare_mode: None,
        }
    }
}

impl AnalysisOptions {
    /// Builds the endpoint for `path` carrying these options.
    pub fn endpoint(&self, path: &'static str) -> Endpoint {
        let mut endpoint = Endpoint::new(path)
            .flag("doNotSave", self.do_not_save)
            .flag("addStats", self.add_stats)
            .flag("includeStatements", self.include_statements)
            .flag("includeGraphSummary", self.include_graph_summary)
            .flag("extendedGraphSummary", self.extended_graph_summary)
            .flag("includeGraph", self.include_graph);
        if self.compact {
            endpoint = endpoint
                .flag("compactGraph", true)
                .flag("compactStatements", true);
        }
        endpoint = endpoint.flag("aiTopics", self.ai_topics);
        if let Some(optimize) = self.optimize {
            endpoint = endpoint.param("optimize", optimize);
        }
        if let Some(mode) = self.compare_mode {
            endpoint = endpoint.param("compareMode", mode);
        }
        endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let endpoint = AnalysisOptions::default().endpoint(GRAPH_AND_STATEMENTS);
        assert_eq!(endpoint.path, "/graphAndStatements");
        assert_eq!(endpoint.get("doNotSave"), Some("true"));
        assert_eq!(endpoint.get("includeGraph"), Some("false"));
        assert_eq!(endpoint.get("compactGraph"), None);
        assert_eq!(endpoint.get("optimize"), None);
    }

    #[test]
    fn test_compact_and_modes() {
        let endpoint = AnalysisOptions {
            compact: true,
            optimize: Some("develop"),
            compare_mode: Some("difference"),
            ..Default::default()
        }
        .endpoint(GRAPHS_AND_STATEMENTS);
        assert_eq!(endpoint.get("compactStatements"), Some("true"));
        assert_eq!(endpoint.get("optimize"), Some("develop"));
        assert_eq!(endpoint.get("compareMode"), Some("difference"));
    }

    #[test]
    fn test_path_and_query() {
        let endpoint = Endpoint::new(SEARCH).param("a", "1").flag("b", false);
        assert_eq!(endpoint.to_path_and_query(), "/search?a=1&b=false");
        assert_eq!(Endpoint::new(SEARCH).to_path_and_query(), "/search");
    }
}
