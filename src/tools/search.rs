//! Web search tool backed by the Serper Google Search API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::Tool;
use crate::api::parse_retry_after_secs;
use crate::config::SearchConfig;
use crate::error::{ApiError, ToolError};

/// Registry name of the search tool.
pub const TOOL_NAME: &str = "web_search";

/// Tool that searches the web via Serper.
pub struct SerperSearchTool {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_results: usize,
}

impl SerperSearchTool {
    /// Build a search tool with a reusable HTTP client.
    pub fn new(config: &SearchConfig, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: config.endpoint.trim().to_string(),
            api_key: config.api_key.trim().to_string(),
            max_results: config.max_results.max(1),
        }
    }
}

#[derive(Deserialize)]
struct Args {
    query: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeGraph {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl Tool for SerperSearchTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn description(&self) -> &'static str {
        "Search the web for a query and return the top results with titles, URLs, and snippets."
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: Args = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let query = args.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments("query must not be empty".into()));
        }
        if self.api_key.is_empty() {
            return Err(ToolError::ExecutionFailed(
                "no search API key configured (set SERPER_API_KEY)".into(),
            ));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": self.max_results }))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after_secs = parse_retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status, body, retry_after_secs).into());
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(render_results(query, &parsed, self.max_results))
    }
}

fn render_results(query: &str, response: &SearchResponse, max_results: usize) -> String {
    let mut output = String::new();
    if let Some(graph) = &response.knowledge_graph {
        if !graph.title.is_empty() {
            output.push_str(&format!("{}: {}\n\n", graph.title, graph.description));
        }
    }

    let results: Vec<&OrganicResult> = response
        .organic
        .iter()
        .filter(|r| !r.title.is_empty() && !r.link.is_empty())
        .take(max_results)
        .collect();
    if results.is_empty() && output.is_empty() {
        return format!("No results found for `{query}`.");
    }

    for (i, r) in results.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}\n   {}\n   {}\n\n",
            i + 1,
            r.title,
            r.link,
            r.snippet
        ));
    }
    output.trim_end().to_string()
}
