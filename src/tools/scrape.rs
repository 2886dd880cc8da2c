//! Website scrape tool.
//!
//! Fetches a page and reduces it to its visible text: script/style content is
//! dropped and whitespace is collapsed so the result fits in a prompt.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::time::Duration;

use super::Tool;
use crate::api::parse_retry_after_secs;
use crate::error::{ApiError, ToolError};

/// Registry name of the scrape tool.
pub const TOOL_NAME: &str = "scrape_website";

/// Maximum characters of page text to return.
const MAX_TEXT_CHARS: usize = 6000;

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Tool that fetches a website and returns its readable text.
pub struct ScrapeWebsiteTool {
    http: reqwest::Client,
    max_chars: usize,
}

impl ScrapeWebsiteTool {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; jobcrew/0.1)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            max_chars: MAX_TEXT_CHARS,
        }
    }
}

impl Default for ScrapeWebsiteTool {
    fn default() -> Self {
        Self::new(Duration::from_secs(20))
    }
}

#[derive(Deserialize)]
struct Args {
    website_url: String,
}

#[async_trait]
impl Tool for ScrapeWebsiteTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn description(&self) -> &'static str {
        "Read a website and return its visible text content."
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: Args = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let url = normalize_url(&args.website_url)?;

        let response = self.http.get(url.as_str()).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after_secs = parse_retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status, truncate_chars(&body, 500), retry_after_secs).into());
        }
        let html = response.text().await?;

        let page = extract_page_text(&html);
        if page.is_empty() {
            return Ok(format!("No readable text found at {url}."));
        }
        Ok(truncate_chars(&page, self.max_chars))
    }
}

/// Accept bare domains like `acme.com` by assuming https.
fn normalize_url(raw: &str) -> Result<reqwest::Url, ToolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidArguments("website_url must not be empty".into()));
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = reqwest::Url::parse(&candidate)
        .map_err(|e| ToolError::InvalidArguments(format!("invalid url `{trimmed}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ToolError::InvalidArguments(format!(
            "unsupported scheme `{other}` (expected http or https)"
        ))),
    }
}

/// Title line plus whitespace-collapsed visible body text.
fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").expect("valid title selector");
    let body_selector = Selector::parse("body").expect("valid body selector");

    let title = document
        .select(&title_selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default();

    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());
    let mut words: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    let body = words.join(" ");

    match (title.is_empty(), body.is_empty()) {
        (true, _) => body,
        (false, true) => format!("Title: {title}"),
        (false, false) => format!("Title: {title}\n\n{body}"),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate by characters and mark the cut.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...[truncated]", &text[..cut]),
        None => text.to_string(),
    }
}
