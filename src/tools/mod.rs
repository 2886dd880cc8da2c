//! Research tools available to crew agents.
//!
//! Tools are async trait objects that take a JSON argument string and return
//! text for the prompt. Every call that reaches a remote service reports
//! failures as [`ToolError::Remote`] so the retry executor can classify them.

pub mod scrape;
pub mod search;

use crate::config::Config;
use crate::error::ToolError;
use async_trait::async_trait;

pub use scrape::ScrapeWebsiteTool;
pub use search::SerperSearchTool;

// ---------------------------------------------------------------------------
// Tool trait
// ---------------------------------------------------------------------------

/// A tool that an agent can use to gather context.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by agent profiles to request the tool.
    fn name(&self) -> &'static str;

    /// One-line description included in the agent's instructions.
    fn description(&self) -> &'static str;

    /// Execute the tool with the given JSON arguments string.
    async fn execute(&self, arguments: &str) -> Result<String, ToolError>;
}

// ---------------------------------------------------------------------------
// Tool registry
// ---------------------------------------------------------------------------

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry with the search and scrape tools wired from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(SerperSearchTool::new(
            &config.search,
            config.network.scrape_timeout(),
        ));
        registry.register(ScrapeWebsiteTool::new(config.network.scrape_timeout()));
        registry
    }

    /// Register a tool, replacing any existing tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered tool names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Find a tool by name and execute it.
    pub async fn execute(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::ExecutionFailed(format!("unknown tool: {name}")))?;
        tool.execute(arguments).await
    }

    /// True if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
