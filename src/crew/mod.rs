//! Sequential job-posting crew.
//!
//! [`Crew::kickoff`] runs each [`TaskKind`] in order. Before a task's model
//! call the crew gathers tool context (search, scrape) for the task's agent,
//! then sends the rendered prompt with the outputs of earlier tasks as
//! context. Every remote call goes through the shared [`RetryExecutor`].
//!
//! A tool that exhausts its retries only costs the task its research context.
//! A model call that exhausts its retries aborts the run.

pub mod agents;
pub mod tasks;

pub use agents::AgentRole;
pub use tasks::{CrewInputs, RoleRequirements, TaskKind};

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{GeminiClient, GenerateRequest, ModelClient};
use crate::config::{Config, CrewConfig};
use crate::error::CrewError;
use crate::prompt::{render_task_prompt, TaskPromptParams};
use crate::retry::RetryExecutor;
use crate::tools::{scrape, search, ToolRegistry};

/// Earlier task outputs are cut to this many characters when used as context.
const CONTEXT_CHARS_PER_TASK: usize = 4000;

/// Output of one finished task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskOutput {
    pub task: TaskKind,
    pub agent: AgentRole,
    pub output: String,
}

/// Everything a crew run produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrewReport {
    pub outputs: Vec<TaskOutput>,
    /// Parsed role requirements, when the model returned valid JSON.
    pub role_requirements: Option<RoleRequirements>,
}

impl CrewReport {
    pub fn output(&self, task: TaskKind) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.task == task)
            .map(|o| o.output.as_str())
    }

    /// The reviewed posting, falling back to the draft.
    pub fn final_posting(&self) -> Option<&str> {
        self.output(TaskKind::ReviewJobPosting)
            .or_else(|| self.output(TaskKind::DraftJobPosting))
    }

    /// Markdown document with the posting first and supporting research after.
    pub fn to_markdown(&self) -> String {
        let mut sections = Vec::new();
        if let Some(posting) = self.final_posting() {
            sections.push(posting.trim().to_string());
        }
        let supporting: Vec<&TaskOutput> = self
            .outputs
            .iter()
            .filter(|o| !matches!(o.task, TaskKind::DraftJobPosting | TaskKind::ReviewJobPosting))
            .collect();
        if !supporting.is_empty() {
            sections.push("---\n\n# Supporting research".to_string());
        }
        for entry in supporting {
            let body = match (&self.role_requirements, entry.task) {
                (Some(req), TaskKind::ResearchRoleRequirements) if !req.is_empty() => {
                    req.to_markdown()
                }
                _ => entry.output.trim().to_string(),
            };
            sections.push(format!("## {}\n\n{body}", entry.task.title()));
        }
        let mut doc = sections.join("\n\n");
        doc.push('\n');
        doc
    }

    pub fn write_markdown(&self, path: &Path) -> Result<(), CrewError> {
        std::fs::write(path, self.to_markdown()).map_err(CrewError::Output)
    }
}

/// Runs the job-posting pipeline.
pub struct Crew {
    client: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    executor: RetryExecutor,
    settings: CrewConfig,
}

impl Crew {
    /// Crew wired to Gemini and the configured tools.
    pub fn new(config: &Config) -> Result<Self, CrewError> {
        let executor = RetryExecutor::new(config.retry_policy()?);
        let client = GeminiClient::new(&config.model, config.network.api_timeout());
        let tools = ToolRegistry::from_config(config);
        debug!(tools = ?tools.names(), "registered research tools");
        Ok(Self::with_parts(
            Arc::new(client),
            tools,
            executor,
            config.crew.clone(),
        ))
    }

    pub fn with_parts(
        client: Arc<dyn ModelClient>,
        tools: ToolRegistry,
        executor: RetryExecutor,
        settings: CrewConfig,
    ) -> Self {
        Self {
            client,
            tools,
            executor,
            settings,
        }
    }

    /// Tasks this crew will run, in order.
    pub fn tasks(&self) -> Vec<TaskKind> {
        TaskKind::pipeline(self.settings.include_industry_analysis)
    }

    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    /// Run every task in order and collect the outputs.
    pub async fn kickoff(&self, inputs: &CrewInputs) -> Result<CrewReport, CrewError> {
        let vars = inputs.template_vars();
        let tasks = self.tasks();
        // Render every description up front so bad inputs cost no quota.
        let descriptions = tasks
            .iter()
            .map(|task| task.description(&vars))
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = CrewReport::default();
        for (index, (task, description)) in tasks.iter().copied().zip(descriptions).enumerate() {
            info!(
                step = index + 1,
                total = tasks.len(),
                agent = %task.agent(),
                "starting task: {task}"
            );
            let output = self
                .run_task(task, inputs, &description, &report.outputs)
                .await?;

            if task.expects_json() {
                match RoleRequirements::parse(&output) {
                    Ok(parsed) => report.role_requirements = Some(parsed),
                    Err(err) => warn!(task = %task, "could not parse structured output: {err}"),
                }
            }
            if self.settings.verbose {
                info!(task = %task, "task output:\n{output}");
            }
            report.outputs.push(TaskOutput {
                task,
                agent: task.agent(),
                output,
            });
        }
        info!(tasks = report.outputs.len(), "crew finished");
        Ok(report)
    }

    async fn run_task(
        &self,
        task: TaskKind,
        inputs: &CrewInputs,
        description: &str,
        previous: &[TaskOutput],
    ) -> Result<String, CrewError> {
        let tool_context = self.gather_tool_context(task, inputs).await;
        let context: Vec<(&str, String)> = previous
            .iter()
            .map(|o| (o.task.title(), truncate_chars(&o.output, CONTEXT_CHARS_PER_TASK)))
            .collect();
        let prompt = render_task_prompt(&TaskPromptParams {
            description,
            expected_output: task.expected_output(),
            format_note: task.format_note(),
            context: context
                .iter()
                .map(|(title, text)| (*title, text.as_str()))
                .collect(),
            tool_context: tool_context.as_deref(),
        });
        debug!(task = %task, prompt_chars = prompt.len(), "rendered task prompt");

        let request = GenerateRequest::new(prompt)
            .with_system_instruction(task.agent().system_instruction(&self.tools));
        let client: &dyn ModelClient = self.client.as_ref();
        let request = &request;
        self.executor
            .execute(move || client.generate(request))
            .await
            .map_err(|source| CrewError::Model {
                task: task.title().to_string(),
                source,
            })
    }

    /// Research for `task`. `None` when the agent has no usable tools or
    /// every tool call failed.
    async fn gather_tool_context(&self, task: TaskKind, inputs: &CrewInputs) -> Option<String> {
        let agent = task.agent();
        let mut sections = Vec::new();

        if let Some(url) = task.scrape_target(inputs) {
            if agent.can_use(scrape::TOOL_NAME) {
                let args = serde_json::json!({ "website_url": url }).to_string();
                if let Some(text) = self.call_tool(scrape::TOOL_NAME, &args).await {
                    sections.push(format!("Website content ({url}):\n{text}"));
                }
            }
        }
        if let Some(query) = task.search_query(inputs) {
            if agent.can_use(search::TOOL_NAME) {
                let args = serde_json::json!({ "query": query }).to_string();
                if let Some(text) = self.call_tool(search::TOOL_NAME, &args).await {
                    sections.push(format!("Search results for `{query}`:\n{text}"));
                }
            }
        }

        (!sections.is_empty()).then(|| sections.join("\n\n"))
    }

    async fn call_tool(&self, name: &str, args: &str) -> Option<String> {
        if !self.tools.contains(name) {
            debug!(tool = name, "tool not registered; skipping");
            return None;
        }
        let tools = &self.tools;
        match self.executor.execute(move || tools.execute(name, args)).await {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(tool = name, "continuing without tool context: {err}");
                None
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}\n[...]", &text[..cut]),
        None => text.to_string(),
    }
}
