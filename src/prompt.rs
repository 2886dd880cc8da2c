//! Prompt templating helpers.
//!
//! Agent instructions and task prompts each live in one template file and are
//! rendered from a single code path. Placeholders are `{name}` with `name`
//! made of ASCII letters, digits, and underscores; any other brace text is
//! copied through untouched, so JSON examples in templates are safe.

use std::collections::BTreeMap;

const AGENT_INSTRUCTION_TEMPLATE: &str = include_str!("templates/agent_instruction.template");
const TASK_PROMPT_TEMPLATE: &str = include_str!("templates/task_prompt.template");

/// Inputs for an agent's system instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AgentInstructionParams<'a> {
    pub role: &'a str,
    pub goal: &'a str,
    pub backstory: &'a str,
    /// `(name, description)` of every tool the agent may draw on.
    pub tools: Vec<(&'a str, &'a str)>,
}

/// Inputs for a single task prompt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskPromptParams<'a> {
    /// Task description with crew inputs already substituted.
    pub description: &'a str,
    pub expected_output: &'a str,
    /// Extra output-format instruction, e.g. a JSON shape.
    pub format_note: Option<&'a str>,
    /// `(title, output)` of earlier tasks.
    pub context: Vec<(&'a str, &'a str)>,
    /// Research gathered by tools for this task.
    pub tool_context: Option<&'a str>,
}

pub fn render_agent_instruction(params: &AgentInstructionParams<'_>) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("role", params.role.to_string());
    vars.insert("goal", params.goal.to_string());
    vars.insert("backstory", params.backstory.to_string());
    vars.insert("tools_block", render_tools_block(&params.tools));
    finish(AGENT_INSTRUCTION_TEMPLATE, &vars)
}

pub fn render_task_prompt(params: &TaskPromptParams<'_>) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("description", params.description.trim().to_string());
    vars.insert("expected_output", params.expected_output.trim().to_string());
    vars.insert(
        "format_note",
        params.format_note.map(str::trim).unwrap_or_default().to_string(),
    );
    vars.insert("context_block", render_context_block(&params.context));
    vars.insert("tool_block", render_tool_block(params.tool_context));
    finish(TASK_PROMPT_TEMPLATE, &vars)
}

/// Built-in templates only use variables the renderers always supply.
fn finish(template: &str, vars: &BTreeMap<&str, String>) -> String {
    let rendered = render_template(template, vars).unwrap_or_else(|_| template.to_string());
    normalize_blank_lines(&rendered)
}

/// Substitute `{name}` placeholders in one pass.
///
/// Substituted values are never rescanned. Fails on the first placeholder
/// with no entry in `vars`.
pub fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> Result<String, String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let key_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if key_len > 0 && after[key_len..].starts_with('}') {
            let key = &after[..key_len];
            let value = vars
                .get(key)
                .ok_or_else(|| format!("missing value for `{{{key}}}`"))?;
            rendered.push_str(value);
            rest = &after[key_len + 1..];
        } else {
            rendered.push('{');
            rest = after;
        }
    }
    rendered.push_str(rest);
    Ok(rendered)
}

fn render_tools_block(tools: &[(&str, &str)]) -> String {
    if tools.is_empty() {
        return "You have no research tools; rely on the context in each task.".to_string();
    }
    let list = tools
        .iter()
        .map(|(name, description)| format!("- `{name}`: {description}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Research tools run on your behalf before each task:\n{list}")
}

fn render_context_block(context: &[(&str, &str)]) -> String {
    if context.is_empty() {
        return String::new();
    }
    let sections = context
        .iter()
        .map(|(title, output)| format!("### {title}\n{}", output.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("This is the context from earlier tasks:\n\n{sections}")
}

fn render_tool_block(tool_context: Option<&str>) -> String {
    match tool_context.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => format!("Research gathered for this task:\n\n{text}"),
        None => String::new(),
    }
}

fn normalize_blank_lines(text: &str) -> String {
    let mut out = String::new();
    let mut previous_blank = false;

    for line in text.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && previous_blank {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line.trim_end());
        previous_blank = is_blank;
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> BTreeMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn render_substitutes_named_placeholders() {
        let out = render_template(
            "Hire for {hiring_needs} at {company_domain}.",
            &vars(&[("hiring_needs", "a Rust engineer"), ("company_domain", "acme.com")]),
        )
        .unwrap();
        assert_eq!(out, "Hire for a Rust engineer at acme.com.");
    }

    #[test]
    fn render_reports_missing_variable() {
        let err = render_template("Benefits: {specific_benefits}", &vars(&[])).unwrap_err();
        assert!(err.contains("{specific_benefits}"), "got: {err}");
    }

    #[test]
    fn render_leaves_json_braces_and_values_alone() {
        let out = render_template(
            r#"Return {"skills": []} for {name}"#,
            &vars(&[("name", "{literal}")]),
        )
        .unwrap();
        assert_eq!(out, r#"Return {"skills": []} for {literal}"#);
        assert_eq!(render_template("{ } {", &vars(&[])).unwrap(), "{ } {");
    }

    #[test]
    fn agent_instruction_lists_tools() {
        let text = render_agent_instruction(&AgentInstructionParams {
            role: "Research Analyst",
            goal: "Find things.",
            backstory: "Knows things.",
            tools: vec![("web_search", "Search the web.")],
        });
        assert!(text.starts_with("You are the Research Analyst.\nKnows things."));
        assert!(text.contains("Your personal goal is: Find things."));
        assert!(text.contains("- `web_search`: Search the web."));
    }

    #[test]
    fn agent_instruction_without_tools_says_so() {
        let text = render_agent_instruction(&AgentInstructionParams {
            role: "Editor",
            goal: "Edit.",
            backstory: "Careful.",
            tools: vec![],
        });
        assert!(text.contains("You have no research tools"));
    }

    #[test]
    fn task_prompt_includes_context_and_collapses_empty_sections() {
        let prompt = render_task_prompt(&TaskPromptParams {
            description: "  Draft a posting.  ",
            expected_output: "A posting.",
            format_note: None,
            context: vec![("Company culture", "Remote first.\n")],
            tool_context: None,
        });
        assert!(prompt.starts_with("Current task:\nDraft a posting."));
        assert!(prompt.contains("### Company culture\nRemote first."));
        assert!(!prompt.contains("Research gathered"));
        assert!(!prompt.contains("\n\n\n"));
        assert!(prompt.ends_with("without preamble."));
    }

    #[test]
    fn task_prompt_includes_format_note_and_tool_context() {
        let prompt = render_task_prompt(&TaskPromptParams {
            description: "List requirements.",
            expected_output: "A list.",
            format_note: Some("Respond with JSON."),
            context: vec![],
            tool_context: Some("1. Result"),
        });
        assert!(prompt.contains("Respond with JSON."));
        assert!(prompt.contains("Research gathered for this task:\n\n1. Result"));
        assert!(!prompt.contains("context from earlier tasks"));
    }
}
