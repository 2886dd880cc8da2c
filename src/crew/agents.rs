//! The three crew members and the tools each may use.

use std::fmt;

use crate::prompt::{render_agent_instruction, AgentInstructionParams};
use crate::tools::{scrape, search, ToolRegistry};

/// A crew member. Each role owns a fixed persona and tool set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentRole {
    ResearchAnalyst,
    JobDescriptionWriter,
    ReviewSpecialist,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [
        AgentRole::ResearchAnalyst,
        AgentRole::JobDescriptionWriter,
        AgentRole::ReviewSpecialist,
    ];

    pub fn role(self) -> &'static str {
        match self {
            Self::ResearchAnalyst => "Research Analyst",
            Self::JobDescriptionWriter => "Job Description Writer",
            Self::ReviewSpecialist => "Review and Editing Specialist",
        }
    }

    pub fn goal(self) -> &'static str {
        match self {
            Self::ResearchAnalyst => {
                "Analyze the company website and provided description to extract insights on \
                 culture, values, and specific needs."
            }
            Self::JobDescriptionWriter => {
                "Use insights from the Research Analyst to create a detailed, engaging, and \
                 enticing job posting."
            }
            Self::ReviewSpecialist => {
                "Review the job posting for clarity, engagement, grammatical accuracy, and \
                 alignment with company values and refine it to ensure perfection."
            }
        }
    }

    pub fn backstory(self) -> &'static str {
        match self {
            Self::ResearchAnalyst => {
                "Expert in analyzing company cultures and identifying key values and needs from \
                 various sources, including websites and brief descriptions."
            }
            Self::JobDescriptionWriter => {
                "Skilled in crafting compelling job descriptions that resonate with the \
                 company's values and attract the right candidates."
            }
            Self::ReviewSpecialist => {
                "A meticulous editor with an eye for detail, ensuring every piece of content is \
                 clear, engaging, and grammatically perfect."
            }
        }
    }

    /// Names of the tools this role may use.
    pub fn tool_names(self) -> &'static [&'static str] {
        match self {
            Self::ResearchAnalyst => &[search::TOOL_NAME, scrape::TOOL_NAME],
            Self::JobDescriptionWriter | Self::ReviewSpecialist => &[search::TOOL_NAME],
        }
    }

    pub fn can_use(self, tool_name: &str) -> bool {
        self.tool_names().contains(&tool_name)
    }

    /// System instruction for this role. Only tools present in `tools` are
    /// advertised.
    pub fn system_instruction(self, tools: &ToolRegistry) -> String {
        let available = self
            .tool_names()
            .iter()
            .filter_map(|name| tools.get(name))
            .map(|tool| (tool.name(), tool.description()))
            .collect();
        render_agent_instruction(&AgentInstructionParams {
            role: self.role(),
            goal: self.goal(),
            backstory: self.backstory(),
            tools: available,
        })
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}
